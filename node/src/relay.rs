//! Asynchronous relay carrying bridge frames from one chain to the other.
//!
//! One relay task serves one direction. Frames are released strictly in the
//! order they were sent, each after the configured finality delay. The relay
//! never retries: a frame whose release fails is recorded in the
//! [`RelayReport`] and the relay moves on.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use rebase_bridge::OutboundMessage;
use rebase_types::{Amount, ChainId, TransferId};

use crate::node::ChainNode;
use crate::tracing_spans::relay_span;
use crate::NodeError;

/// Maximum frames queued ahead of the relay task.
pub const RELAY_CHANNEL_CAPACITY: usize = 1024;

/// What a relay did over its lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Released frames, in delivery order.
    pub delivered: Vec<(TransferId, Amount)>,
    /// Frames the destination rejected.
    pub failed: Vec<(TransferId, String)>,
    /// Frames still queued when the relay was shut down.
    pub undelivered: usize,
}

/// Handle to a running relay task.
pub struct Relay {
    dest: ChainId,
    tx: mpsc::Sender<OutboundMessage>,
    task: JoinHandle<RelayReport>,
}

/// Resolves on a shutdown broadcast; never resolves if the controller is gone.
async fn shutdown_signal(rx: &mut broadcast::Receiver<()>) {
    loop {
        match rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return,
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

impl Relay {
    /// Spawn a relay delivering to `destination`. Must be called inside a
    /// tokio runtime.
    pub fn spawn(
        destination: Arc<ChainNode>,
        finality_delay: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Self {
        let dest = destination.chain_id();
        let (tx, mut rx) = mpsc::channel::<OutboundMessage>(RELAY_CHANNEL_CAPACITY);

        let task = tokio::spawn(async move {
            let mut report = RelayReport::default();
            loop {
                let message = tokio::select! {
                    biased;
                    _ = shutdown_signal(&mut shutdown) => {
                        tracing::info!(%dest, "relay shutting down");
                        break;
                    }
                    message = rx.recv() => match message {
                        Some(message) => message,
                        None => break,
                    },
                };

                if !finality_delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = shutdown_signal(&mut shutdown) => {
                            tracing::info!(%dest, "relay shutting down mid-delay");
                            report.undelivered += 1;
                            break;
                        }
                        _ = tokio::time::sleep(finality_delay) => {}
                    }
                }

                let transfer_id = message.transfer_id;
                let span = relay_span(dest, &transfer_id);
                let outcome = {
                    let _entered = span.enter();
                    if message.dest_chain != dest {
                        tracing::warn!(frame_dest = %message.dest_chain, "frame for another chain");
                        Err(format!("frame addressed to {}", message.dest_chain))
                    } else {
                        destination
                            .release(&message.payload)
                            .map_err(|e| e.to_string())
                    }
                };
                match outcome {
                    Ok(amount) => {
                        tracing::debug!(%dest, %transfer_id, %amount, "frame delivered");
                        report.delivered.push((transfer_id, amount));
                    }
                    Err(error) => {
                        tracing::error!(%dest, %transfer_id, %error, "frame release failed");
                        report.failed.push((transfer_id, error));
                    }
                }
            }

            rx.close();
            while rx.try_recv().is_ok() {
                report.undelivered += 1;
            }
            if report.undelivered > 0 {
                tracing::warn!(%dest, undelivered = report.undelivered, "relay stopped with frames queued");
            }
            report
        });

        Self { dest, tx, task }
    }

    pub fn dest_chain(&self) -> ChainId {
        self.dest
    }

    /// Queue a frame for delivery.
    pub async fn send(&self, message: OutboundMessage) -> Result<(), NodeError> {
        self.tx.send(message).await.map_err(|_| NodeError::RelayClosed)
    }

    /// Stop accepting frames, let the task drain what is queued, and return
    /// its report.
    pub async fn finish(self) -> Result<RelayReport, NodeError> {
        drop(self.tx);
        self.task
            .await
            .map_err(|e| NodeError::RelayTask(e.to_string()))
    }
}
