//! Nullable bridge channel: record frames and deliver them on demand.

use std::collections::VecDeque;
use std::sync::Mutex;

use rebase_bridge::{BridgeAdapter, BridgeError, OutboundMessage};
use rebase_types::{Amount, Timestamp};

/// A channel that queues outbound frames until the test delivers them.
///
/// Frames leave in the order they were sent. Every frame ever sent stays in
/// the history for assertions, delivered or not.
#[derive(Default)]
pub struct NullChannel {
    pending: Mutex<VecDeque<OutboundMessage>>,
    history: Mutex<Vec<OutboundMessage>>,
}

impl NullChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, message: OutboundMessage) {
        if let Ok(mut history) = self.history.lock() {
            history.push(message.clone());
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.push_back(message);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Every frame sent so far.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Drop the oldest pending frame without delivering it.
    pub fn lose_next(&self) -> Option<OutboundMessage> {
        self.pending.lock().ok().and_then(|mut p| p.pop_front())
    }

    /// Deliver the oldest pending frame to `destination`.
    ///
    /// Returns `None` when nothing is pending. A frame whose release fails is
    /// consumed anyway, matching an at-most-once transport.
    pub fn deliver_next(
        &self,
        destination: &BridgeAdapter,
        now: Timestamp,
    ) -> Option<Result<Amount, BridgeError>> {
        let message = self.lose_next()?;
        let result = destination.release_at(&message.payload, now);
        if let Err(e) = &result {
            tracing::warn!(transfer_id = %message.transfer_id, error = %e, "null channel delivery failed");
        }
        Some(result)
    }

    /// Deliver every pending frame in order. Returns one result per frame.
    pub fn deliver_all(
        &self,
        destination: &BridgeAdapter,
        now: Timestamp,
    ) -> Vec<Result<Amount, BridgeError>> {
        let mut results = Vec::new();
        while let Some(result) = self.deliver_next(destination, now) {
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebase_types::{ChainId, TokenAddress, TransferId};

    fn frame(n: u8) -> OutboundMessage {
        OutboundMessage {
            dest_chain: ChainId::new(2),
            dest_token_address: TokenAddress::ZERO,
            transfer_id: TransferId::new([n; 32]),
            payload: vec![n],
        }
    }

    #[test]
    fn preserves_send_order_and_history() {
        let channel = NullChannel::new();
        channel.send(frame(1));
        channel.send(frame(2));
        assert_eq!(channel.pending_count(), 2);
        assert_eq!(channel.lose_next().unwrap().payload, vec![1]);
        assert_eq!(channel.lose_next().unwrap().payload, vec![2]);
        assert!(channel.lose_next().is_none());
        assert_eq!(channel.sent().len(), 2);
    }
}
