use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] rebase_ledger::LedgerError),

    #[error("gateway error: {0}")]
    Gateway(#[from] rebase_gateway::GatewayError),

    #[error("bridge error: {0}")]
    Bridge(#[from] rebase_bridge::BridgeError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot path not configured")]
    NoSnapshotPath,

    #[error("relay channel closed")]
    RelayClosed,

    #[error("relay task failed: {0}")]
    RelayTask(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
