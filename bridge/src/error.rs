//! Bridge errors.

use rebase_ledger::LedgerError;
use rebase_types::ChainId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridged amount must be non-zero")]
    ZeroAmount,

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("no enabled peer for {0}")]
    UnknownPeer(ChainId),

    #[error("payload addressed to {actual}, this adapter serves {expected}")]
    WrongDestination { expected: ChainId, actual: ChainId },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
