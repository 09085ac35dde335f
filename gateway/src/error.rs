//! Gateway errors.

use rebase_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("deposit amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("reserve transfer failed: {0}")]
    ReserveTransferFailed(#[from] ReserveError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The mint was refused and the pulled reserve could not be returned.
    #[error("{amount} reserve from {account} stranded in custody: mint failed ({mint}), refund failed ({refund})")]
    StrandedReserve {
        account: String,
        amount: u128,
        mint: LedgerError,
        refund: ReserveError,
    },
}

/// Failures reported by a reserve vault.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReserveError {
    #[error("{account} holds {available} reserve, needs {needed}")]
    InsufficientFunds {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("custody holds {available} reserve, cannot release {needed}")]
    CustodyShortfall { needed: u128, available: u128 },

    #[error("reserve unavailable: {0}")]
    Unavailable(String),
}
