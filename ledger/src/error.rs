//! Ledger errors.

use crate::capability::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("global rate can only decrease: current {current}, requested {requested}")]
    RateIncreaseRejected { current: u128, requested: u128 },

    #[error("projection time {requested}s must be after {now}s")]
    InvalidProjectionTime { requested: u64, now: u64 },

    #[error("caller lacks the {required:?} capability for this ledger")]
    Unauthorized { required: Role },

    #[error("account {0} not found")]
    NoSuchAccount(String),

    #[error("arithmetic overflow in ledger computation")]
    Overflow,

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
