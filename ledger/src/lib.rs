//! Interest-accrual ledger.
//!
//! Every account holds a principal, a fixed per-second rate and the timestamp
//! of its last settlement. Balances are never updated by the passage of time:
//! `effective = principal * (P + rate * elapsed) / P` is projected on demand,
//! and materialized into principal ("settled") only at the start of a mutating
//! operation. A rate change therefore costs O(1), never O(holders).
//!
//! This crate handles:
//! - Balance projection and settlement arithmetic
//! - Mint/burn/transfer with rate inheritance
//! - The non-increasing global rate applied to new deposits
//! - Capability-gated privileged callers
//! - Atomic multi-operation batches with rollback
//! - Integrity-checked snapshots

pub mod accrual;
pub mod account;
pub mod batch;
pub mod capability;
pub mod error;
pub mod events;
pub mod ledger;
pub mod rate;
pub mod snapshot;
pub mod state;

pub use account::AccountRecord;
pub use batch::LedgerBatch;
pub use capability::{Capability, LedgerId, Role};
pub use error::LedgerError;
pub use events::LedgerEvent;
pub use ledger::AccrualLedger;
pub use rate::GlobalRateController;
pub use snapshot::LedgerSnapshot;
pub use state::LedgerState;
