//! Fundamental types for the rebase ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, chain identifiers, amounts, fixed-point rates, timestamps,
//! transfer identifiers and ledger parameters.

pub mod address;
pub mod amount;
pub mod chain;
pub mod error;
pub mod hash;
pub mod params;
pub mod rate;
pub mod time;

pub use address::AccountId;
pub use amount::{Amount, AmountSpec};
pub use chain::{ChainId, TokenAddress};
pub use error::TypesError;
pub use hash::TransferId;
pub use params::LedgerParams;
pub use rate::{Rate, PRECISION_FACTOR};
pub use time::{Clock, SystemClock, Timestamp};
