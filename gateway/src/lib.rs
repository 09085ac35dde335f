//! Custody gateway.
//!
//! Holds the reserve asset and is the only path between it and the ledger:
//! depositing reserve mints tokens at the current global rate, redeeming
//! tokens burns them and releases the same amount of reserve. A redemption
//! whose release fails is rolled back so no reserve ever leaves custody
//! without a committed burn.

pub mod error;
pub mod events;
pub mod gateway;
pub mod reserve;

pub use error::{GatewayError, ReserveError};
pub use events::GatewayEvent;
pub use gateway::CustodyGateway;
pub use reserve::{InMemoryReserve, ReserveVault};
