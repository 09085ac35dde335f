//! Cross-chain bridge adapter.
//!
//! Tokens leave a chain by being burned on the source ledger and arrive by
//! being minted on the destination ledger. The sender's accrual rate travels
//! with the payload, so the recipient keeps earning at the rate the sender
//! deposited at rather than the destination's current global rate.
//!
//! Delivery is not this crate's concern: [`BridgeAdapter::lock`] returns the
//! outbound frame and [`BridgeAdapter::release`] consumes one. Whatever carries
//! frames between them must deliver each exactly once, in order per sender.

pub mod adapter;
pub mod error;
pub mod events;
pub mod payload;
pub mod peer;
pub mod transfer_id;

pub use adapter::{BridgeAdapter, OutboundMessage};
pub use error::BridgeError;
pub use events::BridgeEvent;
pub use payload::{TransferPayload, PAYLOAD_VERSION};
pub use peer::PeerConfig;
pub use transfer_id::derive_transfer_id;
