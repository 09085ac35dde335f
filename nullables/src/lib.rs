//! Nullable infrastructure for deterministic testing.
//!
//! Everything a ledger deployment touches outside its own process (the clock,
//! the reserve asset, the cross-chain channel) sits behind a trait or a plain
//! entry point. This crate provides test-friendly stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically, including failure injection
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod channel;
pub mod clock;
pub mod reserve;

pub use channel::NullChannel;
pub use clock::NullClock;
pub use reserve::NullReserve;
