//! Ledger node: wires one chain's ledger, custody gateway and bridge adapter
//! together, and relays bridge frames to the paired chain.
//!
//! The node is the coordinator that:
//! - Builds the ledger from configuration and keeps its owner capability
//! - Hands operator capabilities to the gateway and the adapter
//! - Registers the paired chain as the adapter's peer
//! - Wraps every entry point in tracing spans and Prometheus counters
//! - Runs the async relay that delivers frames after a finality delay

pub mod config;
pub mod error;
pub mod metrics;
pub mod node;
pub mod relay;
pub mod shutdown;
pub mod tracing_spans;

pub use config::NodeConfig;
pub use error::NodeError;
pub use metrics::NodeMetrics;
pub use node::{ChainNode, NodeStatus};
pub use relay::{Relay, RelayReport, RELAY_CHANNEL_CAPACITY};
pub use shutdown::ShutdownController;
