//! Prometheus metrics for a ledger node.
//!
//! Counts deposits, redemptions, locks, releases and rejected operations, and
//! tracks gauges for the ledger's account count and global rate. The
//! [`NodeMetrics`] struct owns a dedicated [`Registry`] that can be encoded
//! into the Prometheus text exposition format with [`NodeMetrics::encode`].

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::NodeError;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub deposits: IntCounter,
    pub redemptions: IntCounter,
    /// Frames emitted by this chain's adapter.
    pub locks: IntCounter,
    /// Frames minted on this chain.
    pub releases: IntCounter,
    /// Rejected operations, labelled by `op`.
    pub rejected: IntCounterVec,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub account_count: IntGauge,
    /// Current global rate (1e-18 per second). Saturates at `i64::MAX`.
    pub global_rate: IntGauge,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        let deposits = register_int_counter_with_registry!(
            Opts::new("rebase_deposits_total", "Reserve deposits accepted"),
            registry
        )?;
        let redemptions = register_int_counter_with_registry!(
            Opts::new("rebase_redemptions_total", "Redemptions completed"),
            registry
        )?;
        let locks = register_int_counter_with_registry!(
            Opts::new("rebase_bridge_locks_total", "Bridge transfers locked on this chain"),
            registry
        )?;
        let releases = register_int_counter_with_registry!(
            Opts::new("rebase_bridge_releases_total", "Bridge transfers released on this chain"),
            registry
        )?;
        let rejected = register_int_counter_vec_with_registry!(
            Opts::new("rebase_rejected_total", "Operations rejected, by operation"),
            &["op"],
            registry
        )?;
        let account_count = register_int_gauge_with_registry!(
            Opts::new("rebase_account_count", "Accounts known to the ledger"),
            registry
        )?;
        let global_rate = register_int_gauge_with_registry!(
            Opts::new("rebase_global_rate", "Current global deposit rate"),
            registry
        )?;

        Ok(Self {
            registry,
            deposits,
            redemptions,
            locks,
            releases,
            rejected,
            account_count,
            global_rate,
        })
    }

    pub fn record_rejection(&self, op: &str) {
        self.rejected.with_label_values(&[op]).inc();
    }

    pub fn set_global_rate(&self, raw: u128) {
        self.global_rate.set(i64::try_from(raw).unwrap_or(i64::MAX));
    }

    pub fn set_account_count(&self, count: usize) {
        self.account_count
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
