//! One chain's deployment: ledger, custody gateway and bridge adapter.

use std::path::PathBuf;
use std::sync::Arc;

use prometheus::IntCounter;
use serde::{Deserialize, Serialize};

use rebase_bridge::{BridgeAdapter, OutboundMessage};
use rebase_gateway::{CustodyGateway, ReserveVault};
use rebase_ledger::{AccrualLedger, Capability, LedgerSnapshot};
use rebase_types::{AccountId, Amount, AmountSpec, ChainId, Clock, Rate, Timestamp};

use crate::config::NodeConfig;
use crate::metrics::NodeMetrics;
use crate::tracing_spans::{deposit_span, lock_span, redeem_span, release_span};
use crate::NodeError;

/// Point-in-time summary of a node's ledger and custody.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub chain_id: ChainId,
    pub at: Timestamp,
    pub global_rate: Rate,
    pub account_count: usize,
    pub total_principal: Amount,
    pub total_supply: Amount,
    pub custody: Amount,
}

/// A ledger instance and the two privileged components that drive it.
///
/// The node keeps the owner capability; the gateway and adapter each hold
/// their own operator capability. Every entry point is wrapped in a tracing
/// span and counted in [`NodeMetrics`].
pub struct ChainNode {
    config: NodeConfig,
    ledger: Arc<AccrualLedger>,
    owner: Capability,
    gateway: CustodyGateway,
    adapter: BridgeAdapter,
    metrics: NodeMetrics,
}

impl ChainNode {
    pub fn new(
        config: NodeConfig,
        clock: Arc<dyn Clock>,
        reserve: Arc<dyn ReserveVault>,
    ) -> Result<Self, NodeError> {
        config.validate()?;
        let (ledger, owner) = AccrualLedger::new(config.ledger_params(), clock);
        Self::assemble(config, ledger, owner, reserve)
    }

    /// Rebuild a node from the snapshot at `config.snapshot_path`.
    pub fn restore(
        config: NodeConfig,
        clock: Arc<dyn Clock>,
        reserve: Arc<dyn ReserveVault>,
    ) -> Result<Self, NodeError> {
        config.validate()?;
        let path = config.snapshot_path.clone().ok_or(NodeError::NoSnapshotPath)?;
        let bytes = std::fs::read(&path)?;
        let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
        if snapshot.chain_id != ChainId::new(config.chain_id) {
            return Err(NodeError::Config(format!(
                "snapshot is for {}, config is for chain-{}",
                snapshot.chain_id, config.chain_id
            )));
        }
        let (ledger, owner) = AccrualLedger::restore(snapshot, clock)?;
        tracing::info!(path = %path.display(), "ledger restored from snapshot");
        Self::assemble(config, ledger, owner, reserve)
    }

    fn assemble(
        config: NodeConfig,
        ledger: AccrualLedger,
        owner: Capability,
        reserve: Arc<dyn ReserveVault>,
    ) -> Result<Self, NodeError> {
        let ledger = Arc::new(ledger);
        let gateway_cap = ledger.grant_operator(&owner, "gateway")?;
        let bridge_cap = ledger.grant_operator(&owner, "bridge")?;
        let gateway = CustodyGateway::new(Arc::clone(&ledger), gateway_cap, reserve)?;
        let adapter = BridgeAdapter::new(Arc::clone(&ledger), bridge_cap)?;
        adapter.register_peer(&owner, config.peer_config()?)?;

        let metrics = NodeMetrics::new()?;
        metrics.set_global_rate(ledger.global_rate()?.raw());
        metrics.set_account_count(ledger.account_count()?);

        tracing::info!(
            chain = %ledger.chain_id(),
            remote = config.remote_chain_id,
            global_rate = %ledger.global_rate()?,
            "node ready"
        );
        Ok(Self {
            config,
            ledger,
            owner,
            gateway,
            adapter,
            metrics,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn chain_id(&self) -> ChainId {
        self.ledger.chain_id()
    }

    pub fn remote_chain_id(&self) -> ChainId {
        ChainId::new(self.config.remote_chain_id)
    }

    pub fn ledger(&self) -> &Arc<AccrualLedger> {
        &self.ledger
    }

    pub fn gateway(&self) -> &CustodyGateway {
        &self.gateway
    }

    pub fn adapter(&self) -> &BridgeAdapter {
        &self.adapter
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn now(&self) -> Timestamp {
        self.ledger.now()
    }

    /// Count a result against `counter` or the rejection counter for `op`.
    fn observe<T, E>(
        &self,
        op: &str,
        counter: Option<&IntCounter>,
        result: Result<T, E>,
    ) -> Result<T, NodeError>
    where
        NodeError: From<E>,
    {
        match result {
            Ok(value) => {
                if let Some(counter) = counter {
                    counter.inc();
                }
                if let Ok(count) = self.ledger.account_count() {
                    self.metrics.set_account_count(count);
                }
                Ok(value)
            }
            Err(e) => {
                self.metrics.record_rejection(op);
                Err(e.into())
            }
        }
    }

    // ── Gateway ─────────────────────────────────────────────────────────

    pub fn deposit(&self, account: &AccountId, amount: Amount) -> Result<Amount, NodeError> {
        let _span = deposit_span(self.chain_id(), account).entered();
        let result = self.gateway.deposit(account, amount);
        self.observe("deposit", Some(&self.metrics.deposits), result)
    }

    pub fn redeem(&self, account: &AccountId, amount: AmountSpec) -> Result<Amount, NodeError> {
        let _span = redeem_span(self.chain_id(), account).entered();
        let result = self.gateway.redeem(account, amount);
        self.observe("redeem", Some(&self.metrics.redemptions), result)
    }

    pub fn redeem_all(&self, account: &AccountId) -> Result<Amount, NodeError> {
        self.redeem(account, AmountSpec::All)
    }

    // ── Ledger ──────────────────────────────────────────────────────────

    /// Holder-initiated transfer; `from` is assumed authenticated upstream.
    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: AmountSpec,
    ) -> Result<Amount, NodeError> {
        let result = self.ledger.transfer(from, to, amount, self.now());
        self.observe("transfer", None, result)
    }

    /// Lower the global rate using the node's owner capability.
    pub fn set_global_rate(&self, rate: Rate) -> Result<Rate, NodeError> {
        let result = self.ledger.set_global_rate(&self.owner, rate);
        let previous = self.observe("set_global_rate", None, result)?;
        self.metrics.set_global_rate(rate.raw());
        Ok(previous)
    }

    pub fn balance_of(&self, account: &AccountId) -> Result<Amount, NodeError> {
        Ok(self.ledger.balance_of(account)?)
    }

    pub fn principal_balance_of(&self, account: &AccountId) -> Result<Amount, NodeError> {
        Ok(self.ledger.principal_balance_of(account)?)
    }

    pub fn get_rate(&self, account: &AccountId) -> Result<Rate, NodeError> {
        Ok(self.ledger.get_rate(account)?)
    }

    pub fn global_rate(&self) -> Result<Rate, NodeError> {
        Ok(self.ledger.global_rate()?)
    }

    pub fn simulate_balance(
        &self,
        account: &AccountId,
        future: Timestamp,
    ) -> Result<Amount, NodeError> {
        Ok(self.ledger.simulate_balance(account, future)?)
    }

    // ── Bridge ──────────────────────────────────────────────────────────

    /// Lock `amount` from `sender` toward the configured remote chain.
    pub fn lock(
        &self,
        sender: &AccountId,
        recipient: &str,
        amount: Amount,
    ) -> Result<OutboundMessage, NodeError> {
        let remote = self.remote_chain_id();
        let _span = lock_span(self.chain_id(), sender, remote).entered();
        let result = self.adapter.lock(sender, remote, recipient, amount);
        self.observe("lock", Some(&self.metrics.locks), result)
    }

    /// Mint a frame produced by the remote chain's adapter.
    pub fn release(&self, frame: &[u8]) -> Result<Amount, NodeError> {
        let _span = release_span(self.chain_id()).entered();
        let result = self.adapter.release(frame);
        self.observe("release", Some(&self.metrics.releases), result)
    }

    // ── Reporting and persistence ───────────────────────────────────────

    pub fn status(&self) -> Result<NodeStatus, NodeError> {
        let at = self.now();
        Ok(NodeStatus {
            chain_id: self.chain_id(),
            at,
            global_rate: self.ledger.global_rate()?,
            account_count: self.ledger.account_count()?,
            total_principal: self.ledger.total_principal()?,
            total_supply: self.ledger.total_supply(at)?,
            custody: self.gateway.custody_balance(),
        })
    }

    /// Write a ledger snapshot to `config.snapshot_path`.
    pub fn save_snapshot(&self) -> Result<PathBuf, NodeError> {
        let path = self
            .config
            .snapshot_path
            .clone()
            .ok_or(NodeError::NoSnapshotPath)?;
        let snapshot = self.ledger.snapshot()?;
        std::fs::write(&path, snapshot.to_bytes()?)?;
        tracing::info!(
            path = %path.display(),
            accounts = snapshot.account_count(),
            "snapshot saved"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebase_gateway::InMemoryReserve;
    use rebase_types::SystemClock;

    fn node() -> (ChainNode, Arc<InMemoryReserve>) {
        let reserve = Arc::new(InMemoryReserve::new());
        reserve.fund(&AccountId::new("rbt_alice"), Amount::new(1_000_000));
        let node = ChainNode::new(NodeConfig::default(), Arc::new(SystemClock), reserve.clone())
            .unwrap();
        (node, reserve)
    }

    #[test]
    fn peer_registered_from_config() {
        let (node, _) = node();
        let peer = node.adapter().peer(ChainId::new(2)).unwrap();
        assert!(peer.enabled);
        assert!(peer.dest_token_address.is_zero());
    }

    #[test]
    fn deposits_and_rejections_are_counted() {
        let (node, _) = node();
        let alice = AccountId::new("rbt_alice");
        node.deposit(&alice, Amount::new(10)).unwrap();
        assert!(node.deposit(&alice, Amount::ZERO).is_err());
        assert!(node.set_global_rate(Rate::new(u128::MAX)).is_err());

        assert_eq!(node.metrics().deposits.get(), 1);
        let rejected = &node.metrics().rejected;
        assert_eq!(rejected.with_label_values(&["deposit"]).get(), 1);
        assert_eq!(rejected.with_label_values(&["set_global_rate"]).get(), 1);
        assert_eq!(node.metrics().account_count.get(), 1);
    }

    #[test]
    fn status_reflects_custody_and_supply() {
        let (node, _) = node();
        node.deposit(&AccountId::new("rbt_alice"), Amount::new(500)).unwrap();
        let status = node.status().unwrap();
        assert_eq!(status.custody, Amount::new(500));
        assert_eq!(status.total_principal, Amount::new(500));
        assert!(status.total_supply >= Amount::new(500));
        assert_eq!(status.account_count, 1);
    }

    #[test]
    fn lowering_rate_updates_gauge() {
        let (node, _) = node();
        node.set_global_rate(Rate::new(1_000)).unwrap();
        assert_eq!(node.metrics().global_rate.get(), 1_000);
    }

    #[test]
    fn snapshot_requires_path() {
        let (node, _) = node();
        assert!(matches!(node.save_snapshot(), Err(NodeError::NoSnapshotPath)));
    }
}
