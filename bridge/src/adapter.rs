//! Lock on the source chain, release on the destination chain.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::BridgeError;
use crate::events::BridgeEvent;
use crate::payload::TransferPayload;
use crate::peer::PeerConfig;
use crate::transfer_id::derive_transfer_id;
use rebase_ledger::{AccrualLedger, Capability, LedgerError, Role};
use rebase_types::{AccountId, Amount, AmountSpec, ChainId, Timestamp, TokenAddress, TransferId};

/// A frame ready to hand to the channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub dest_chain: ChainId,
    pub dest_token_address: TokenAddress,
    pub transfer_id: TransferId,
    pub payload: Vec<u8>,
}

/// One chain's end of the bridge.
pub struct BridgeAdapter {
    ledger: Arc<AccrualLedger>,
    operator: Capability,
    peers: Mutex<BTreeMap<ChainId, PeerConfig>>,
    nonce: AtomicU64,
    events: Mutex<Vec<BridgeEvent>>,
}

impl BridgeAdapter {
    /// Fails with `Unauthorized` unless `operator` was issued by `ledger`.
    pub fn new(ledger: Arc<AccrualLedger>, operator: Capability) -> Result<Self, BridgeError> {
        ledger.authorize(&operator, Role::Operator)?;
        Ok(Self {
            ledger,
            operator,
            peers: Mutex::new(BTreeMap::new()),
            nonce: AtomicU64::new(0),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn chain_id(&self) -> ChainId {
        self.ledger.chain_id()
    }

    pub fn ledger(&self) -> &Arc<AccrualLedger> {
        &self.ledger
    }

    // ── Peers ───────────────────────────────────────────────────────────

    /// Register or replace a peer. Requires the ledger owner capability.
    pub fn register_peer(&self, owner: &Capability, peer: PeerConfig) -> Result<(), BridgeError> {
        self.ledger.authorize(owner, Role::Owner)?;
        tracing::info!(
            chain = %self.chain_id(),
            remote = %peer.remote_chain,
            token = %peer.dest_token_address,
            enabled = peer.enabled,
            "peer registered"
        );
        self.peers_mut()?.insert(peer.remote_chain, peer);
        Ok(())
    }

    /// Enable or disable locks toward `remote_chain`.
    pub fn set_peer_enabled(
        &self,
        owner: &Capability,
        remote_chain: ChainId,
        enabled: bool,
    ) -> Result<(), BridgeError> {
        self.ledger.authorize(owner, Role::Owner)?;
        let mut peers = self.peers_mut()?;
        let peer = peers
            .get_mut(&remote_chain)
            .ok_or(BridgeError::UnknownPeer(remote_chain))?;
        peer.enabled = enabled;
        tracing::info!(chain = %self.chain_id(), remote = %remote_chain, enabled, "peer updated");
        Ok(())
    }

    pub fn peer(&self, remote_chain: ChainId) -> Option<PeerConfig> {
        self.peers
            .lock()
            .ok()
            .and_then(|peers| peers.get(&remote_chain).cloned())
    }

    fn peers_mut(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<ChainId, PeerConfig>>, BridgeError> {
        self.peers
            .lock()
            .map_err(|_| BridgeError::Ledger(LedgerError::LockPoisoned))
    }

    // ── Lock ────────────────────────────────────────────────────────────

    pub fn lock(
        &self,
        sender: &AccountId,
        remote_chain: ChainId,
        recipient: &str,
        amount: Amount,
    ) -> Result<OutboundMessage, BridgeError> {
        self.lock_at(sender, remote_chain, recipient, amount, self.ledger.now())
    }

    /// Burn `amount` from `sender` and build the frame that mints it to
    /// `recipient` on `remote_chain` at the sender's rate.
    ///
    /// Nothing is burned unless the frame is built, and nothing is emitted if
    /// the burn fails.
    pub fn lock_at(
        &self,
        sender: &AccountId,
        remote_chain: ChainId,
        recipient: &str,
        amount: Amount,
        now: Timestamp,
    ) -> Result<OutboundMessage, BridgeError> {
        if amount.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }
        let recipient = AccountId::parse(recipient)
            .map_err(|e| BridgeError::InvalidRecipient(e.to_string()))?;
        let peer = self
            .peer(remote_chain)
            .filter(|p| p.enabled)
            .ok_or_else(|| {
                tracing::warn!(chain = %self.chain_id(), remote = %remote_chain, "lock toward unknown peer");
                BridgeError::UnknownPeer(remote_chain)
            })?;

        let mut batch = self.ledger.batch(&self.operator)?;
        let sender_rate = batch.rate_of(sender);
        batch
            .burn(sender, AmountSpec::Exact(amount), now)
            .map_err(|e| {
                tracing::warn!(account = %sender, %amount, error = %e, "lock rejected");
                e
            })?;

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let source_chain = self.chain_id();
        let transfer_id =
            derive_transfer_id(source_chain, nonce, sender, &recipient, amount, sender_rate);
        let payload = TransferPayload {
            transfer_id,
            source_chain,
            dest_chain: remote_chain,
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount,
            sender_rate,
        }
        .encode()?;
        batch.commit();

        tracing::info!(
            %transfer_id,
            account = %sender,
            %recipient,
            remote = %remote_chain,
            %amount,
            rate = %sender_rate,
            "locked"
        );
        self.record(BridgeEvent::Locked {
            transfer_id,
            sender: sender.clone(),
            recipient,
            remote_chain,
            amount,
            rate: sender_rate,
            at: now,
        });

        Ok(OutboundMessage {
            dest_chain: remote_chain,
            dest_token_address: peer.dest_token_address,
            transfer_id,
            payload,
        })
    }

    // ── Release ─────────────────────────────────────────────────────────

    pub fn release(&self, frame: &[u8]) -> Result<Amount, BridgeError> {
        self.release_at(frame, self.ledger.now())
    }

    /// Mint the frame's amount to its recipient at the carried rate,
    /// overwriting whatever rate the recipient had. Returns the amount minted.
    ///
    /// Frames are not deduplicated; delivering one twice mints twice.
    pub fn release_at(&self, frame: &[u8], now: Timestamp) -> Result<Amount, BridgeError> {
        let payload = TransferPayload::decode(frame)?;
        let chain = self.chain_id();
        if payload.dest_chain != chain {
            return Err(BridgeError::WrongDestination {
                expected: chain,
                actual: payload.dest_chain,
            });
        }
        if self.peer(payload.source_chain).is_none() {
            tracing::warn!(%chain, source = %payload.source_chain, transfer_id = %payload.transfer_id, "release from unknown peer");
            return Err(BridgeError::UnknownPeer(payload.source_chain));
        }
        if payload.amount.is_zero() {
            return Err(BridgeError::InvalidPayload("zero amount".into()));
        }

        self.ledger.mint(
            &self.operator,
            &payload.recipient,
            payload.amount,
            payload.sender_rate,
            now,
        )?;

        tracing::info!(
            transfer_id = %payload.transfer_id,
            account = %payload.recipient,
            source = %payload.source_chain,
            amount = %payload.amount,
            rate = %payload.sender_rate,
            "released"
        );
        self.record(BridgeEvent::Released {
            transfer_id: payload.transfer_id,
            recipient: payload.recipient,
            source_chain: payload.source_chain,
            amount: payload.amount,
            rate: payload.sender_rate,
            at: now,
        });
        Ok(payload.amount)
    }

    fn record(&self, event: BridgeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn drain_events(&self) -> Vec<BridgeEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebase_types::{LedgerParams, Rate, SystemClock};

    struct Chain {
        adapter: BridgeAdapter,
        owner: Capability,
        minter: Capability,
    }

    fn chain(id: u32, rate: Rate) -> Chain {
        let params = LedgerParams::new(ChainId::new(id)).with_rate(rate);
        let (ledger, owner) = AccrualLedger::new(params, Arc::new(SystemClock));
        let minter = ledger.grant_operator(&owner, "test-minter").unwrap();
        let operator = ledger.grant_operator(&owner, "bridge").unwrap();
        let adapter = BridgeAdapter::new(Arc::new(ledger), operator).unwrap();
        Chain {
            adapter,
            owner,
            minter,
        }
    }

    fn paired() -> (Chain, Chain) {
        let a = chain(1, Rate::DEFAULT_GLOBAL);
        let b = chain(2, Rate::new(Rate::DEFAULT_GLOBAL.raw() / 10));
        a.adapter
            .register_peer(&a.owner, PeerConfig::new(ChainId::new(2), TokenAddress::new([2u8; 32])))
            .unwrap();
        b.adapter
            .register_peer(&b.owner, PeerConfig::new(ChainId::new(1), TokenAddress::new([1u8; 32])))
            .unwrap();
        (a, b)
    }

    fn alice() -> AccountId {
        AccountId::new("rbt_alice")
    }

    fn bob() -> AccountId {
        AccountId::new("rbt_bob")
    }

    fn fund(chain: &Chain, who: &AccountId, amount: u128, rate: Rate) {
        chain
            .adapter
            .ledger()
            .mint(&chain.minter, who, Amount::new(amount), rate, Timestamp::new(0))
            .unwrap();
    }

    #[test]
    fn round_trip_carries_sender_rate() {
        let (a, b) = paired();
        fund(&a, &alice(), 1_000_000, Rate::DEFAULT_GLOBAL);

        let msg = a
            .adapter
            .lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(400_000), Timestamp::new(0))
            .unwrap();
        assert_eq!(msg.dest_chain, ChainId::new(2));
        assert_eq!(msg.dest_token_address, TokenAddress::new([2u8; 32]));
        assert_eq!(
            a.adapter.ledger().balance_at(&alice(), Timestamp::new(0)).unwrap(),
            Amount::new(600_000)
        );

        let minted = b.adapter.release_at(&msg.payload, Timestamp::new(10)).unwrap();
        assert_eq!(minted, Amount::new(400_000));
        let ledger_b = b.adapter.ledger();
        assert_eq!(ledger_b.balance_at(&bob(), Timestamp::new(10)).unwrap(), minted);
        assert_eq!(ledger_b.get_rate(&bob()).unwrap(), Rate::DEFAULT_GLOBAL);
        assert!(ledger_b.balance_at(&bob(), Timestamp::new(10 + 86_400)).unwrap() > minted);
    }

    #[test]
    fn release_overwrites_recipient_rate() {
        let (a, b) = paired();
        fund(&a, &alice(), 1_000, Rate::new(7));
        fund(&b, &bob(), 1_000, Rate::new(99));
        let msg = a
            .adapter
            .lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(10), Timestamp::new(0))
            .unwrap();
        b.adapter.release_at(&msg.payload, Timestamp::new(0)).unwrap();
        assert_eq!(b.adapter.ledger().get_rate(&bob()).unwrap(), Rate::new(7));
    }

    #[test]
    fn lock_validates_before_burning() {
        let (a, _b) = paired();
        fund(&a, &alice(), 1_000, Rate::DEFAULT_GLOBAL);
        let t = Timestamp::new(0);

        assert!(matches!(
            a.adapter.lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::ZERO, t),
            Err(BridgeError::ZeroAmount)
        ));
        assert!(matches!(
            a.adapter.lock_at(&alice(), ChainId::new(2), "bob", Amount::new(1), t),
            Err(BridgeError::InvalidRecipient(_))
        ));
        assert!(matches!(
            a.adapter.lock_at(&alice(), ChainId::new(9), "rbt_bob", Amount::new(1), t),
            Err(BridgeError::UnknownPeer(_))
        ));
        assert!(matches!(
            a.adapter.lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(1_001), t),
            Err(BridgeError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        assert_eq!(a.adapter.ledger().balance_at(&alice(), t).unwrap(), Amount::new(1_000));
        assert!(a.adapter.drain_events().is_empty());
    }

    #[test]
    fn disabled_peer_rejects_locks() {
        let (a, _b) = paired();
        fund(&a, &alice(), 1_000, Rate::DEFAULT_GLOBAL);
        a.adapter.set_peer_enabled(&a.owner, ChainId::new(2), false).unwrap();
        assert!(matches!(
            a.adapter
                .lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(1), Timestamp::new(0)),
            Err(BridgeError::UnknownPeer(_))
        ));
    }

    #[test]
    fn release_rejects_misaddressed_and_unknown_source() {
        let (a, b) = paired();
        let c = chain(3, Rate::DEFAULT_GLOBAL);
        c.adapter
            .register_peer(&c.owner, PeerConfig::new(ChainId::new(2), TokenAddress::ZERO))
            .unwrap();
        fund(&a, &alice(), 1_000, Rate::DEFAULT_GLOBAL);
        fund(&c, &alice(), 1_000, Rate::DEFAULT_GLOBAL);

        let to_b = a
            .adapter
            .lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(5), Timestamp::new(0))
            .unwrap();
        assert!(matches!(
            a.adapter.release_at(&to_b.payload, Timestamp::new(0)),
            Err(BridgeError::WrongDestination { .. })
        ));

        let from_c = c
            .adapter
            .lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(5), Timestamp::new(0))
            .unwrap();
        assert!(matches!(
            b.adapter.release_at(&from_c.payload, Timestamp::new(0)),
            Err(BridgeError::UnknownPeer(_))
        ));
    }

    #[test]
    fn duplicate_delivery_mints_twice() {
        let (a, b) = paired();
        fund(&a, &alice(), 100, Rate::DEFAULT_GLOBAL);
        let msg = a
            .adapter
            .lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(10), Timestamp::new(0))
            .unwrap();
        b.adapter.release_at(&msg.payload, Timestamp::new(0)).unwrap();
        b.adapter.release_at(&msg.payload, Timestamp::new(0)).unwrap();
        assert_eq!(
            b.adapter.ledger().balance_at(&bob(), Timestamp::new(0)).unwrap(),
            Amount::new(20)
        );
    }

    #[test]
    fn transfer_ids_differ_per_lock_and_match_events() {
        let (a, b) = paired();
        fund(&a, &alice(), 100, Rate::DEFAULT_GLOBAL);
        let t = Timestamp::new(0);
        let m1 = a.adapter.lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(1), t).unwrap();
        let m2 = a.adapter.lock_at(&alice(), ChainId::new(2), "rbt_bob", Amount::new(1), t).unwrap();
        assert_ne!(m1.transfer_id, m2.transfer_id);

        b.adapter.release_at(&m1.payload, t).unwrap();
        match b.adapter.drain_events().as_slice() {
            [BridgeEvent::Released { transfer_id, .. }] => assert_eq!(*transfer_id, m1.transfer_id),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn peer_registration_requires_owner() {
        let (a, _b) = paired();
        assert!(a
            .adapter
            .register_peer(&a.minter, PeerConfig::new(ChainId::new(5), TokenAddress::ZERO))
            .is_err());
    }
}
