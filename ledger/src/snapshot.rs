//! Ledger snapshots: capture the persisted state of an instance.
//!
//! A snapshot holds exactly what a ledger persists: each account's three
//! fields and the global rate. The snapshot hash is computed
//! deterministically from that state so a restored instance can be checked
//! against the one it was taken from.

use std::collections::BTreeMap;
use std::sync::Arc;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use crate::account::AccountRecord;
use crate::capability::Capability;
use crate::error::LedgerError;
use crate::ledger::AccrualLedger;
use crate::rate::GlobalRateController;
use crate::state::LedgerState;
use rebase_types::{AccountId, ChainId, Clock, Rate, Timestamp};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The persisted state of one ledger instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 of the chain id, global rate and accounts.
    pub hash: [u8; 32],
    pub version: u32,
    pub chain_id: ChainId,
    pub global_rate: Rate,
    /// When the snapshot was taken (not covered by the hash).
    pub taken_at: Timestamp,
    /// Accounts in identifier order.
    pub accounts: Vec<(AccountId, AccountRecord)>,
}

impl LedgerSnapshot {
    fn compute_hash(&self) -> [u8; 32] {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.chain_id.as_u32().to_le_bytes());
        hasher.update(self.global_rate.raw().to_le_bytes());
        for (id, record) in &self.accounts {
            hasher.update(id.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(record.principal.raw().to_le_bytes());
            hasher.update(record.rate.raw().to_le_bytes());
            hasher.update(record.last_update.as_secs().to_le_bytes());
        }
        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches its contents.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Deserialize a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl AccrualLedger {
    /// Capture the persisted state of this instance.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let taken_at = self.now();
        let state = self.lock()?;
        let mut snapshot = LedgerSnapshot {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            chain_id: self.chain_id(),
            global_rate: state.global_rate(),
            taken_at,
            accounts: state
                .accounts
                .iter()
                .map(|(id, record)| (id.clone(), record.clone()))
                .collect(),
        };
        snapshot.hash = snapshot.compute_hash();
        Ok(snapshot)
    }

    /// Rebuild an instance from a verified snapshot.
    ///
    /// The restored ledger has a fresh identity, so capabilities issued by the
    /// original instance do not carry over; a new owner capability is returned.
    pub fn restore(
        snapshot: LedgerSnapshot,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, Capability), LedgerError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if !snapshot.verify() {
            return Err(LedgerError::Snapshot("snapshot hash mismatch".into()));
        }
        let accounts: BTreeMap<AccountId, AccountRecord> = snapshot.accounts.into_iter().collect();
        let state = LedgerState {
            accounts,
            rate: GlobalRateController::new(snapshot.global_rate),
            events: Vec::new(),
        };
        Ok(Self::from_state(snapshot.chain_id, state, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebase_types::{Amount, LedgerParams, SystemClock};

    fn populated() -> AccrualLedger {
        let (ledger, owner) = AccrualLedger::with_system_clock(LedgerParams::default());
        let op = ledger.grant_operator(&owner, "op").unwrap();
        for (name, amount) in [("alice", 100_000u128), ("bob", 5_000)] {
            ledger
                .mint(
                    &op,
                    &AccountId::new(format!("rbt_{name}")),
                    Amount::new(amount),
                    Rate::DEFAULT_GLOBAL,
                    Timestamp::new(100),
                )
                .unwrap();
        }
        ledger
            .set_global_rate(&owner, Rate::new(Rate::DEFAULT_GLOBAL.raw() - 1))
            .unwrap();
        ledger
    }

    #[test]
    fn snapshot_restores_identical_state() {
        let ledger = populated();
        let snap = ledger.snapshot().unwrap();
        assert!(snap.verify());
        assert_eq!(snap.account_count(), 2);

        let bytes = snap.to_bytes().unwrap();
        let decoded = LedgerSnapshot::from_bytes(&bytes).unwrap();
        let (restored, _owner) = AccrualLedger::restore(decoded, Arc::new(SystemClock)).unwrap();

        let alice = AccountId::new("rbt_alice");
        assert_eq!(restored.account(&alice).unwrap(), ledger.account(&alice).unwrap());
        assert_eq!(restored.global_rate().unwrap(), ledger.global_rate().unwrap());
        assert_ne!(restored.id(), ledger.id());
        assert_eq!(restored.snapshot().unwrap().hash, snap.hash);
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let mut snap = populated().snapshot().unwrap();
        snap.accounts[0].1.principal = Amount::new(1);
        assert!(!snap.verify());
        assert!(matches!(
            AccrualLedger::restore(snap, Arc::new(SystemClock)),
            Err(LedgerError::Snapshot(_))
        ));
    }

    #[test]
    fn old_capabilities_do_not_work_on_restored_ledger() {
        let (ledger, owner) = AccrualLedger::with_system_clock(LedgerParams::default());
        let op = ledger.grant_operator(&owner, "op").unwrap();
        let (restored, _) =
            AccrualLedger::restore(ledger.snapshot().unwrap(), Arc::new(SystemClock)).unwrap();
        assert!(restored
            .mint(&op, &AccountId::new("rbt_x"), Amount::new(1), Rate::ZERO, Timestamp::new(1))
            .is_err());
    }
}
