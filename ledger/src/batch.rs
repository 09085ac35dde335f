//! Atomic batches: group several ledger operations under one lock hold.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = ledger.batch(&operator)?;
//! let burned = batch.burn(&holder, AmountSpec::All, now)?;
//! reserve.release(&holder, burned)?;
//! batch.commit();
//! ```
//!
//! If the batch is dropped without calling [`LedgerBatch::commit`], every
//! account it touched is restored to its pre-batch record and the events it
//! recorded are discarded. No other caller can observe the intermediate state
//! because the ledger lock is held for the batch's whole lifetime.

use std::collections::BTreeMap;
use std::sync::MutexGuard;

use crate::account::AccountRecord;
use crate::error::LedgerError;
use crate::state::LedgerState;
use rebase_types::{AccountId, Amount, AmountSpec, Rate, Timestamp};

/// A set of ledger operations that commit or roll back together.
pub struct LedgerBatch<'a> {
    state: MutexGuard<'a, LedgerState>,
    /// Pre-batch record of every touched account (`None` = did not exist).
    journal: BTreeMap<AccountId, Option<AccountRecord>>,
    events_len: usize,
    committed: bool,
}

impl<'a> LedgerBatch<'a> {
    pub(crate) fn new(state: MutexGuard<'a, LedgerState>) -> Self {
        let events_len = state.events.len();
        Self {
            state,
            journal: BTreeMap::new(),
            events_len,
            committed: false,
        }
    }

    fn touch(&mut self, id: &AccountId) {
        if self.journal.contains_key(id) {
            return;
        }
        let original = self.state.accounts.get(id).cloned();
        self.journal.insert(id.clone(), original);
    }

    pub fn mint(
        &mut self,
        id: &AccountId,
        amount: Amount,
        rate: Rate,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.touch(id);
        self.state.mint(id, amount, rate, now)
    }

    pub fn burn(
        &mut self,
        id: &AccountId,
        amount: AmountSpec,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.touch(id);
        self.state.burn(id, amount, now)
    }

    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: AmountSpec,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.touch(from);
        self.touch(to);
        self.state.transfer(from, to, amount, now)
    }

    pub fn settle(&mut self, id: &AccountId, now: Timestamp) -> Result<Amount, LedgerError> {
        self.touch(id);
        self.state.settle(id, now)
    }

    pub fn effective_balance(&self, id: &AccountId, now: Timestamp) -> Result<Amount, LedgerError> {
        self.state.effective_balance(id, now)
    }

    pub fn rate_of(&self, id: &AccountId) -> Rate {
        self.state.rate_of(id)
    }

    pub fn global_rate(&self) -> Rate {
        self.state.global_rate()
    }

    /// Make every operation in this batch permanent.
    pub fn commit(mut self) {
        self.committed = true;
    }

    fn rollback(&mut self) {
        for (id, original) in std::mem::take(&mut self.journal) {
            match original {
                Some(record) => {
                    self.state.accounts.insert(id, record);
                }
                None => {
                    self.state.accounts.remove(&id);
                }
            }
        }
        let events_len = self.events_len;
        self.state.events.truncate(events_len);
    }
}

impl Drop for LedgerBatch<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.journal.is_empty() {
            tracing::debug!(accounts = self.journal.len(), "rolling back ledger batch");
            self.rollback();
        }
    }
}
