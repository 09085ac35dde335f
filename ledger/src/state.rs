//! The ledger state machine: accounts, the global rate and the event log.
//!
//! Every operation validates against freshly projected balances before
//! touching anything, then settles the affected accounts, then applies its
//! rate and principal changes. A failed operation leaves the state exactly
//! as it found it.

use std::collections::BTreeMap;

use crate::account::AccountRecord;
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::rate::GlobalRateController;
use rebase_types::{AccountId, Amount, AmountSpec, Rate, Timestamp};

/// All mutable state of one ledger instance.
#[derive(Clone, Debug)]
pub struct LedgerState {
    pub(crate) accounts: BTreeMap<AccountId, AccountRecord>,
    pub(crate) rate: GlobalRateController,
    pub(crate) events: Vec<LedgerEvent>,
}

impl LedgerState {
    pub fn new(initial_rate: Rate) -> Self {
        Self {
            accounts: BTreeMap::new(),
            rate: GlobalRateController::new(initial_rate),
            events: Vec::new(),
        }
    }

    pub fn account(&self, id: &AccountId) -> Option<&AccountRecord> {
        self.accounts.get(id)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn global_rate(&self) -> Rate {
        self.rate.current_rate()
    }

    /// Effective balance at `now`. Unknown accounts read as zero.
    pub fn effective_balance(&self, id: &AccountId, now: Timestamp) -> Result<Amount, LedgerError> {
        match self.accounts.get(id) {
            Some(record) => record.effective_balance(now),
            None => Ok(Amount::ZERO),
        }
    }

    /// Materialized principal. Unknown accounts read as zero.
    pub fn principal_of(&self, id: &AccountId) -> Amount {
        self.accounts.get(id).map(|r| r.principal).unwrap_or(Amount::ZERO)
    }

    /// Rate of an account. Unknown accounts read as zero.
    pub fn rate_of(&self, id: &AccountId) -> Rate {
        self.accounts.get(id).map(|r| r.rate).unwrap_or(Rate::ZERO)
    }

    /// Materialize pending interest for `id`. Unknown accounts are left alone.
    pub fn settle(&mut self, id: &AccountId, now: Timestamp) -> Result<Amount, LedgerError> {
        let interest = match self.accounts.get_mut(id) {
            Some(record) => record.settle(now)?,
            None => return Ok(Amount::ZERO),
        };
        if !interest.is_zero() {
            self.events.push(LedgerEvent::InterestSettled {
                account: id.clone(),
                interest,
                at: now,
            });
        }
        Ok(interest)
    }

    fn open(&mut self, id: &AccountId, now: Timestamp) -> &mut AccountRecord {
        self.accounts
            .entry(id.clone())
            .or_insert_with(|| AccountRecord::new(now))
    }

    /// Settle, overwrite the rate with `rate`, then add `amount` to principal.
    /// Returns the new principal.
    pub fn mint(
        &mut self,
        id: &AccountId,
        amount: Amount,
        rate: Rate,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let settled = self.effective_balance(id, now)?;
        settled.checked_add(amount).ok_or(LedgerError::Overflow)?;

        self.settle(id, now)?;
        let record = self.open(id, now);
        record.rate = rate;
        record.principal = record
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let principal = record.principal;

        self.events.push(LedgerEvent::Minted {
            account: id.clone(),
            amount,
            rate,
            at: now,
        });
        Ok(principal)
    }

    /// Settle, then remove `amount` (or the whole settled balance) from
    /// principal. Returns the amount burned.
    pub fn burn(
        &mut self,
        id: &AccountId,
        amount: AmountSpec,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let settled = self.effective_balance(id, now)?;
        let amount = amount.resolve(settled);
        if amount > settled {
            return Err(LedgerError::InsufficientBalance {
                needed: amount.raw(),
                available: settled.raw(),
            });
        }
        if !self.accounts.contains_key(id) {
            return Ok(Amount::ZERO);
        }

        self.settle(id, now)?;
        let record = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::NoSuchAccount(id.to_string()))?;
        record.principal = record.principal.checked_sub(amount).ok_or(
            LedgerError::InsufficientBalance {
                needed: amount.raw(),
                available: record.principal.raw(),
            },
        )?;

        self.events.push(LedgerEvent::Burned {
            account: id.clone(),
            amount,
            at: now,
        });
        Ok(amount)
    }

    /// Settle both sides and move `amount` from `from` to `to`.
    ///
    /// An empty recipient adopts the sender's rate; a recipient that already
    /// holds a balance keeps its own. Returns the amount moved.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: AmountSpec,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let available = self.effective_balance(from, now)?;
        let amount = amount.resolve(available);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                needed: amount.raw(),
                available: available.raw(),
            });
        }
        if !self.accounts.contains_key(from) {
            return Ok(Amount::ZERO);
        }
        if from == to {
            self.settle(from, now)?;
            return Ok(amount);
        }
        let recipient_balance = self.effective_balance(to, now)?;
        recipient_balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let inherited_rate = recipient_balance.is_zero().then(|| self.rate_of(from));

        self.settle(from, now)?;
        self.settle(to, now)?;

        if let Some(sender) = self.accounts.get_mut(from) {
            sender.principal = sender.principal.checked_sub(amount).ok_or(
                LedgerError::InsufficientBalance {
                    needed: amount.raw(),
                    available: sender.principal.raw(),
                },
            )?;
        }
        let recipient = self.open(to, now);
        if let Some(rate) = inherited_rate {
            recipient.rate = rate;
        }
        recipient.principal = recipient
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.events.push(LedgerEvent::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount,
            inherited_rate,
            at: now,
        });
        Ok(amount)
    }

    /// Lower the global rate. Returns the previous rate.
    pub fn set_global_rate(&mut self, rate: Rate) -> Result<Rate, LedgerError> {
        let previous = self.rate.set_rate(rate)?;
        self.events.push(LedgerEvent::GlobalRateChanged {
            previous,
            current: rate,
        });
        Ok(previous)
    }

    /// Sum of materialized principal over all accounts.
    pub fn total_principal(&self) -> Result<Amount, LedgerError> {
        self.accounts.values().try_fold(Amount::ZERO, |acc, r| {
            acc.checked_add(r.principal).ok_or(LedgerError::Overflow)
        })
    }

    /// Sum of effective balances at `now`. Walks every account.
    pub fn total_supply(&self, now: Timestamp) -> Result<Amount, LedgerError> {
        self.accounts.values().try_fold(Amount::ZERO, |acc, r| {
            acc.checked_add(r.effective_balance(now)?)
                .ok_or(LedgerError::Overflow)
        })
    }

    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new(Rate::DEFAULT_GLOBAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> AccountId {
        AccountId::new(format!("rbt_{name}"))
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    const R0: Rate = Rate::DEFAULT_GLOBAL;

    #[test]
    fn mint_creates_account_with_rate() {
        let mut s = LedgerState::default();
        let principal = s.mint(&id("alice"), Amount::new(100_000), R0, ts(10)).unwrap();
        assert_eq!(principal, Amount::new(100_000));
        let record = s.account(&id("alice")).unwrap();
        assert_eq!(record.rate, R0);
        assert_eq!(record.last_update, ts(10));
    }

    #[test]
    fn mint_settles_before_overwriting_rate() {
        let mut s = LedgerState::default();
        s.mint(&id("alice"), Amount::new(100_000), R0, ts(0)).unwrap();
        // One hour of interest at R0 is 18; it must be kept even though the
        // new mint stamps rate zero.
        s.mint(&id("alice"), Amount::new(1), Rate::ZERO, ts(3600)).unwrap();
        let record = s.account(&id("alice")).unwrap();
        assert_eq!(record.principal, Amount::new(100_019));
        assert_eq!(record.rate, Rate::ZERO);
    }

    #[test]
    fn burn_rejects_overdraft_without_side_effects() {
        let mut s = LedgerState::default();
        s.mint(&id("alice"), Amount::new(100), R0, ts(0)).unwrap();
        let before = s.account(&id("alice")).cloned();
        let events = s.events.len();
        let err = s.burn(&id("alice"), AmountSpec::from(101), ts(0)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { needed: 101, available: 100 }
        ));
        assert_eq!(s.account(&id("alice")).cloned(), before);
        assert_eq!(s.events.len(), events);
    }

    #[test]
    fn burn_all_empties_settled_balance() {
        let mut s = LedgerState::default();
        s.mint(&id("alice"), Amount::new(100_000), R0, ts(0)).unwrap();
        let burned = s.burn(&id("alice"), AmountSpec::All, ts(3600)).unwrap();
        assert_eq!(burned, Amount::new(100_018));
        assert_eq!(s.effective_balance(&id("alice"), ts(7200)).unwrap(), Amount::ZERO);
    }

    #[test]
    fn burn_on_unknown_account() {
        let mut s = LedgerState::default();
        assert_eq!(s.burn(&id("ghost"), AmountSpec::All, ts(5)).unwrap(), Amount::ZERO);
        assert!(s.account(&id("ghost")).is_none());
        assert!(s.burn(&id("ghost"), AmountSpec::from(1), ts(5)).is_err());
    }

    #[test]
    fn transfer_into_empty_account_inherits_rate() {
        let mut s = LedgerState::default();
        s.mint(&id("alice"), Amount::new(1_000), R0, ts(0)).unwrap();
        s.transfer(&id("alice"), &id("bob"), AmountSpec::from(400), ts(0)).unwrap();
        assert_eq!(s.rate_of(&id("bob")), R0);
        assert_eq!(s.principal_of(&id("bob")), Amount::new(400));
        assert_eq!(s.principal_of(&id("alice")), Amount::new(600));
    }

    #[test]
    fn transfer_into_funded_account_keeps_recipient_rate() {
        let mut s = LedgerState::default();
        let low = Rate::new(10_000_000_000);
        s.mint(&id("alice"), Amount::new(1_000), R0, ts(0)).unwrap();
        s.mint(&id("bob"), Amount::new(1_000), low, ts(0)).unwrap();
        s.transfer(&id("alice"), &id("bob"), AmountSpec::from(500), ts(0)).unwrap();
        assert_eq!(s.rate_of(&id("bob")), low);
    }

    #[test]
    fn self_transfer_only_settles() {
        let mut s = LedgerState::default();
        s.mint(&id("alice"), Amount::new(100_000), R0, ts(0)).unwrap();
        let moved = s
            .transfer(&id("alice"), &id("alice"), AmountSpec::from(10), ts(3600))
            .unwrap();
        assert_eq!(moved, Amount::new(10));
        assert_eq!(s.principal_of(&id("alice")), Amount::new(100_018));
    }

    #[test]
    fn totals_track_principal_and_supply() {
        let mut s = LedgerState::default();
        s.mint(&id("alice"), Amount::new(100_000), R0, ts(0)).unwrap();
        s.mint(&id("bob"), Amount::new(100_000), R0, ts(0)).unwrap();
        assert_eq!(s.total_principal().unwrap(), Amount::new(200_000));
        assert_eq!(s.total_supply(ts(3600)).unwrap(), Amount::new(200_036));
    }

    #[test]
    fn events_drain_in_order() {
        let mut s = LedgerState::default();
        s.mint(&id("alice"), Amount::new(100_000), R0, ts(0)).unwrap();
        s.burn(&id("alice"), AmountSpec::from(1), ts(3600)).unwrap();
        let events = s.drain_events();
        assert!(matches!(events[0], LedgerEvent::Minted { .. }));
        assert!(matches!(events[1], LedgerEvent::InterestSettled { .. }));
        assert!(matches!(events[2], LedgerEvent::Burned { .. }));
        assert!(s.drain_events().is_empty());
    }
}
