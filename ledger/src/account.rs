//! Per-account accrual record.

use crate::accrual;
use crate::error::LedgerError;
use rebase_types::{Amount, Rate, Timestamp};
use serde::{Deserialize, Serialize};

/// The three persisted fields of an account.
///
/// Records are created lazily by the first balance-affecting operation and
/// are never removed; an emptied account keeps its rate and timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Last materialized balance. Excludes interest accrued since `last_update`.
    pub principal: Amount,
    /// Fixed per-second rate, scaled by `PRECISION_FACTOR`.
    pub rate: Rate,
    /// Time of the last settlement.
    pub last_update: Timestamp,
}

impl AccountRecord {
    /// An empty record opened at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            principal: Amount::ZERO,
            rate: Rate::ZERO,
            last_update: now,
        }
    }

    /// Interest accrued since the last settlement.
    ///
    /// A `now` earlier than `last_update` accrues nothing.
    pub fn pending_interest(&self, now: Timestamp) -> Result<Amount, LedgerError> {
        let elapsed = self.last_update.elapsed_since(now);
        accrual::accrued_interest(self.principal, self.rate, elapsed).ok_or(LedgerError::Overflow)
    }

    /// Principal plus interest accrued up to `now`.
    pub fn effective_balance(&self, now: Timestamp) -> Result<Amount, LedgerError> {
        let elapsed = self.last_update.elapsed_since(now);
        accrual::effective_balance(self.principal, self.rate, elapsed).ok_or(LedgerError::Overflow)
    }

    /// Fold pending interest into principal and advance `last_update` to `now`.
    ///
    /// The timestamp advances even when truncation leaves zero interest, so
    /// fractional interest below one raw unit is dropped at every settlement.
    /// Settling twice at the same `now` is a no-op the second time. Returns the
    /// interest materialized.
    pub fn settle(&mut self, now: Timestamp) -> Result<Amount, LedgerError> {
        let interest = self.pending_interest(now)?;
        self.principal = self
            .principal
            .checked_add(interest)
            .ok_or(LedgerError::Overflow)?;
        if now > self.last_update {
            self.last_update = now;
        }
        Ok(interest)
    }
}
