//! Token amount types.
//!
//! Amounts are represented as raw integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; 10^18 raw make one whole token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Raw units per whole token.
pub const TOKEN_UNIT: u128 = 1_000_000_000_000_000_000;

/// A ledger amount in raw units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens expressed in raw units. Saturates on overflow.
    pub fn tokens(whole: u128) -> Self {
        Self(whole.saturating_mul(TOKEN_UNIT))
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl From<u128> for Amount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How much of a balance an operation should move.
///
/// `All` resolves to the account's full settled balance at the time the
/// operation runs, so callers never need to race accrual to empty an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountSpec {
    Exact(Amount),
    All,
}

impl AmountSpec {
    /// Resolve against the settled balance the operation is about to spend.
    pub fn resolve(self, settled: Amount) -> Amount {
        match self {
            AmountSpec::Exact(amount) => amount,
            AmountSpec::All => settled,
        }
    }
}

impl From<Amount> for AmountSpec {
    fn from(amount: Amount) -> Self {
        AmountSpec::Exact(amount)
    }
}

impl From<u128> for AmountSpec {
    fn from(raw: u128) -> Self {
        AmountSpec::Exact(Amount::new(raw))
    }
}
