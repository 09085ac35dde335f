//! Fixed-point interest rates.
//!
//! A rate is the fraction of principal accrued per second, scaled by
//! [`PRECISION_FACTOR`]. A rate of `PRECISION_FACTOR` would double a balance
//! every second; realistic rates are many orders of magnitude smaller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scale of every fixed-point rate (18 decimals).
pub const PRECISION_FACTOR: u128 = 1_000_000_000_000_000_000;

/// Interest rate per second in 18-decimal fixed point.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Rate(u128);

impl Rate {
    pub const ZERO: Self = Self(0);

    /// Global rate every ledger starts with: `5 * 10^-8` per second.
    pub const DEFAULT_GLOBAL: Self = Self((5 * PRECISION_FACTOR) / 100_000_000);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u128> for Rate {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_global_rate_is_five_e_ten() {
        assert_eq!(Rate::DEFAULT_GLOBAL.raw(), 50_000_000_000);
    }
}
