//! Capability tokens for privileged ledger callers.
//!
//! A ledger hands out its owner capability once, at construction. The owner
//! grants operator capabilities to the components allowed to mint and burn
//! (the custody gateway, the bridge adapter). Every privileged call checks
//! that the presented capability was issued by this ledger for the required
//! role. Capabilities cannot be forged outside this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LEDGER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a ledger instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerId(u64);

impl LedgerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LEDGER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ledger-{}", self.0)
    }
}

/// What a capability allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May lower the global rate and grant operator capabilities.
    Owner,
    /// May mint and burn.
    Operator,
}

/// Proof that the holder may perform `role` operations on one ledger.
#[derive(Clone, Debug)]
pub struct Capability {
    ledger: LedgerId,
    role: Role,
    holder: String,
}

impl Capability {
    pub(crate) fn issue(ledger: LedgerId, role: Role, holder: impl Into<String>) -> Self {
        Self {
            ledger,
            role,
            holder: holder.into(),
        }
    }

    pub fn ledger(&self) -> LedgerId {
        self.ledger
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Label given at grant time, used in logs.
    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub(crate) fn permits(&self, ledger: LedgerId, role: Role) -> bool {
        self.ledger == ledger && self.role == role
    }
}
