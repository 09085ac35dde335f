//! Nullable reserve: in-memory custody with failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rebase_gateway::{InMemoryReserve, ReserveError, ReserveVault};
use rebase_types::{AccountId, Amount};

/// An in-memory reserve whose pulls and releases can be made to fail.
#[derive(Default)]
pub struct NullReserve {
    inner: InMemoryReserve,
    fail_pulls: AtomicBool,
    fail_releases: AtomicBool,
    releases: AtomicUsize,
}

impl NullReserve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `account` reserve it can deposit.
    pub fn fund(&self, account: &AccountId, amount: Amount) {
        self.inner.fund(account, amount);
    }

    pub fn wallet_balance(&self, account: &AccountId) -> Amount {
        self.inner.wallet_balance(account)
    }

    pub fn fail_pulls(&self, fail: bool) {
        self.fail_pulls.store(fail, Ordering::SeqCst);
    }

    pub fn fail_releases(&self, fail: bool) {
        self.fail_releases.store(fail, Ordering::SeqCst);
    }

    /// Number of successful releases (for assertions).
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl ReserveVault for NullReserve {
    fn pull(&self, from: &AccountId, amount: Amount) -> Result<(), ReserveError> {
        if self.fail_pulls.load(Ordering::SeqCst) {
            return Err(ReserveError::Unavailable("pull failure injected".into()));
        }
        self.inner.pull(from, amount)
    }

    fn release(&self, to: &AccountId, amount: Amount) -> Result<(), ReserveError> {
        if self.fail_releases.load(Ordering::SeqCst) {
            return Err(ReserveError::Unavailable("release failure injected".into()));
        }
        self.inner.release(to, amount)?;
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn custody_balance(&self) -> Amount {
        self.inner.custody_balance()
    }
}
