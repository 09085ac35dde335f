//! The reserve asset held in custody.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::ReserveError;
use rebase_types::{AccountId, Amount};

/// The external reserve asset as seen from the gateway.
///
/// `pull` moves reserve from a depositor into custody; `release` moves it from
/// custody back out. Both either complete or leave the vault unchanged.
pub trait ReserveVault: Send + Sync {
    fn pull(&self, from: &AccountId, amount: Amount) -> Result<(), ReserveError>;

    fn release(&self, to: &AccountId, amount: Amount) -> Result<(), ReserveError>;

    /// Reserve currently in custody.
    fn custody_balance(&self) -> Amount;
}

#[derive(Default)]
struct Holdings {
    custody: Amount,
    wallets: BTreeMap<AccountId, Amount>,
}

/// A reserve kept in process memory, with per-account wallet balances outside
/// custody.
#[derive(Default)]
pub struct InMemoryReserve {
    holdings: Mutex<Holdings>,
}

impl InMemoryReserve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `account`'s wallet with reserve it can later deposit.
    pub fn fund(&self, account: &AccountId, amount: Amount) {
        if let Ok(mut holdings) = self.holdings.lock() {
            let wallet = holdings.wallets.entry(account.clone()).or_default();
            *wallet = Amount::new(wallet.raw().saturating_add(amount.raw()));
        }
    }

    /// Reserve held by `account` outside custody.
    pub fn wallet_balance(&self, account: &AccountId) -> Amount {
        self.holdings
            .lock()
            .ok()
            .and_then(|h| h.wallets.get(account).copied())
            .unwrap_or_default()
    }
}

impl ReserveVault for InMemoryReserve {
    fn pull(&self, from: &AccountId, amount: Amount) -> Result<(), ReserveError> {
        let mut holdings = self
            .holdings
            .lock()
            .map_err(|_| ReserveError::Unavailable("reserve lock poisoned".into()))?;
        let available = holdings.wallets.get(from).copied().unwrap_or_default();
        if amount > available {
            return Err(ReserveError::InsufficientFunds {
                account: from.to_string(),
                needed: amount.raw(),
                available: available.raw(),
            });
        }
        let custody = holdings
            .custody
            .checked_add(amount)
            .ok_or_else(|| ReserveError::Unavailable("custody overflow".into()))?;
        holdings.wallets.insert(from.clone(), available - amount);
        holdings.custody = custody;
        Ok(())
    }

    fn release(&self, to: &AccountId, amount: Amount) -> Result<(), ReserveError> {
        let mut holdings = self
            .holdings
            .lock()
            .map_err(|_| ReserveError::Unavailable("reserve lock poisoned".into()))?;
        if amount > holdings.custody {
            return Err(ReserveError::CustodyShortfall {
                needed: amount.raw(),
                available: holdings.custody.raw(),
            });
        }
        holdings.custody = holdings.custody - amount;
        let wallet = holdings.wallets.entry(to.clone()).or_default();
        *wallet = Amount::new(wallet.raw().saturating_add(amount.raw()));
        Ok(())
    }

    fn custody_balance(&self) -> Amount {
        self.holdings
            .lock()
            .map(|h| h.custody)
            .unwrap_or_default()
    }
}
