//! Deposit and redemption against the ledger.

use std::sync::{Arc, Mutex};

use crate::error::GatewayError;
use crate::events::GatewayEvent;
use crate::reserve::ReserveVault;
use rebase_ledger::{AccrualLedger, Capability, LedgerError, Role};
use rebase_types::{AccountId, Amount, AmountSpec, Timestamp};

/// Custodian of the reserve asset for one ledger instance.
///
/// The gateway holds an operator capability. A deposit pulls reserve before
/// taking the ledger lock, then reads the global rate and mints inside one
/// batch. A redemption burns and releases reserve inside one batch, so a
/// failed release leaves the holder's account untouched.
pub struct CustodyGateway {
    ledger: Arc<AccrualLedger>,
    operator: Capability,
    reserve: Arc<dyn ReserveVault>,
    events: Mutex<Vec<GatewayEvent>>,
}

impl CustodyGateway {
    /// Fails with `Unauthorized` unless `operator` was issued by `ledger`.
    pub fn new(
        ledger: Arc<AccrualLedger>,
        operator: Capability,
        reserve: Arc<dyn ReserveVault>,
    ) -> Result<Self, GatewayError> {
        ledger.authorize(&operator, Role::Operator)?;
        Ok(Self {
            ledger,
            operator,
            reserve,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn ledger(&self) -> &Arc<AccrualLedger> {
        &self.ledger
    }

    pub fn custody_balance(&self) -> Amount {
        self.reserve.custody_balance()
    }

    /// Deposit reserve at the ledger clock's current time.
    pub fn deposit(&self, depositor: &AccountId, amount: Amount) -> Result<Amount, GatewayError> {
        self.deposit_at(depositor, amount, self.ledger.now())
    }

    /// Pull `amount` of reserve into custody and mint the same amount at the
    /// current global rate. Returns the balance delta credited.
    ///
    /// If the mint fails the pulled reserve is released back to `depositor`.
    /// When that refund fails too, [`GatewayError::StrandedReserve`] names the
    /// amount left in custody with no balance behind it.
    pub fn deposit_at(
        &self,
        depositor: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount, GatewayError> {
        if amount.is_zero() {
            tracing::warn!(account = %depositor, "zero deposit rejected");
            return Err(GatewayError::ZeroAmount);
        }

        self.reserve.pull(depositor, amount).map_err(|e| {
            tracing::warn!(account = %depositor, %amount, error = %e, "reserve pull failed");
            e
        })?;

        let mut batch = match self.ledger.batch(&self.operator) {
            Ok(batch) => batch,
            Err(e) => return Err(self.refund(depositor, amount, e)),
        };
        let rate = batch.global_rate();
        if let Err(e) = batch.mint(depositor, amount, rate, now) {
            drop(batch);
            return Err(self.refund(depositor, amount, e));
        }
        batch.commit();

        tracing::info!(account = %depositor, %amount, %rate, "deposit");
        self.record(GatewayEvent::Deposit {
            account: depositor.clone(),
            amount,
            at: now,
        });
        Ok(amount)
    }

    /// Redeem at the ledger clock's current time.
    pub fn redeem(&self, holder: &AccountId, amount: AmountSpec) -> Result<Amount, GatewayError> {
        self.redeem_at(holder, amount, self.ledger.now())
    }

    /// Redeem the holder's entire settled balance.
    pub fn redeem_all(&self, holder: &AccountId) -> Result<Amount, GatewayError> {
        self.redeem(holder, AmountSpec::All)
    }

    /// Burn tokens and release the same amount of reserve.
    ///
    /// An exact amount of zero is treated as [`AmountSpec::All`]. If the
    /// reserve release fails the burn is rolled back and the holder's account
    /// is left exactly as it was. Returns the reserve released.
    pub fn redeem_at(
        &self,
        holder: &AccountId,
        amount: AmountSpec,
        now: Timestamp,
    ) -> Result<Amount, GatewayError> {
        let mut batch = self.ledger.batch(&self.operator)?;
        let settled = batch.effective_balance(holder, now)?;
        let requested = match amount {
            AmountSpec::Exact(a) if a.is_zero() => settled,
            other => other.resolve(settled),
        };
        if requested.is_zero() || requested > settled {
            tracing::warn!(
                account = %holder,
                requested = %requested,
                available = %settled,
                "redemption rejected"
            );
            return Err(GatewayError::InsufficientBalance {
                needed: requested.raw(),
                available: settled.raw(),
            });
        }

        let burned = batch.burn(holder, AmountSpec::Exact(requested), now)?;
        if let Err(e) = self.reserve.release(holder, burned) {
            tracing::error!(
                account = %holder,
                amount = %burned,
                error = %e,
                "reserve release failed, rolling back burn"
            );
            drop(batch);
            return Err(GatewayError::ReserveTransferFailed(e));
        }
        batch.commit();

        tracing::info!(account = %holder, amount = %burned, "redeem");
        self.record(GatewayEvent::Redeem {
            account: holder.clone(),
            amount: burned,
            at: now,
        });
        Ok(burned)
    }

    /// Return pulled reserve after the ledger refused the mint.
    fn refund(&self, depositor: &AccountId, amount: Amount, cause: LedgerError) -> GatewayError {
        match self.reserve.release(depositor, amount) {
            Ok(()) => cause.into(),
            Err(refund) => {
                tracing::error!(
                    account = %depositor,
                    %amount,
                    mint_error = %cause,
                    error = %refund,
                    "refund of pulled reserve failed"
                );
                GatewayError::StrandedReserve {
                    account: depositor.to_string(),
                    amount: amount.raw(),
                    mint: cause,
                    refund,
                }
            }
        }
    }

    fn record(&self, event: GatewayEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Take all events recorded since the last drain.
    pub fn drain_events(&self) -> Vec<GatewayEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}
