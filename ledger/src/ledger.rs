//! The accrual ledger: one serialized state machine per chain instance.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::account::AccountRecord;
use crate::batch::LedgerBatch;
use crate::capability::{Capability, LedgerId, Role};
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::state::LedgerState;
use rebase_types::{
    AccountId, Amount, AmountSpec, ChainId, Clock, LedgerParams, Rate, SystemClock, Timestamp,
};

/// An interest-accrual ledger instance.
///
/// All state sits behind a single mutex, so every operation is linearized
/// against every other operation on the same instance, including reads of the
/// global rate during a mint. Two instances (one per chain) share nothing.
pub struct AccrualLedger {
    id: LedgerId,
    chain_id: ChainId,
    state: Mutex<LedgerState>,
    clock: Arc<dyn Clock>,
}

impl AccrualLedger {
    /// Create a ledger and the owner capability that administers it.
    pub fn new(params: LedgerParams, clock: Arc<dyn Clock>) -> (Self, Capability) {
        Self::from_state(
            params.chain_id,
            LedgerState::new(params.initial_global_rate),
            clock,
        )
    }

    /// Create a ledger reading time from the system clock.
    pub fn with_system_clock(params: LedgerParams) -> (Self, Capability) {
        Self::new(params, Arc::new(SystemClock))
    }

    pub(crate) fn from_state(
        chain_id: ChainId,
        state: LedgerState,
        clock: Arc<dyn Clock>,
    ) -> (Self, Capability) {
        let id = LedgerId::next();
        tracing::info!(
            ledger = %id,
            chain = %chain_id,
            global_rate = %state.global_rate(),
            "ledger created"
        );
        let ledger = Self {
            id,
            chain_id,
            state: Mutex::new(state),
            clock,
        };
        let owner = Capability::issue(id, Role::Owner, "owner");
        (ledger, owner)
    }

    pub fn id(&self) -> LedgerId {
        self.id
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Current time according to this instance's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Check that `capability` was issued by this ledger for `role`.
    pub fn authorize(&self, capability: &Capability, role: Role) -> Result<(), LedgerError> {
        if capability.permits(self.id, role) {
            Ok(())
        } else {
            tracing::warn!(
                ledger = %self.id,
                holder = capability.holder(),
                required = ?role,
                "unauthorized ledger call rejected"
            );
            Err(LedgerError::Unauthorized { required: role })
        }
    }

    /// Issue an operator capability. Requires the owner capability.
    pub fn grant_operator(
        &self,
        owner: &Capability,
        holder: impl Into<String>,
    ) -> Result<Capability, LedgerError> {
        self.authorize(owner, Role::Owner)?;
        let capability = Capability::issue(self.id, Role::Operator, holder);
        tracing::info!(ledger = %self.id, holder = capability.holder(), "operator granted");
        Ok(capability)
    }

    /// Open an atomic batch. Requires an operator capability.
    pub fn batch(&self, operator: &Capability) -> Result<LedgerBatch<'_>, LedgerError> {
        self.authorize(operator, Role::Operator)?;
        Ok(LedgerBatch::new(self.lock()?))
    }

    // ── Privileged mutations ────────────────────────────────────────────

    /// Settle `account`, stamp it with `rate`, and add `amount` to its
    /// principal. Returns the new principal.
    pub fn mint(
        &self,
        operator: &Capability,
        account: &AccountId,
        amount: Amount,
        rate: Rate,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.authorize(operator, Role::Operator)?;
        let principal = self.lock()?.mint(account, amount, rate, now)?;
        tracing::debug!(
            ledger = %self.id,
            %account,
            %amount,
            %rate,
            %principal,
            "minted"
        );
        Ok(principal)
    }

    /// Settle `account` and burn `amount` from it. Returns the amount burned.
    pub fn burn(
        &self,
        operator: &Capability,
        account: &AccountId,
        amount: AmountSpec,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.authorize(operator, Role::Operator)?;
        let burned = self.lock()?.burn(account, amount, now).map_err(|e| {
            tracing::warn!(ledger = %self.id, %account, error = %e, "burn rejected");
            e
        })?;
        tracing::debug!(ledger = %self.id, %account, amount = %burned, "burned");
        Ok(burned)
    }

    /// Lower the global rate. Requires the owner capability.
    pub fn set_global_rate(&self, owner: &Capability, rate: Rate) -> Result<Rate, LedgerError> {
        self.authorize(owner, Role::Owner)?;
        let previous = self.lock()?.set_global_rate(rate).map_err(|e| {
            tracing::warn!(ledger = %self.id, requested = %rate, error = %e, "rate change rejected");
            e
        })?;
        tracing::info!(ledger = %self.id, %previous, current = %rate, "global rate lowered");
        Ok(previous)
    }

    // ── Holder operations ───────────────────────────────────────────────

    /// Move `amount` from `from` to `to`, settling both first.
    ///
    /// Authenticating `from` is the caller's responsibility.
    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: AmountSpec,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let moved = self.lock()?.transfer(from, to, amount, now).map_err(|e| {
            tracing::warn!(ledger = %self.id, %from, %to, error = %e, "transfer rejected");
            e
        })?;
        tracing::debug!(ledger = %self.id, %from, %to, amount = %moved, "transferred");
        Ok(moved)
    }

    /// Materialize pending interest for `account`. Returns the interest folded in.
    pub fn settle(&self, account: &AccountId, now: Timestamp) -> Result<Amount, LedgerError> {
        self.lock()?.settle(account, now)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// Effective balance now.
    pub fn balance_of(&self, account: &AccountId) -> Result<Amount, LedgerError> {
        self.balance_at(account, self.now())
    }

    /// Effective balance at an explicit time.
    pub fn balance_at(&self, account: &AccountId, now: Timestamp) -> Result<Amount, LedgerError> {
        self.lock()?.effective_balance(account, now)
    }

    pub fn principal_balance_of(&self, account: &AccountId) -> Result<Amount, LedgerError> {
        Ok(self.lock()?.principal_of(account))
    }

    pub fn get_rate(&self, account: &AccountId) -> Result<Rate, LedgerError> {
        Ok(self.lock()?.rate_of(account))
    }

    pub fn global_rate(&self) -> Result<Rate, LedgerError> {
        Ok(self.lock()?.global_rate())
    }

    /// Projected balance at `future`, which must be strictly after now.
    pub fn simulate_balance(
        &self,
        account: &AccountId,
        future: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.simulate_balance_from(account, future, self.now())
    }

    /// [`simulate_balance`](Self::simulate_balance) against an explicit "now".
    pub fn simulate_balance_from(
        &self,
        account: &AccountId,
        future: Timestamp,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        if future <= now {
            return Err(LedgerError::InvalidProjectionTime {
                requested: future.as_secs(),
                now: now.as_secs(),
            });
        }
        self.balance_at(account, future)
    }

    /// The record for `account`, or an error if it was never opened.
    pub fn account(&self, account: &AccountId) -> Result<AccountRecord, LedgerError> {
        self.lock()?
            .account(account)
            .cloned()
            .ok_or_else(|| LedgerError::NoSuchAccount(account.to_string()))
    }

    pub fn account_count(&self) -> Result<usize, LedgerError> {
        Ok(self.lock()?.account_count())
    }

    pub fn total_principal(&self) -> Result<Amount, LedgerError> {
        self.lock()?.total_principal()
    }

    pub fn total_supply(&self, now: Timestamp) -> Result<Amount, LedgerError> {
        self.lock()?.total_supply(now)
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&self) -> Result<Vec<LedgerEvent>, LedgerError> {
        Ok(self.lock()?.drain_events())
    }
}
