//! Ledger parameters fixed at instance creation.

use crate::chain::ChainId;
use crate::rate::Rate;
use serde::{Deserialize, Serialize};

/// Parameters a ledger instance is constructed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Chain this instance lives on.
    pub chain_id: ChainId,

    /// Global rate at creation. Only ever lowered afterwards.
    pub initial_global_rate: Rate,
}

impl LedgerParams {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            initial_global_rate: Rate::DEFAULT_GLOBAL,
        }
    }

    pub fn with_rate(mut self, rate: Rate) -> Self {
        self.initial_global_rate = rate;
        self
    }
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self::new(ChainId::new(1))
    }
}
