//! Global rate controller.

use crate::error::LedgerError;
use rebase_types::Rate;
use serde::{Deserialize, Serialize};

/// The protocol rate stamped on new deposits.
///
/// Lives inside one ledger instance. The only mutation is [`set_rate`],
/// which only ever lowers the value; existing holders keep whatever rate
/// they were minted at.
///
/// [`set_rate`]: GlobalRateController::set_rate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRateController {
    current: Rate,
}

impl GlobalRateController {
    pub fn new(initial: Rate) -> Self {
        Self { current: initial }
    }

    pub fn current_rate(&self) -> Rate {
        self.current
    }

    /// Lower the global rate. Returns the previous rate.
    pub fn set_rate(&mut self, new_rate: Rate) -> Result<Rate, LedgerError> {
        if new_rate >= self.current {
            return Err(LedgerError::RateIncreaseRejected {
                current: self.current.raw(),
                requested: new_rate.raw(),
            });
        }
        let previous = self.current;
        self.current = new_rate;
        Ok(previous)
    }
}

impl Default for GlobalRateController {
    fn default() -> Self {
        Self::new(Rate::DEFAULT_GLOBAL)
    }
}
