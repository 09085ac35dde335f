//! Events recorded by a ledger instance.

use rebase_types::{AccountId, Amount, Rate, Timestamp};
use serde::{Deserialize, Serialize};

/// A committed ledger state change.
///
/// Events from a rolled-back batch are discarded with the batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Pending interest was folded into principal.
    InterestSettled {
        account: AccountId,
        interest: Amount,
        at: Timestamp,
    },
    Minted {
        account: AccountId,
        amount: Amount,
        rate: Rate,
        at: Timestamp,
    },
    Burned {
        account: AccountId,
        amount: Amount,
        at: Timestamp,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: Amount,
        /// Set when the recipient was empty and adopted the sender's rate.
        inherited_rate: Option<Rate>,
        at: Timestamp,
    },
    GlobalRateChanged {
        previous: Rate,
        current: Rate,
    },
}
