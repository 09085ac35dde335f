use rebase_types::{AccountId, Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// Observable gateway outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// Reserve taken into custody and the same amount minted to `account`.
    Deposit {
        account: AccountId,
        amount: Amount,
        at: Timestamp,
    },
    /// Tokens burned from `account` and the same amount of reserve released.
    Redeem {
        account: AccountId,
        amount: Amount,
        at: Timestamp,
    },
}
