use rebase_types::{AccountId, Amount, ChainId, Rate, Timestamp, TransferId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeEvent {
    /// Tokens burned on this chain and a frame emitted toward `remote_chain`.
    Locked {
        transfer_id: TransferId,
        sender: AccountId,
        recipient: AccountId,
        remote_chain: ChainId,
        amount: Amount,
        rate: Rate,
        at: Timestamp,
    },
    /// Tokens minted on this chain from a frame sent by `source_chain`.
    Released {
        transfer_id: TransferId,
        recipient: AccountId,
        source_chain: ChainId,
        amount: Amount,
        rate: Rate,
        at: Timestamp,
    },
}
