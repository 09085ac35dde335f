use rebase_types::{ChainId, TokenAddress};
use serde::{Deserialize, Serialize};

/// A remote chain this adapter may bridge to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub remote_chain: ChainId,
    /// Token contract on the remote chain that receives released mints.
    pub dest_token_address: TokenAddress,
    /// Disabled peers accept no new locks. In-flight releases still land.
    pub enabled: bool,
}

impl PeerConfig {
    pub fn new(remote_chain: ChainId, dest_token_address: TokenAddress) -> Self {
        Self {
            remote_chain,
            dest_token_address,
            enabled: true,
        }
    }
}
