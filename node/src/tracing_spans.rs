//! Pre-built [`tracing::Span`] constructors for common node operations.
//!
//! Using consistent span names and field sets across the codebase makes it
//! easy to follow one deposit, redemption or cross-chain transfer through
//! logs from both chains.

use tracing::{info_span, Span};

use rebase_types::{AccountId, ChainId, TransferId};

/// Span covering a reserve deposit and the mint it produces.
pub fn deposit_span(chain: ChainId, account: &AccountId) -> Span {
    info_span!("deposit", chain = %chain, account = %account)
}

/// Span covering a redemption: burn, reserve release and any rollback.
pub fn redeem_span(chain: ChainId, account: &AccountId) -> Span {
    info_span!("redeem", chain = %chain, account = %account)
}

/// Span covering the source side of a bridge transfer.
pub fn lock_span(chain: ChainId, account: &AccountId, remote: ChainId) -> Span {
    info_span!("lock", chain = %chain, account = %account, remote = %remote)
}

/// Span covering the destination side of a bridge transfer.
pub fn release_span(chain: ChainId) -> Span {
    info_span!("release", chain = %chain)
}

/// Span covering a single frame in flight through the relay.
pub fn relay_span(dest: ChainId, transfer_id: &TransferId) -> Span {
    info_span!("relay", dest = %dest, transfer_id = %transfer_id)
}
