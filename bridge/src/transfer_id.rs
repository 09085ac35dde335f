//! Transfer identifiers.
//!
//! `TransferId = Blake2b-256(source_chain || nonce || sender || 0x00 || recipient || 0x00 || amount || rate)`
//! with integers little-endian. The per-adapter nonce makes two otherwise
//! identical locks distinguishable.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use rebase_types::{AccountId, Amount, ChainId, Rate, TransferId};

type Blake2b256 = Blake2b<U32>;

pub fn derive_transfer_id(
    source_chain: ChainId,
    nonce: u64,
    sender: &AccountId,
    recipient: &AccountId,
    amount: Amount,
    rate: Rate,
) -> TransferId {
    let mut hasher = Blake2b256::new();
    hasher.update(source_chain.as_u32().to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    hasher.update(sender.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(recipient.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(amount.raw().to_le_bytes());
    hasher.update(rate.raw().to_le_bytes());
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    TransferId::new(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(nonce: u64) -> TransferId {
        derive_transfer_id(
            ChainId::new(1),
            nonce,
            &AccountId::new("rbt_alice"),
            &AccountId::new("rbt_bob"),
            Amount::new(100),
            Rate::DEFAULT_GLOBAL,
        )
    }

    #[test]
    fn deterministic() {
        assert_eq!(id(7), id(7));
        assert!(!id(7).is_zero());
    }

    #[test]
    fn nonce_distinguishes_identical_transfers() {
        assert_ne!(id(0), id(1));
    }

    #[test]
    fn account_boundaries_are_unambiguous() {
        let a = derive_transfer_id(
            ChainId::new(1),
            0,
            &AccountId::new("rbt_ab"),
            &AccountId::new("rbt_c"),
            Amount::new(1),
            Rate::ZERO,
        );
        let b = derive_transfer_id(
            ChainId::new(1),
            0,
            &AccountId::new("rbt_a"),
            &AccountId::new("rbt_bc"),
            Amount::new(1),
            Rate::ZERO,
        );
        assert_ne!(a, b);
    }
}
