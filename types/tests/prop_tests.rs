use proptest::prelude::*;

use rebase_types::{AccountId, Amount, AmountSpec, TokenAddress, TransferId};

proptest! {
    /// TransferId exposes exactly the bytes it was built from.
    #[test]
    fn transfer_id_bytes_preserved(bytes in prop::array::uniform32(0u8..)) {
        let id = TransferId::new(bytes);
        prop_assert_eq!(id.as_bytes(), &bytes);
        prop_assert_eq!(id.is_zero(), bytes == [0u8; 32]);
    }

    /// A token address printed with Display parses back to itself.
    #[test]
    fn token_address_display_parses_back(bytes in prop::array::uniform32(0u8..)) {
        let address = TokenAddress::new(bytes);
        let parsed = TokenAddress::from_hex(&address.to_string()).unwrap();
        prop_assert_eq!(parsed, address);
    }

    /// Every prefixed alphanumeric identifier is accepted.
    #[test]
    fn account_ids_with_prefix_parse(body in "[a-z0-9_]{1,40}") {
        let raw = format!("rbt_{body}");
        let id = AccountId::parse(raw.clone()).unwrap();
        prop_assert_eq!(id.as_str(), raw.as_str());
    }

    /// Identifiers without the prefix are always rejected.
    #[test]
    fn account_ids_without_prefix_rejected(body in "[a-z]{1,3}[a-z0-9]{0,20}") {
        prop_assume!(!body.starts_with("rbt_"));
        prop_assert!(AccountId::parse(body).is_err());
    }

    /// Checked arithmetic agrees with u128 arithmetic.
    #[test]
    fn amount_checked_ops_match_raw(a in any::<u128>(), b in any::<u128>()) {
        prop_assert_eq!(
            Amount::new(a).checked_add(Amount::new(b)).map(|x| x.raw()),
            a.checked_add(b)
        );
        prop_assert_eq!(
            Amount::new(a).checked_sub(Amount::new(b)).map(|x| x.raw()),
            a.checked_sub(b)
        );
    }

    /// An exact amount ignores the settled balance; `All` returns it.
    #[test]
    fn amount_spec_resolution(exact in any::<u128>(), settled in any::<u128>()) {
        prop_assert_eq!(AmountSpec::from(exact).resolve(Amount::new(settled)).raw(), exact);
        prop_assert_eq!(AmountSpec::All.resolve(Amount::new(settled)).raw(), settled);
    }

    /// Amounts survive a bincode round trip, the format snapshots use.
    #[test]
    fn amount_bincode_roundtrip(raw in any::<u128>()) {
        let encoded = bincode::serialize(&Amount::new(raw)).unwrap();
        let decoded: Amount = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.raw(), raw);
    }
}
