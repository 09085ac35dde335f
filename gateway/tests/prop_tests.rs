use std::sync::Arc;

use proptest::prelude::*;

use rebase_gateway::{CustodyGateway, GatewayError, InMemoryReserve};
use rebase_ledger::AccrualLedger;
use rebase_types::{AccountId, Amount, AmountSpec, LedgerParams, SystemClock, Timestamp};

fn setup(funds: u128) -> (CustodyGateway, Arc<InMemoryReserve>, AccountId) {
    let (ledger, owner) = AccrualLedger::new(LedgerParams::default(), Arc::new(SystemClock));
    let operator = ledger.grant_operator(&owner, "gateway").unwrap();
    let reserve = Arc::new(InMemoryReserve::new());
    let alice = AccountId::new("rbt_alice");
    reserve.fund(&alice, Amount::new(funds));
    let gateway = CustodyGateway::new(Arc::new(ledger), operator, reserve.clone()).unwrap();
    (gateway, reserve, alice)
}

proptest! {
    /// Depositing then redeeming the same amount at the same instant leaves
    /// the account empty and the reserve where it started.
    #[test]
    fn deposit_redeem_same_instant_is_neutral(
        amount in 1u128..1_000_000_000_000,
        at in 0u64..1_000_000_000,
    ) {
        let (gateway, reserve, alice) = setup(amount);
        let now = Timestamp::new(at);
        gateway.deposit_at(&alice, Amount::new(amount), now).unwrap();
        let released = gateway.redeem_at(&alice, AmountSpec::from(amount), now).unwrap();
        prop_assert_eq!(released, Amount::new(amount));
        prop_assert_eq!(gateway.ledger().balance_at(&alice, now).unwrap(), Amount::ZERO);
        prop_assert_eq!(reserve.wallet_balance(&alice), Amount::new(amount));
        prop_assert_eq!(gateway.custody_balance(), Amount::ZERO);
    }

    /// Redeeming more than the effective balance fails with nothing changed.
    #[test]
    fn over_redeem_changes_nothing(
        amount in 1u128..1_000_000_000,
        excess in 1u128..1_000,
        wait in 0u64..100_000,
    ) {
        let (gateway, _reserve, alice) = setup(amount);
        gateway.deposit_at(&alice, Amount::new(amount), Timestamp::new(0)).unwrap();
        let now = Timestamp::new(wait);
        let balance = gateway.ledger().balance_at(&alice, now).unwrap();
        let before = gateway.ledger().account(&alice).unwrap();

        let result = gateway.redeem_at(&alice, AmountSpec::from(balance.raw() + excess), now);
        let is_insufficient = matches!(result, Err(GatewayError::InsufficientBalance { .. }));
        prop_assert!(is_insufficient);
        prop_assert_eq!(gateway.ledger().account(&alice).unwrap(), before);
        prop_assert_eq!(gateway.custody_balance(), Amount::new(amount));
    }

    /// Custody always equals deposits minus redemptions when no time passes.
    #[test]
    fn custody_tracks_net_flow(
        deposits in prop::collection::vec(1u128..1_000_000, 1..10),
        redeem_pct in 0u128..=100,
    ) {
        let total: u128 = deposits.iter().sum();
        let (gateway, _reserve, alice) = setup(total);
        let now = Timestamp::new(0);
        for d in &deposits {
            gateway.deposit_at(&alice, Amount::new(*d), now).unwrap();
        }
        let redeem = total * redeem_pct / 100;
        if redeem > 0 {
            gateway.redeem_at(&alice, AmountSpec::from(redeem), now).unwrap();
        }
        prop_assert_eq!(gateway.custody_balance().raw(), total - redeem);
        prop_assert_eq!(gateway.ledger().balance_at(&alice, now).unwrap().raw(), total - redeem);
    }
}
