use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rebase_ledger::accrual;
use rebase_ledger::LedgerState;
use rebase_types::{AccountId, Amount, AmountSpec, Rate, Timestamp, TOKEN_UNIT};

fn populated_state(holders: usize) -> LedgerState {
    let mut state = LedgerState::default();
    for i in 0..holders {
        let id = AccountId::new(format!("rbt_holder_{i}"));
        state
            .mint(
                &id,
                Amount::tokens(1_000 + i as u128),
                Rate::DEFAULT_GLOBAL,
                Timestamp::new(i as u64),
            )
            .unwrap();
    }
    state
}

fn bench_effective_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("effective_balance");

    for elapsed in [1u64, 3_600, 86_400 * 365, 86_400 * 365 * 50] {
        group.bench_with_input(
            BenchmarkId::new("projection", elapsed),
            &elapsed,
            |b, &elapsed| {
                b.iter(|| {
                    black_box(accrual::effective_balance(
                        black_box(Amount::new(1_000_000 * TOKEN_UNIT)),
                        black_box(Rate::DEFAULT_GLOBAL),
                        black_box(elapsed),
                    ))
                });
            },
        );
    }

    group.finish();
}

fn bench_settle(c: &mut Criterion) {
    let alice = AccountId::new("rbt_alice");
    let mut state = populated_state(1);
    state
        .mint(&alice, Amount::tokens(100), Rate::DEFAULT_GLOBAL, Timestamp::new(0))
        .unwrap();

    let mut now = 0u64;
    c.bench_function("settle_one_second", |b| {
        b.iter(|| {
            now += 1;
            black_box(state.settle(black_box(&alice), Timestamp::new(now)).unwrap())
        });
    });
}

fn bench_transfer(c: &mut Criterion) {
    let alice = AccountId::new("rbt_alice");
    let bob = AccountId::new("rbt_bob");
    let mut state = LedgerState::default();
    state
        .mint(&alice, Amount::tokens(1_000_000), Rate::DEFAULT_GLOBAL, Timestamp::new(0))
        .unwrap();

    let mut now = 0u64;
    c.bench_function("transfer_settling_both", |b| {
        b.iter(|| {
            now += 1;
            black_box(
                state
                    .transfer(&alice, &bob, AmountSpec::from(1u128), Timestamp::new(now))
                    .unwrap(),
            )
        });
    });
}

fn bench_total_supply(c: &mut Criterion) {
    let mut group = c.benchmark_group("total_supply");

    for holders in [10usize, 100, 1_000, 10_000] {
        let state = populated_state(holders);
        let now = Timestamp::new(86_400);
        group.bench_with_input(BenchmarkId::new("holders", holders), &holders, |b, _| {
            b.iter(|| black_box(state.total_supply(black_box(now)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_effective_balance,
    bench_settle,
    bench_transfer,
    bench_total_supply,
);
criterion_main!(benches);
