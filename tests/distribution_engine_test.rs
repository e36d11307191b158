//! Principal and reward distribution over mock collaborators.

use epochvault::collab::{MockDepositLedger, MockPriceOracle};
use epochvault::engine::{distribute_principal, distribute_rewards, CreditOp};
use epochvault::{
    AccountId, Coin, CoinSet, Decimal, Denom, EpochDay, LockupTier, LpPosition, PoolId,
    UserAccount, VaultStore,
};

fn coins(pairs: &[(&str, u128)]) -> CoinSet {
    pairs
        .iter()
        .map(|(denom, amount)| Coin::new(*denom, *amount))
        .collect()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn claimable_of(ops: &[CreditOp], user: &str) -> CoinSet {
    let mut total = CoinSet::new();
    for op in ops {
        if let CreditOp::Claimable { user: u, coins } = op {
            if u == &UserAccount::from(user) {
                total = total.add(coins);
            }
        }
    }
    total
}

#[test]
fn test_principal_fully_funded_from_exit_ledger() {
    let mut store = VaultStore::new();
    let day = EpochDay(8);
    store.schedule_settlement(day, EpochDay(1), LockupTier::Days7);
    store.add_epoch_exit_amount(day, &Coin::new("uatom", 4000));
    store.add_epoch_exit_amount(day, &Coin::new("uosmo", 16000));

    let ledger = MockDepositLedger::new()
        .with_deposit(
            EpochDay(1),
            LockupTier::Days7,
            "alice",
            coins(&[("uatom", 3000), ("uosmo", 12000)]),
        )
        .with_deposit(
            EpochDay(1),
            LockupTier::Days7,
            "bob",
            coins(&[("uatom", 1000), ("uosmo", 4000)]),
        );
    let oracle = MockPriceOracle::new();

    let ops = distribute_principal(
        &mut store,
        &ledger,
        &oracle,
        day,
        dec("0.15"),
        &Denom::new("uvault"),
        &Denom::new("ugov"),
    )
    .unwrap();

    // alice holds 75% of both denoms: gross 3000/12000, 15% fee off the top.
    assert_eq!(
        claimable_of(&ops, "alice"),
        coins(&[("uatom", 2550), ("uosmo", 10200)])
    );
    assert_eq!(
        claimable_of(&ops, "bob"),
        coins(&[("uatom", 850), ("uosmo", 3400)])
    );
    assert_eq!(
        store.balance(AccountId::MgmtFeeCollector),
        coins(&[("uatom", 600), ("uosmo", 2400)])
    );

    // The exit ledger was consumed in full and nothing touched the reserve.
    assert_eq!(store.epoch_exit_amount(day, &Denom::new("uatom")), 0);
    assert_eq!(store.epoch_exit_amount(day, &Denom::new("uosmo")), 0);
    assert!(store.balance(AccountId::Reserve).is_empty());
}

#[test]
fn test_principal_deficit_covered_by_backstop_mint() {
    let mut store = VaultStore::new();
    let day = EpochDay(8);
    store.schedule_settlement(day, EpochDay(1), LockupTier::Days7);
    // Exit ledger covers half of the uatom owed; the rest is minted.
    store.add_epoch_exit_amount(day, &Coin::new("uatom", 500));

    let ledger = MockDepositLedger::new().with_deposit(
        EpochDay(1),
        LockupTier::Days7,
        "alice",
        coins(&[("uatom", 1000)]),
    );
    let oracle = MockPriceOracle::new()
        .with_price("uatom", "uvault", dec("2"))
        .with_price("uatom", "ugov", dec("0.5"));

    let ops = distribute_principal(
        &mut store,
        &ledger,
        &oracle,
        day,
        Decimal::zero(),
        &Denom::new("uvault"),
        &Denom::new("ugov"),
    )
    .unwrap();

    // Sole depositor gets the funded 500uatom plus 1000uvault minted
    // against the 500uatom deficit at price 2.
    assert_eq!(
        claimable_of(&ops, "alice"),
        coins(&[("uatom", 500), ("uvault", 1000)])
    );
    // Minted backstop passed through the reserve and out again.
    assert!(store.balance(AccountId::Reserve).is_empty());
    // Governance equivalent stays locked forever.
    assert_eq!(
        store.balance(AccountId::LockedGovernance),
        coins(&[("ugov", 250)])
    );
}

#[test]
fn test_principal_never_over_distributes() {
    let mut store = VaultStore::new();
    let day = EpochDay(8);
    store.schedule_settlement(day, EpochDay(1), LockupTier::Days7);
    store.add_epoch_exit_amount(day, &Coin::new("uatom", 1000));

    // Three depositors with amounts that do not divide evenly.
    let ledger = MockDepositLedger::new()
        .with_deposit(EpochDay(1), LockupTier::Days7, "a", coins(&[("uatom", 333)]))
        .with_deposit(EpochDay(1), LockupTier::Days7, "b", coins(&[("uatom", 333)]))
        .with_deposit(EpochDay(1), LockupTier::Days7, "c", coins(&[("uatom", 334)]));
    let oracle = MockPriceOracle::new();

    let ops = distribute_principal(
        &mut store,
        &ledger,
        &oracle,
        day,
        dec("0.15"),
        &Denom::new("uvault"),
        &Denom::new("ugov"),
    )
    .unwrap();

    let mut distributed = store
        .balance(AccountId::MgmtFeeCollector)
        .amount_of(&Denom::new("uatom"));
    for op in &ops {
        if let CreditOp::Claimable { coins, .. } = op {
            distributed += coins.amount_of(&Denom::new("uatom"));
        }
    }
    assert!(distributed <= 1000, "distributed {} of 1000", distributed);
}

#[test]
fn test_no_cohorts_settles_trivially() {
    let mut store = VaultStore::new();
    let ledger = MockDepositLedger::new();
    let oracle = MockPriceOracle::new();

    let ops = distribute_principal(
        &mut store,
        &ledger,
        &oracle,
        EpochDay(3),
        Decimal::zero(),
        &Denom::new("uvault"),
        &Denom::new("ugov"),
    )
    .unwrap();
    assert!(ops.is_empty());
    assert!(store.unsettled_backlog(EpochDay(10)).is_empty());
}

#[test]
fn test_rewards_split_by_priced_locked_value() {
    let mut store = VaultStore::new();
    // Locked since day 4: 300abc (value 300) and 100def (value 300 at price 3).
    store.create_position(LpPosition::new(
        1,
        EpochDay(4),
        7,
        EpochDay(11),
        14,
        PoolId(1),
        coins(&[("abc", 300)]),
    ));
    store.create_position(LpPosition::new(
        2,
        EpochDay(4),
        7,
        EpochDay(11),
        14,
        PoolId(2),
        coins(&[("def", 100)]),
    ));
    store.set_reward_collection(EpochDay(10), coins(&[("uosmo", 1000)]));

    let ledger = MockDepositLedger::new()
        .with_active_deposit(EpochDay(10), "alice", coins(&[("abc", 300)]))
        .with_active_deposit(EpochDay(10), "bob", coins(&[("def", 100)]));
    let oracle = MockPriceOracle::new()
        .with_price("abc", "uvault", dec("1"))
        .with_price("def", "uvault", dec("3"));

    let ops = distribute_rewards(
        &mut store,
        &ledger,
        &oracle,
        EpochDay(10),
        Decimal::zero(),
        &Denom::new("uvault"),
    )
    .unwrap();

    // Equal priced value, so each side of the book gets half the pot, and
    // each user owns their denom outright.
    assert_eq!(ops.len(), 2);
    for op in &ops {
        let CreditOp::Reward { coins: reward, .. } = op else {
            panic!("expected reward credit");
        };
        assert_eq!(reward.amount_of(&Denom::new("uosmo")), 500);
    }
    assert!(store.reward_collection(EpochDay(10)).is_none());
}

#[test]
fn test_reward_missing_price_fails_whole_distribution() {
    let mut store = VaultStore::new();
    store.create_position(LpPosition::new(
        1,
        EpochDay(4),
        7,
        EpochDay(11),
        14,
        PoolId(1),
        coins(&[("abc", 300)]),
    ));
    store.set_reward_collection(EpochDay(10), coins(&[("uosmo", 1000)]));

    let ledger = MockDepositLedger::new();
    let oracle = MockPriceOracle::new();

    let err = distribute_rewards(
        &mut store,
        &ledger,
        &oracle,
        EpochDay(10),
        Decimal::zero(),
        &Denom::new("uvault"),
    )
    .unwrap_err();
    assert!(matches!(err, epochvault::EngineError::NotFound(_)));
}
