//! Mock collaborators for tests and the demo binary.

use std::collections::BTreeMap;

use super::{AmmGateway, DepositLedger, PoolInfo, PriceOracle};
use crate::domain::{Amount, Coin, CoinSet, Decimal, Denom, EpochDay, LockupTier, PoolId, SeqNo, UserAccount};

/// Deposit ledger backed by in-memory maps, populated builder-style.
#[derive(Debug, Clone, Default)]
pub struct MockDepositLedger {
    deposits: BTreeMap<(EpochDay, LockupTier, UserAccount), CoinSet>,
    active: BTreeMap<(EpochDay, UserAccount), CoinSet>,
    /// Claimable principal credited back by the engine, per user.
    pub claimable: BTreeMap<UserAccount, CoinSet>,
    /// Rewards credited back by the engine, per user.
    pub rewards: BTreeMap<UserAccount, CoinSet>,
}

impl MockDepositLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user commitment for a (day, tier) cohort.
    pub fn with_deposit(
        mut self,
        day: EpochDay,
        tier: LockupTier,
        user: impl Into<UserAccount>,
        coins: CoinSet,
    ) -> Self {
        let key = (day, tier, user.into());
        let entry = self.deposits.entry(key).or_default();
        *entry = entry.add(&coins);
        self
    }

    /// Record a user's still-locked holdings as of a day.
    pub fn with_active_deposit(
        mut self,
        day: EpochDay,
        user: impl Into<UserAccount>,
        coins: CoinSet,
    ) -> Self {
        let key = (day, user.into());
        let entry = self.active.entry(key).or_default();
        *entry = entry.add(&coins);
        self
    }

    /// Total claimable principal credited to a user so far.
    pub fn claimable_of(&self, user: &UserAccount) -> CoinSet {
        self.claimable.get(user).cloned().unwrap_or_default()
    }

    /// Total rewards credited to a user so far.
    pub fn rewards_of(&self, user: &UserAccount) -> CoinSet {
        self.rewards.get(user).cloned().unwrap_or_default()
    }
}

impl DepositLedger for MockDepositLedger {
    fn total_epoch_deposits(&self, day: EpochDay) -> CoinSet {
        let mut total = CoinSet::new();
        for ((d, _, _), coins) in &self.deposits {
            if *d == day {
                total = total.add(coins);
            }
        }
        total
    }

    fn epoch_lockup_deposits(&self, day: EpochDay, tier: LockupTier) -> CoinSet {
        let mut total = CoinSet::new();
        for ((d, t, _), coins) in &self.deposits {
            if *d == day && *t == tier {
                total = total.add(coins);
            }
        }
        total
    }

    fn epoch_user_deposits(
        &self,
        day: EpochDay,
        tier: LockupTier,
    ) -> BTreeMap<UserAccount, CoinSet> {
        let mut out = BTreeMap::new();
        for ((d, t, user), coins) in &self.deposits {
            if *d == day && *t == tier {
                out.insert(user.clone(), coins.clone());
            }
        }
        out
    }

    fn active_user_deposits(&self, day: EpochDay) -> BTreeMap<UserAccount, CoinSet> {
        let mut out = BTreeMap::new();
        for ((d, user), coins) in &self.active {
            if *d == day {
                out.insert(user.clone(), coins.clone());
            }
        }
        out
    }

    fn credit_claimable(&mut self, user: &UserAccount, coins: &CoinSet) {
        let entry = self.claimable.entry(user.clone()).or_default();
        *entry = entry.add(coins);
    }

    fn credit_reward(&mut self, user: &UserAccount, coins: &CoinSet) {
        let entry = self.rewards.entry(user.clone()).or_default();
        *entry = entry.add(coins);
    }
}

/// Price oracle returning fixed quotes and pool snapshots.
#[derive(Debug, Clone, Default)]
pub struct MockPriceOracle {
    prices: BTreeMap<(Denom, Denom), Decimal>,
    pools: BTreeMap<PoolId, PoolInfo>,
    ranking: Vec<PoolId>,
}

impl MockPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote `price` units of `to` per one unit of `from`. Also records
    /// the identity quote for each denom.
    pub fn with_price(
        mut self,
        from: impl Into<Denom>,
        to: impl Into<Denom>,
        price: Decimal,
    ) -> Self {
        let (from, to) = (from.into(), to.into());
        self.prices.insert((from.clone(), from.clone()), Decimal::one());
        self.prices.insert((to.clone(), to.clone()), Decimal::one());
        self.prices.insert((from, to), price);
        self
    }

    /// Register a pool snapshot. Ranking order is registration order.
    pub fn with_pool(mut self, pool: PoolInfo) -> Self {
        self.ranking.push(pool.id);
        self.pools.insert(pool.id, pool);
        self
    }
}

impl PriceOracle for MockPriceOracle {
    fn relative_price(&self, from: &Denom, to: &Denom) -> Option<Decimal> {
        self.prices.get(&(from.clone(), to.clone())).copied()
    }

    fn pool_info(&self, pool: PoolId) -> Option<PoolInfo> {
        self.pools.get(&pool).cloned()
    }

    fn pool_ranking(&self) -> Vec<PoolId> {
        self.ranking.clone()
    }
}

/// One request captured by [`RecordingAmmGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum AmmRequest {
    Join {
        seq: SeqNo,
        pool: PoolId,
        coins: CoinSet,
        share_out: Amount,
    },
    Exit {
        seq: SeqNo,
        pool: PoolId,
        share_in: Amount,
        token_out_mins: CoinSet,
    },
    Transfer {
        seq: SeqNo,
        coin: Coin,
    },
}

/// Gateway that records every request and hands out sequential seq numbers,
/// so tests can replay acks against exactly what was sent.
#[derive(Debug, Clone, Default)]
pub struct RecordingAmmGateway {
    next_seq: u64,
    pub requests: Vec<AmmRequest>,
}

impl RecordingAmmGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> SeqNo {
        self.next_seq += 1;
        SeqNo(self.next_seq)
    }

    /// Join requests sent so far, in send order.
    pub fn joins(&self) -> Vec<&AmmRequest> {
        self.requests
            .iter()
            .filter(|r| matches!(r, AmmRequest::Join { .. }))
            .collect()
    }

    /// Exit requests sent so far, in send order.
    pub fn exits(&self) -> Vec<&AmmRequest> {
        self.requests
            .iter()
            .filter(|r| matches!(r, AmmRequest::Exit { .. }))
            .collect()
    }
}

impl AmmGateway for RecordingAmmGateway {
    fn request_join_pool(&mut self, pool: PoolId, coins: &CoinSet, share_out: Amount) -> SeqNo {
        let seq = self.next();
        self.requests.push(AmmRequest::Join {
            seq,
            pool,
            coins: coins.clone(),
            share_out,
        });
        seq
    }

    fn request_exit_pool(
        &mut self,
        pool: PoolId,
        share_in: Amount,
        token_out_mins: &CoinSet,
    ) -> SeqNo {
        let seq = self.next();
        self.requests.push(AmmRequest::Exit {
            seq,
            pool,
            share_in,
            token_out_mins: token_out_mins.clone(),
        });
        seq
    }

    fn request_transfer(&mut self, coin: &Coin) -> SeqNo {
        let seq = self.next();
        self.requests.push(AmmRequest::Transfer {
            seq,
            coin: coin.clone(),
        });
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coin;

    #[test]
    fn test_deposit_aggregation_across_tiers() {
        let ledger = MockDepositLedger::new()
            .with_deposit(
                EpochDay(1),
                LockupTier::Days7,
                "alice",
                CoinSet::from_coins([Coin::new("uatom", 100)]),
            )
            .with_deposit(
                EpochDay(1),
                LockupTier::Days21,
                "bob",
                CoinSet::from_coins([Coin::new("uatom", 50)]),
            );

        let total = ledger.total_epoch_deposits(EpochDay(1));
        assert_eq!(total.amount_of(&"uatom".into()), 150);

        let tier7 = ledger.epoch_lockup_deposits(EpochDay(1), LockupTier::Days7);
        assert_eq!(tier7.amount_of(&"uatom".into()), 100);

        let users = ledger.epoch_user_deposits(EpochDay(1), LockupTier::Days21);
        assert_eq!(users.len(), 1);
        assert!(users.contains_key(&UserAccount::from("bob")));
    }

    #[test]
    fn test_gateway_seq_numbers_monotonic() {
        let mut gateway = RecordingAmmGateway::new();
        let a = gateway.request_transfer(&Coin::new("uatom", 1));
        let b = gateway.request_transfer(&Coin::new("uatom", 2));
        assert_eq!(a, SeqNo(1));
        assert_eq!(b, SeqNo(2));
        assert_eq!(gateway.requests.len(), 2);
    }
}
