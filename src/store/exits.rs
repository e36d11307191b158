//! Exit ledger, reward collections, deployment records, and in-flight
//! transport correlation state.

use serde::{Deserialize, Serialize};

use super::VaultStore;
use crate::domain::{Amount, Coin, CoinSet, Denom, EpochDay, LockupTier, PoolId, PositionId, SeqNo};

/// Correlation record for an outstanding pool-join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingJoin {
    pub position_id: PositionId,
    pub tier: LockupTier,
    pub coins: CoinSet,
}

/// Correlation record for an outstanding pool-exit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingExit {
    pub day: EpochDay,
    pub pool_id: PoolId,
    pub tier: LockupTier,
}

impl VaultStore {
    /// Add funds returned from a pool exit to the day's exit ledger.
    pub fn add_epoch_exit_amount(&mut self, day: EpochDay, coin: &Coin) {
        if coin.amount == 0 {
            return;
        }
        *self
            .exit_ledger
            .entry((day, coin.denom.clone()))
            .or_insert(0) += coin.amount;
    }

    /// Consume funds from the day's exit ledger. Saturates at zero.
    pub fn sub_epoch_exit_amount(&mut self, day: EpochDay, coin: &Coin) {
        let key = (day, coin.denom.clone());
        if let Some(available) = self.exit_ledger.get_mut(&key) {
            *available = available.saturating_sub(coin.amount);
            if *available == 0 {
                self.exit_ledger.remove(&key);
            }
        }
    }

    /// Amount of one asset sitting in the day's exit ledger.
    pub fn epoch_exit_amount(&self, day: EpochDay, denom: &Denom) -> Amount {
        self.exit_ledger
            .get(&(day, denom.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Exit-ledger availability for each denom in `needed`, in denom order.
    pub fn epoch_exit_coins(&self, day: EpochDay, needed: &CoinSet) -> CoinSet {
        needed
            .denoms()
            .map(|denom| Coin::new(denom.clone(), self.epoch_exit_amount(day, denom)))
            .collect()
    }

    /// Record the yield gathered for an epoch day.
    pub fn set_reward_collection(&mut self, day: EpochDay, rewards: CoinSet) {
        self.reward_collections.insert(day, rewards);
    }

    pub fn reward_collection(&self, day: EpochDay) -> Option<&CoinSet> {
        self.reward_collections.get(&day)
    }

    /// Take a day's reward collection out of the store once distributed.
    pub fn remove_reward_collection(&mut self, day: EpochDay) -> Option<CoinSet> {
        self.reward_collections.remove(&day)
    }

    /// Record coins deployed to a pool on a day under a tier, accumulating
    /// across multiple joins.
    pub fn record_deployment(
        &mut self,
        day: EpochDay,
        tier: LockupTier,
        pool_id: PoolId,
        coins: &CoinSet,
    ) {
        let entry = self.deployments.entry((day, tier, pool_id)).or_default();
        *entry = entry.add(coins);
    }

    /// Reverse part of a deployment record (join-nack path).
    pub fn reduce_deployment(
        &mut self,
        day: EpochDay,
        tier: LockupTier,
        pool_id: PoolId,
        coins: &CoinSet,
    ) {
        let key = (day, tier, pool_id);
        if let Some(entry) = self.deployments.get_mut(&key) {
            *entry = entry.saturating_sub(coins);
            if entry.is_empty() {
                self.deployments.remove(&key);
            }
        }
    }

    pub fn deployment(&self, day: EpochDay, tier: LockupTier, pool_id: PoolId) -> Option<&CoinSet> {
        self.deployments.get(&(day, tier, pool_id))
    }

    /// Pools a cohort's funds were deployed to, in pool-id order.
    pub fn deployed_pools(&self, day: EpochDay, tier: LockupTier) -> Vec<PoolId> {
        self.deployments
            .range((day, tier, PoolId(0))..)
            .take_while(|((d, t, _), _)| *d == day && *t == tier)
            .map(|((_, _, pool), _)| *pool)
            .collect()
    }

    pub fn set_pending_join(&mut self, seq: SeqNo, pending: PendingJoin) {
        self.pending_joins.insert(seq, pending);
    }

    pub fn take_pending_join(&mut self, seq: SeqNo) -> Option<PendingJoin> {
        self.pending_joins.remove(&seq)
    }

    pub fn set_pending_exit(&mut self, seq: SeqNo, pending: PendingExit) {
        self.pending_exits.insert(seq, pending);
    }

    pub fn take_pending_exit(&mut self, seq: SeqNo) -> Option<PendingExit> {
        self.pending_exits.remove(&seq)
    }

    pub fn set_pending_transfer(&mut self, seq: SeqNo, coin: Coin) {
        self.pending_transfers.insert(seq, coin);
    }

    pub fn take_pending_transfer(&mut self, seq: SeqNo) -> Option<Coin> {
        self.pending_transfers.remove(&seq)
    }
}
