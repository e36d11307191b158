//! LP position ledger: creation, lookup, activity windows, day mappings.

use super::VaultStore;
use crate::domain::{
    Coin, CoinSet, Decimal, Denom, EpochDay, EpochStats, LockupTier, LpPosition, PositionId,
};
use crate::error::EngineError;

impl VaultStore {
    /// Persist a new LP position, assigning the next global id.
    ///
    /// Updates the per-epoch statistics and the denom index additively, and
    /// records the reverse (id -> epoch day) index used for id-only lookup.
    pub fn create_position(&mut self, mut position: LpPosition) -> PositionId {
        self.position_count += 1;
        position.id = PositionId(self.position_count);
        let day = position.bonding_start_day;

        let stats = self.epoch_stats.entry(day).or_default();
        stats.position_count += 1;
        stats.total_deposited_coins = stats.total_deposited_coins.add(&position.deposited_coins);

        for denom in position.deposited_coins.denoms() {
            self.epoch_denoms.insert((day, denom.clone()));
        }

        let id = position.id;
        self.position_days.insert(id, day);
        self.positions.insert((day, id), position);
        id
    }

    /// Fetch a position by its owning epoch day and id.
    pub fn position(&self, day: EpochDay, id: PositionId) -> Option<&LpPosition> {
        self.positions.get(&(day, id))
    }

    /// Fetch a position by id alone, resolving the owning epoch day through
    /// the reverse index first.
    pub fn position_by_id(&self, id: PositionId) -> Option<&LpPosition> {
        let day = self.position_days.get(&id)?;
        self.positions.get(&(*day, id))
    }

    /// The epoch day a position was created on.
    pub fn position_day(&self, id: PositionId) -> Option<EpochDay> {
        self.position_days.get(&id).copied()
    }

    /// Remove a position record (join-nack error path only), reversing its
    /// contribution to the epoch statistics.
    pub fn remove_position(&mut self, id: PositionId) -> Option<LpPosition> {
        let day = self.position_days.remove(&id)?;
        let position = self.positions.remove(&(day, id))?;
        if let Some(stats) = self.epoch_stats.get_mut(&day) {
            stats.position_count = stats.position_count.saturating_sub(1);
            stats.total_deposited_coins = stats
                .total_deposited_coins
                .saturating_sub(&position.deposited_coins);
        }
        Some(position)
    }

    /// Annotate a position with the receipt and gauge APY from its join ack.
    pub fn annotate_receipt(
        &mut self,
        id: PositionId,
        receipt: Coin,
        expected_apy: Option<Decimal>,
    ) -> Result<(), EngineError> {
        let day = self
            .position_days
            .get(&id)
            .copied()
            .ok_or_else(|| EngineError::NotFound(format!("position {}", id)))?;
        let position = self
            .positions
            .get_mut(&(day, id))
            .ok_or_else(|| EngineError::NotFound(format!("position {}", id)))?;
        position.receipt_amount = Some(receipt);
        if expected_apy.is_some() {
            position.expected_apy = expected_apy;
        }
        Ok(())
    }

    /// Ids of positions whose active window contains `day`, in id order.
    pub fn active_position_ids(&self, day: EpochDay) -> Vec<PositionId> {
        let mut ids: Vec<PositionId> = self
            .positions
            .values()
            .filter(|lp| lp.is_active(day))
            .map(|lp| lp.id)
            .collect();
        ids.sort();
        ids
    }

    /// Every (positionId, epochDay) pair in the ledger.
    pub fn all_position_epoch_pairs(&self) -> Vec<(PositionId, EpochDay)> {
        self.position_days.iter().map(|(id, day)| (*id, *day)).collect()
    }

    /// Denoms deposited into positions created on `day`, in sorted order.
    pub fn epoch_denoms(&self, day: EpochDay) -> Vec<Denom> {
        self.epoch_denoms
            .range((day, Denom::new(""))..)
            .take_while(|(d, _)| *d == day)
            .map(|(_, denom)| denom.clone())
            .collect()
    }

    /// Statistics for positions created on `day`.
    pub fn epoch_stats(&self, day: EpochDay) -> EpochStats {
        self.epoch_stats.get(&day).cloned().unwrap_or_default()
    }

    /// Total principal locked in positions active on `day`, summed in
    /// position-id order.
    pub fn total_locked_coins(&self, day: EpochDay) -> CoinSet {
        let mut total = CoinSet::new();
        for id in self.active_position_ids(day) {
            if let Some(lp) = self.position_by_id(id) {
                total = total.add(&lp.deposited_coins);
            }
        }
        total
    }

    /// Record that the cohort deposited on `deposit_day` under `tier` is due
    /// to settle on `target_day`.
    pub fn schedule_settlement(
        &mut self,
        target_day: EpochDay,
        deposit_day: EpochDay,
        tier: LockupTier,
    ) {
        self.day_mappings.insert((target_day, deposit_day, tier));
    }

    /// Cohorts scheduled to settle on `target_day`, in (depositDay, tier) order.
    pub fn settlement_cohorts(&self, target_day: EpochDay) -> Vec<(EpochDay, LockupTier)> {
        self.day_mappings
            .range((target_day, EpochDay(0), LockupTier::Days7)..)
            .take_while(|(t, _, _)| *t == target_day)
            .map(|(_, deposit, tier)| (*deposit, *tier))
            .collect()
    }

    /// Mark a target day as settled.
    pub fn mark_settled(&mut self, day: EpochDay) {
        self.settled_days.insert(day);
    }

    /// Target days before `day` that have scheduled cohorts but never
    /// settled. A persistent backlog here means settlement keeps aborting.
    pub fn unsettled_backlog(&self, day: EpochDay) -> Vec<EpochDay> {
        let mut backlog: Vec<EpochDay> = self
            .day_mappings
            .iter()
            .map(|(target, _, _)| *target)
            .filter(|target| *target < day && !self.settled_days.contains(target))
            .collect();
        backlog.dedup();
        backlog
    }
}
