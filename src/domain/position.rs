//! LP position records and per-epoch statistics.

use serde::{Deserialize, Serialize};

use super::coin::{Coin, CoinSet};
use super::decimal::Decimal;
use super::primitives::{EpochDay, PoolId, PositionId};

/// A recorded deployment of pooled capital into an external liquidity pool.
///
/// Immutable once created, except for the receipt/APY annotation that
/// arrives asynchronously with the join acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpPosition {
    /// Global monotonic id, assigned by the ledger at creation. Zero until then.
    pub id: PositionId,
    /// Identifier of the deposit commitment this position was funded from.
    pub source_commitment_id: u64,
    pub bonding_start_day: EpochDay,
    pub bond_duration: u64,
    pub unbonding_start_day: EpochDay,
    pub unbonding_duration: u64,
    pub pool_id: PoolId,
    /// Pool-share-equivalent receipt, annotated on join acknowledgement.
    pub receipt_amount: Option<Coin>,
    /// Expected APY of the active gauge, annotated alongside the receipt.
    pub expected_apy: Option<Decimal>,
    pub deposited_coins: CoinSet,
}

impl LpPosition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_commitment_id: u64,
        bonding_start_day: EpochDay,
        bond_duration: u64,
        unbonding_start_day: EpochDay,
        unbonding_duration: u64,
        pool_id: PoolId,
        deposited_coins: CoinSet,
    ) -> Self {
        LpPosition {
            id: PositionId(0),
            source_commitment_id,
            bonding_start_day,
            bond_duration,
            unbonding_start_day,
            unbonding_duration,
            pool_id,
            receipt_amount: None,
            expected_apy: None,
            deposited_coins,
        }
    }

    /// Last epoch day of the active window (inclusive).
    pub fn end_day(&self) -> EpochDay {
        self.bonding_start_day
            .plus(self.bond_duration + self.unbonding_duration)
    }

    /// A position is active for epochDay in [start, start + bond + unbond].
    pub fn is_active(&self, day: EpochDay) -> bool {
        self.bonding_start_day <= day && day <= self.end_day()
    }
}

/// Per-epoch position statistics. Incremented on position creation and
/// reversed if the backing join is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochStats {
    pub position_count: u64,
    pub total_deposited_coins: CoinSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(start: u64, bond: u64, unbond: u64) -> LpPosition {
        LpPosition::new(
            0,
            EpochDay(start),
            bond,
            EpochDay(start + bond),
            unbond,
            PoolId(1),
            CoinSet::from_coins([Coin::new("uatom", 100)]),
        )
    }

    #[test]
    fn test_active_window_is_inclusive() {
        let lp = position(10, 1, 7);
        assert!(!lp.is_active(EpochDay(9)));
        assert!(lp.is_active(EpochDay(10)));
        assert!(lp.is_active(EpochDay(18)));
        assert!(!lp.is_active(EpochDay(19)));
    }

    #[test]
    fn test_end_day() {
        assert_eq!(position(5, 7, 14).end_day(), EpochDay(26));
    }
}
