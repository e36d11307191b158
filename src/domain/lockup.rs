//! Lockup tiers and their bonding/unbonding schedules.

use serde::{Deserialize, Serialize};

/// Depositor-selected commitment duration. External input to the engine;
/// each tier maps to a fixed bonding/unbonding gauge schedule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum LockupTier {
    Days7,
    Days14,
    Days21,
}

impl LockupTier {
    /// All tiers in a fixed total order, for deterministic iteration.
    pub const ALL: [LockupTier; 3] = [LockupTier::Days7, LockupTier::Days14, LockupTier::Days21];

    /// Lockup length in epoch days.
    pub fn days(&self) -> u64 {
        match self {
            LockupTier::Days7 => 7,
            LockupTier::Days14 => 14,
            LockupTier::Days21 => 21,
        }
    }

    /// Bonding and unbonding durations for positions created under this tier.
    ///
    /// The split is chosen so bonding + unbonding fills the lockup window:
    /// a 7 day lockup bonds 1 day into a 7 day unbonding gauge, 14 days
    /// bonds 7 into 7, 21 days bonds 7 into a 14 day gauge.
    pub fn bonding_unbonding(&self) -> (u64, u64) {
        match self {
            LockupTier::Days7 => (1, 7),
            LockupTier::Days14 => (7, 7),
            LockupTier::Days21 => (7, 14),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LockupTier::Days7 => "days_7",
            LockupTier::Days14 => "days_14",
            LockupTier::Days21 => "days_21",
        }
    }
}

impl std::fmt::Display for LockupTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_is_fixed() {
        let days: Vec<u64> = LockupTier::ALL.iter().map(|t| t.days()).collect();
        assert_eq!(days, vec![7, 14, 21]);
    }

    #[test]
    fn test_bonding_unbonding_schedule() {
        assert_eq!(LockupTier::Days7.bonding_unbonding(), (1, 7));
        assert_eq!(LockupTier::Days14.bonding_unbonding(), (7, 7));
        assert_eq!(LockupTier::Days21.bonding_unbonding(), (7, 14));
    }
}
