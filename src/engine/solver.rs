//! Funding-source solver: splits a needed coin set across the epoch exit
//! ledger, the reserve, and a residual deficit.

use crate::domain::{Coin, CoinSet};

/// Result of [`allocate`]: per-asset split of the needed amount across the
/// three funding sources. `from_exit + from_reserve + deficit == needed`
/// holds per asset by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Drawn from funds already returned by pool exits this day.
    pub from_exit: CoinSet,
    /// Drawn from the reserve account.
    pub from_reserve: CoinSet,
    /// Still missing after both sources; covered by backstop minting.
    pub deficit: CoinSet,
    /// Exit-ledger funds beyond what was needed; left in the ledger.
    pub excess_exit: CoinSet,
}

impl Allocation {
    /// Coins actually available without minting.
    pub fn funded(&self) -> CoinSet {
        self.from_exit.add(&self.from_reserve)
    }

    pub fn has_deficit(&self) -> bool {
        !self.deficit.is_empty()
    }
}

/// Decide, per asset of `needed`, how much to take from the day's exit
/// ledger, how much from the reserve, and how much remains uncovered.
///
/// Each source is drawn greedily in that order and clamped at what it
/// holds; sources with missing denoms contribute zero.
pub fn allocate(needed: &CoinSet, epoch_exit: &CoinSet, reserve: &CoinSet) -> Allocation {
    let mut out = Allocation::default();
    for coin in needed.iter() {
        let from_exit = coin.amount.min(epoch_exit.amount_of(&coin.denom));
        let after_exit = coin.amount - from_exit;
        let from_reserve = after_exit.min(reserve.amount_of(&coin.denom));
        let deficit = after_exit - from_reserve;

        out.from_exit.add_coin(Coin::new(coin.denom.clone(), from_exit));
        out.from_reserve
            .add_coin(Coin::new(coin.denom.clone(), from_reserve));
        out.deficit.add_coin(Coin::new(coin.denom.clone(), deficit));
    }
    out.excess_exit = epoch_exit.saturating_sub(&out.from_exit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins<const N: usize>(pairs: [(&str, u128); N]) -> CoinSet {
        pairs
            .into_iter()
            .map(|(denom, amount)| Coin::new(denom, amount))
            .collect()
    }

    #[test]
    fn test_fully_covered_by_exit_ledger() {
        let alloc = allocate(
            &coins([("uatom", 100)]),
            &coins([("uatom", 250)]),
            &coins([("uatom", 50)]),
        );
        assert_eq!(alloc.from_exit, coins([("uatom", 100)]));
        assert!(alloc.from_reserve.is_empty());
        assert!(!alloc.has_deficit());
    }

    #[test]
    fn test_cascades_into_reserve_then_deficit() {
        let alloc = allocate(
            &coins([("uatom", 100)]),
            &coins([("uatom", 30)]),
            &coins([("uatom", 40)]),
        );
        assert_eq!(alloc.from_exit, coins([("uatom", 30)]));
        assert_eq!(alloc.from_reserve, coins([("uatom", 40)]));
        assert_eq!(alloc.deficit, coins([("uatom", 30)]));
    }

    #[test]
    fn test_mixed_assets_example() {
        let needed = coins([("abc1", 100), ("abc2", 200), ("abc3", 300), ("abc4", 80)]);
        let epoch_exit = coins([("abc1", 150), ("abc2", 120), ("abc3", 160), ("xyz1", 40)]);
        let reserve = coins([("abc1", 10), ("abc2", 90), ("abc3", 110), ("xyz2", 70)]);

        let alloc = allocate(&needed, &epoch_exit, &reserve);
        assert_eq!(
            alloc.from_exit,
            coins([("abc1", 100), ("abc2", 120), ("abc3", 160)])
        );
        assert_eq!(alloc.from_reserve, coins([("abc2", 80), ("abc3", 110)]));
        assert_eq!(alloc.excess_exit, coins([("abc1", 50), ("xyz1", 40)]));
        assert_eq!(alloc.deficit, coins([("abc3", 30), ("abc4", 80)]));
    }

    #[test]
    fn test_excess_exit_reported() {
        let alloc = allocate(
            &coins([("abc1", 100), ("abc2", 200), ("abc3", 300)]),
            &coins([("abc1", 150), ("abc2", 220), ("abc3", 360)]),
            &CoinSet::new(),
        );
        assert_eq!(
            alloc.excess_exit,
            coins([("abc1", 50), ("abc2", 20), ("abc3", 60)])
        );
        assert!(!alloc.has_deficit());
    }

    #[test]
    fn test_conservation_per_asset() {
        let needed = coins([("a", 17), ("b", 9999), ("c", 1)]);
        let alloc = allocate(&needed, &coins([("a", 5), ("c", 100)]), &coins([("b", 3)]));
        let recombined = alloc.from_exit.add(&alloc.from_reserve).add(&alloc.deficit);
        assert_eq!(recombined, needed);
    }

    #[test]
    fn test_empty_sources_all_deficit() {
        let needed = coins([("uatom", 42)]);
        let alloc = allocate(&needed, &CoinSet::new(), &CoinSet::new());
        assert_eq!(alloc.deficit, needed);
        assert!(alloc.funded().is_empty());
    }
}
