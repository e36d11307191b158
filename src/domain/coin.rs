//! Coin and CoinSet: multi-asset integer balances with clamped arithmetic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::primitives::{Amount, Denom};

/// A single (asset, amount) pair. Amounts are always non-negative.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: Denom,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<Denom>, amount: Amount) -> Self {
        Coin {
            denom: denom.into(),
            amount,
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Normalized asset -> amount mapping.
///
/// Never holds zero-amount entries; iteration is always in denom order, so
/// any aggregation over a CoinSet is deterministic across replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSet(BTreeMap<Denom, Amount>);

impl CoinSet {
    pub fn new() -> Self {
        CoinSet(BTreeMap::new())
    }

    pub fn from_coins(coins: impl IntoIterator<Item = Coin>) -> Self {
        let mut set = CoinSet::new();
        for coin in coins {
            set.add_coin(coin);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Amount of `denom` in this set; zero if absent.
    pub fn amount_of(&self, denom: &Denom) -> Amount {
        self.0.get(denom).copied().unwrap_or(0)
    }

    pub fn contains(&self, denom: &Denom) -> bool {
        self.0.contains_key(denom)
    }

    /// Denoms present in the set, in sorted order.
    pub fn denoms(&self) -> impl Iterator<Item = &Denom> {
        self.0.keys()
    }

    /// Coins in the set, in denom order.
    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0.iter().map(|(denom, amount)| Coin {
            denom: denom.clone(),
            amount: *amount,
        })
    }

    /// Add a single coin. Zero amounts are dropped on normalization.
    pub fn add_coin(&mut self, coin: Coin) {
        if coin.amount == 0 {
            return;
        }
        *self.0.entry(coin.denom).or_insert(0) += coin.amount;
    }

    /// Per-asset sum of two sets.
    pub fn add(&self, other: &CoinSet) -> CoinSet {
        let mut result = self.clone();
        for coin in other.iter() {
            result.add_coin(coin);
        }
        result
    }

    /// Per-asset subtraction, clamped at zero.
    pub fn saturating_sub(&self, other: &CoinSet) -> CoinSet {
        let mut result = CoinSet::new();
        for (denom, amount) in &self.0 {
            let remaining = amount.saturating_sub(other.amount_of(denom));
            if remaining > 0 {
                result.0.insert(denom.clone(), remaining);
            }
        }
        result
    }

    /// Per-asset minimum. Assets absent from either set do not appear.
    pub fn min(&self, other: &CoinSet) -> CoinSet {
        let mut result = CoinSet::new();
        for (denom, amount) in &self.0 {
            let min = (*amount).min(other.amount_of(denom));
            if min > 0 {
                result.0.insert(denom.clone(), min);
            }
        }
        result
    }
}

impl FromIterator<Coin> for CoinSet {
    fn from_iter<I: IntoIterator<Item = Coin>>(iter: I) -> Self {
        CoinSet::from_coins(iter)
    }
}

impl std::fmt::Display for CoinSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(empty)");
        }
        let parts: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
