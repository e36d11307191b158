//! Named module-owned balances: reserve, fee collectors, staking tiers.
//!
//! These accounts are mutated only through the fee engine, the allocator,
//! and the distribution engine; users never touch them directly.

use serde::{Deserialize, Serialize};

use super::VaultStore;
use crate::domain::{Amount, Coin, CoinSet, Denom, LockupTier};
use crate::error::EngineError;

/// Module account names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AccountId {
    /// Vault reserve; also receives minted backstop coverage.
    Reserve,
    /// Management fee collector.
    MgmtFeeCollector,
    /// Performance fee collector.
    PerfFeeCollector,
    /// Per-lockup-tier staking pool holding deposits awaiting deployment.
    Staking(LockupTier),
    /// Permanently locked governance-asset sub-account. Never distributed.
    LockedGovernance,
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountId::Reserve => write!(f, "reserve"),
            AccountId::MgmtFeeCollector => write!(f, "mgmt_fee_collector"),
            AccountId::PerfFeeCollector => write!(f, "perf_fee_collector"),
            AccountId::Staking(tier) => write!(f, "staking_{}", tier),
            AccountId::LockedGovernance => write!(f, "locked_governance"),
        }
    }
}

impl VaultStore {
    /// Full balance of a module account.
    pub fn balance(&self, account: AccountId) -> CoinSet {
        self.balances.get(&account).cloned().unwrap_or_default()
    }

    /// Balance of a single denom in a module account.
    pub fn denom_balance(&self, account: AccountId, denom: &Denom) -> Amount {
        self.balances
            .get(&account)
            .map(|set| set.amount_of(denom))
            .unwrap_or(0)
    }

    /// Credit coins into a module account.
    pub fn credit(&mut self, account: AccountId, coins: &CoinSet) {
        if coins.is_empty() {
            return;
        }
        let balance = self.balances.entry(account).or_default();
        *balance = balance.add(coins);
    }

    /// Mint a single coin into a module account (supply creation).
    pub fn mint_into(&mut self, account: AccountId, coin: Coin) {
        self.credit(account, &CoinSet::from_coins([coin]));
    }

    /// Debit coins from a module account.
    ///
    /// # Errors
    /// `InsufficientFunds` if any denom balance is short; nothing is moved
    /// in that case.
    pub fn debit(&mut self, account: AccountId, coins: &CoinSet) -> Result<(), EngineError> {
        let balance = self.balance(account);
        for coin in coins.iter() {
            let available = balance.amount_of(&coin.denom);
            if available < coin.amount {
                return Err(EngineError::InsufficientFunds {
                    account: account.to_string(),
                    needed: coin.to_string(),
                    available: Coin::new(coin.denom.clone(), available).to_string(),
                });
            }
        }
        self.balances.insert(account, balance.saturating_sub(coins));
        Ok(())
    }

    /// Move coins between two module accounts.
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        coins: &CoinSet,
    ) -> Result<(), EngineError> {
        if coins.is_empty() {
            return Ok(());
        }
        self.debit(from, coins)?;
        self.credit(to, coins);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins(pairs: &[(&str, Amount)]) -> CoinSet {
        CoinSet::from_coins(pairs.iter().map(|(d, a)| Coin::new(*d, *a)))
    }

    #[test]
    fn test_credit_and_debit() {
        let mut store = VaultStore::new();
        store.credit(AccountId::Reserve, &coins(&[("abc", 100)]));
        assert_eq!(
            store.denom_balance(AccountId::Reserve, &Denom::new("abc")),
            100
        );
        store.debit(AccountId::Reserve, &coins(&[("abc", 40)])).unwrap();
        assert_eq!(
            store.denom_balance(AccountId::Reserve, &Denom::new("abc")),
            60
        );
    }

    #[test]
    fn test_debit_insufficient_leaves_balance_untouched() {
        let mut store = VaultStore::new();
        store.credit(AccountId::Reserve, &coins(&[("abc", 10), ("def", 50)]));
        let err = store
            .debit(AccountId::Reserve, &coins(&[("abc", 5), ("def", 60)]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        assert_eq!(store.balance(AccountId::Reserve), coins(&[("abc", 10), ("def", 50)]));
    }

    #[test]
    fn test_transfer_between_accounts() {
        let mut store = VaultStore::new();
        store.credit(AccountId::Staking(LockupTier::Days7), &coins(&[("abc", 30)]));
        store
            .transfer(
                AccountId::Staking(LockupTier::Days7),
                AccountId::Reserve,
                &coins(&[("abc", 30)]),
            )
            .unwrap();
        assert_eq!(store.balance(AccountId::Staking(LockupTier::Days7)), CoinSet::new());
        assert_eq!(store.balance(AccountId::Reserve), coins(&[("abc", 30)]));
    }

    #[test]
    fn test_account_display_names() {
        assert_eq!(AccountId::Reserve.to_string(), "reserve");
        assert_eq!(
            AccountId::Staking(LockupTier::Days21).to_string(),
            "staking_days_21"
        );
    }
}
