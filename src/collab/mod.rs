//! Collaborator abstractions for the deposit ledger, price oracle, and AMM
//! transport the engine talks to.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{Amount, Coin, CoinSet, Decimal, Denom, EpochDay, LockupTier, PoolId, SeqNo, UserAccount};

pub mod mock;

pub use mock::{MockDepositLedger, MockPriceOracle, RecordingAmmGateway};

/// Signed snapshot of a liquidity pool, as priced by the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolInfo {
    pub id: PoolId,
    /// Pool reserves per asset.
    pub assets: CoinSet,
    /// Total outstanding pool shares.
    pub total_shares: Amount,
    /// Denom minted to joiners as their pool receipt.
    pub share_denom: Denom,
    /// Incentive APY the oracle currently attributes to the pool.
    pub expected_apy: Decimal,
}

/// Ledger of user commitments held outside this engine.
///
/// The engine reads deposit cohorts from it and writes settlement results
/// back as claimable and reward credits. All reads are stable for a given
/// epoch day once that day has closed.
pub trait DepositLedger: fmt::Debug {
    /// Total coins committed on an epoch day across all lockup tiers.
    fn total_epoch_deposits(&self, day: EpochDay) -> CoinSet;

    /// Total coins committed on an epoch day under one lockup tier.
    fn epoch_lockup_deposits(&self, day: EpochDay, tier: LockupTier) -> CoinSet;

    /// Per-user coins committed on an epoch day under one lockup tier.
    fn epoch_user_deposits(&self, day: EpochDay, tier: LockupTier)
        -> BTreeMap<UserAccount, CoinSet>;

    /// Per-user coins still locked (in any tier) as of an epoch day.
    fn active_user_deposits(&self, day: EpochDay) -> BTreeMap<UserAccount, CoinSet>;

    /// Credit settled principal to a user's withdrawable balance.
    fn credit_claimable(&mut self, user: &UserAccount, coins: &CoinSet);

    /// Credit distributed yield to a user's reward balance.
    fn credit_reward(&mut self, user: &UserAccount, coins: &CoinSet);
}

/// Price and pool metadata source.
pub trait PriceOracle: fmt::Debug {
    /// Units of `to` per one unit of `from`, or None when unquoted.
    fn relative_price(&self, from: &Denom, to: &Denom) -> Option<Decimal>;

    /// Current snapshot of a pool.
    fn pool_info(&self, pool: PoolId) -> Option<PoolInfo>;

    /// Pool ids ordered best-first by expected yield. Deployment iterates
    /// this order, so it fixes the allocation priority.
    fn pool_ranking(&self) -> Vec<PoolId>;
}

/// Fire-and-forget transport toward the AMM chain. Every request returns a
/// sequence number; results arrive later through the ack handlers.
pub trait AmmGateway: fmt::Debug {
    /// Ask to join a pool with `coins`, expecting at least `share_out`
    /// pool shares back.
    fn request_join_pool(&mut self, pool: PoolId, coins: &CoinSet, share_out: Amount) -> SeqNo;

    /// Ask to burn `share_in` pool shares, expecting at least
    /// `token_out_mins` back.
    fn request_exit_pool(&mut self, pool: PoolId, share_in: Amount, token_out_mins: &CoinSet)
        -> SeqNo;

    /// Ask to move a coin back from the remote chain.
    fn request_transfer(&mut self, coin: &Coin) -> SeqNo;
}
