//! Pool-join sizing and the per-tier capital deployment / exit loops.

use tracing::{debug, info, warn};

use crate::collab::{AmmGateway, PriceOracle};
use crate::domain::{Amount, CoinSet, EpochDay, LockupTier, LpPosition, PositionId, SeqNo};
use crate::error::EngineError;
use crate::store::{AccountId, PendingExit, PendingJoin, VaultStore};

/// Largest whole number of pool shares purchasable with `available`,
/// keeping the pool's asset ratio.
///
/// For each pool asset the candidate is
/// `floor(total_shares * available / asset_amount)`; the result is the
/// minimum over all assets, so no asset is overdrawn. An asset missing from
/// `available` contributes a zero candidate.
///
/// # Errors
/// `Degenerate` when the pool has no assets; `Arithmetic` on overflow.
pub fn compute_share_out_amount(
    total_shares: Amount,
    pool_assets: &CoinSet,
    available: &CoinSet,
) -> Result<Amount, EngineError> {
    if pool_assets.is_empty() {
        return Err(EngineError::Degenerate(
            "pool has no assets to size against".to_string(),
        ));
    }
    let mut share_out: Option<Amount> = None;
    for asset in pool_assets.iter() {
        let numerator = total_shares
            .checked_mul(available.amount_of(&asset.denom))
            .ok_or_else(|| {
                EngineError::Arithmetic(format!("share-out overflow for {}", asset.denom))
            })?;
        let candidate = numerator / asset.amount;
        share_out = Some(match share_out {
            Some(current) => current.min(candidate),
            None => candidate,
        });
    }
    Ok(share_out.unwrap_or(0))
}

/// Exact coins a pool demands for `share_out` shares:
/// `floor(share_out * asset_amount / total_shares)` per asset.
///
/// # Errors
/// `InvalidInput` when the pool reports zero total shares but non-empty
/// assets; `Arithmetic` on overflow.
pub fn compute_needed_coins(
    total_shares: Amount,
    pool_assets: &CoinSet,
    share_out: Amount,
) -> Result<CoinSet, EngineError> {
    if total_shares == 0 {
        if pool_assets.is_empty() {
            return Ok(CoinSet::new());
        }
        return Err(EngineError::InvalidInput(
            "pool reports assets but zero total shares".to_string(),
        ));
    }
    let mut needed = CoinSet::new();
    for asset in pool_assets.iter() {
        let numerator = share_out.checked_mul(asset.amount).ok_or_else(|| {
            EngineError::Arithmetic(format!("needed-coins overflow for {}", asset.denom))
        })?;
        needed.add_coin(crate::domain::Coin::new(
            asset.denom.clone(),
            numerator / total_shares,
        ));
    }
    Ok(needed)
}

/// Deploy a tier's staking balance across pools in the oracle's yield
/// ranking, best pool first.
///
/// Each pool join is all-or-nothing: the staking account is debited for
/// exactly the coins the pool demands, the join request is fired, an LP
/// position is created, and the cohort is scheduled to settle
/// `tier.days()` after `day`. Pools that are not two-asset, unquoted, or
/// too large for the remaining balance are skipped.
pub fn deploy_capital(
    store: &mut VaultStore,
    oracle: &dyn PriceOracle,
    gateway: &mut dyn AmmGateway,
    day: EpochDay,
    tier: LockupTier,
) -> Result<Vec<PositionId>, EngineError> {
    let mut available = store.balance(AccountId::Staking(tier));
    let mut created = Vec::new();
    if available.is_empty() {
        return Ok(created);
    }

    for pool_id in oracle.pool_ranking() {
        if available.is_empty() {
            break;
        }
        let pool = match oracle.pool_info(pool_id) {
            Some(pool) => pool,
            None => {
                warn!(pool = %pool_id, "pool in ranking but not quoted, skipping");
                continue;
            }
        };
        if pool.assets.len() != 2 {
            debug!(pool = %pool_id, assets = pool.assets.len(), "not a two-asset pool, skipping");
            continue;
        }

        let share_out = match compute_share_out_amount(pool.total_shares, &pool.assets, &available)
        {
            Ok(amount) => amount,
            Err(EngineError::Degenerate(reason)) => {
                warn!(pool = %pool_id, %reason, "degenerate pool, skipping");
                continue;
            }
            Err(err) => return Err(err),
        };
        if share_out == 0 {
            debug!(pool = %pool_id, "available funds size to zero shares, skipping");
            continue;
        }
        let needed = compute_needed_coins(pool.total_shares, &pool.assets, share_out)?;
        if needed.is_empty() {
            continue;
        }

        store.debit(AccountId::Staking(tier), &needed)?;
        let seq = gateway.request_join_pool(pool_id, &needed, share_out);

        let (bond, unbond) = tier.bonding_unbonding();
        let mut position = LpPosition::new(
            seq.0,
            day,
            bond,
            day.plus(bond),
            unbond,
            pool_id,
            needed.clone(),
        );
        position.expected_apy = Some(pool.expected_apy);
        let position_id = store.create_position(position);
        store.set_pending_join(
            seq,
            PendingJoin {
                position_id,
                tier,
                coins: needed.clone(),
            },
        );
        store.record_deployment(day, tier, pool_id, &needed);
        store.schedule_settlement(day.plus(tier.days()), day, tier);

        info!(
            pool = %pool_id, position = %position_id, seq = %seq,
            coins = %needed, share_out,
            "requested pool join"
        );
        available = available.saturating_sub(&needed);
        created.push(position_id);
    }

    if !available.is_empty() {
        debug!(tier = %tier, remaining = %available, "undeployed balance stays staked");
    }
    Ok(created)
}

/// Request exits for the deployments this tier made `tier.days()` before
/// `day`, whose lockup is now over.
///
/// The shares to burn are sized against the pool's current reserves with
/// the same all-asset minimum used when joining.
pub fn trigger_exits(
    store: &mut VaultStore,
    oracle: &dyn PriceOracle,
    gateway: &mut dyn AmmGateway,
    day: EpochDay,
    tier: LockupTier,
) -> Result<Vec<SeqNo>, EngineError> {
    let Some(deployed_day) = day.minus(tier.days()) else {
        return Ok(Vec::new());
    };

    let mut requested = Vec::new();
    for pool_id in store.deployed_pools(deployed_day, tier) {
        let deployed = match store.deployment(deployed_day, tier, pool_id) {
            Some(coins) => coins.clone(),
            None => continue,
        };
        let pool = oracle.pool_info(pool_id).ok_or_else(|| {
            EngineError::NotFound(format!("pool {} no longer quoted for exit", pool_id))
        })?;
        let share_in = compute_share_out_amount(pool.total_shares, &pool.assets, &deployed)?;
        if share_in == 0 {
            warn!(pool = %pool_id, "deployment sizes to zero shares, nothing to exit");
            continue;
        }

        let seq = gateway.request_exit_pool(pool_id, share_in, &CoinSet::new());
        store.set_pending_exit(
            seq,
            PendingExit {
                day,
                pool_id,
                tier,
            },
        );
        info!(pool = %pool_id, seq = %seq, share_in, "requested pool exit");
        requested.push(seq);
    }
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{MockPriceOracle, PoolInfo, RecordingAmmGateway};
    use crate::domain::{Coin, Decimal, PoolId};

    fn coins<const N: usize>(pairs: [(&str, u128); N]) -> CoinSet {
        pairs
            .into_iter()
            .map(|(denom, amount)| Coin::new(denom, amount))
            .collect()
    }

    #[test]
    fn test_share_out_takes_minimum_over_assets() {
        // 1000 shares, pool holds 100a/400b. 50a sizes to 500 shares,
        // 100b sizes to 250; the minimum wins.
        let share_out = compute_share_out_amount(
            1000,
            &coins([("a", 100), ("b", 400)]),
            &coins([("a", 50), ("b", 100)]),
        )
        .unwrap();
        assert_eq!(share_out, 250);
    }

    #[test]
    fn test_share_out_missing_denom_is_zero() {
        let share_out = compute_share_out_amount(
            1000,
            &coins([("a", 100), ("b", 400)]),
            &coins([("a", 50)]),
        )
        .unwrap();
        assert_eq!(share_out, 0);
    }

    #[test]
    fn test_share_out_empty_pool_is_degenerate() {
        let err =
            compute_share_out_amount(1000, &CoinSet::new(), &coins([("a", 5)])).unwrap_err();
        assert!(matches!(err, EngineError::Degenerate(_)));
    }

    #[test]
    fn test_needed_coins_floor_division() {
        // 250 shares of a 1000-share pool claims a quarter of each reserve,
        // floored.
        let needed =
            compute_needed_coins(1000, &coins([("a", 101), ("b", 400)]), 250).unwrap();
        assert_eq!(needed, coins([("a", 25), ("b", 100)]));
    }

    #[test]
    fn test_needed_coins_zero_shares_rejected() {
        let err = compute_needed_coins(0, &coins([("a", 1)]), 10).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(compute_needed_coins(0, &CoinSet::new(), 10).unwrap(), CoinSet::new());
    }

    fn two_asset_pool(id: u64, a: u128, b: u128, shares: u128) -> PoolInfo {
        PoolInfo {
            id: PoolId(id),
            assets: coins([("uatom", a), ("uosmo", b)]),
            total_shares: shares,
            share_denom: format!("gamm/pool/{id}").as_str().into(),
            expected_apy: Decimal::from_str_canonical("0.2").unwrap(),
        }
    }

    #[test]
    fn test_deploy_creates_position_and_schedules_settlement() {
        let mut store = VaultStore::new();
        store.credit(
            AccountId::Staking(LockupTier::Days7),
            &coins([("uatom", 50), ("uosmo", 100)]),
        );
        let oracle = MockPriceOracle::new().with_pool(two_asset_pool(1, 100, 400, 1000));
        let mut gateway = RecordingAmmGateway::new();

        let created = deploy_capital(
            &mut store,
            &oracle,
            &mut gateway,
            EpochDay(10),
            LockupTier::Days7,
        )
        .unwrap();
        assert_eq!(created.len(), 1);

        // 250 shares demand 25uatom/100uosmo; the rest stays staked.
        let position = store.position_by_id(created[0]).unwrap();
        assert_eq!(position.deposited_coins, coins([("uatom", 25), ("uosmo", 100)]));
        assert_eq!(position.bond_duration, 1);
        assert_eq!(position.unbonding_duration, 7);
        assert_eq!(
            store.balance(AccountId::Staking(LockupTier::Days7)),
            coins([("uatom", 25)])
        );
        assert_eq!(
            store.settlement_cohorts(EpochDay(17)),
            vec![(EpochDay(10), LockupTier::Days7)]
        );
        assert_eq!(gateway.joins().len(), 1);
    }

    #[test]
    fn test_deploy_skips_non_two_asset_pools() {
        let mut store = VaultStore::new();
        store.credit(AccountId::Staking(LockupTier::Days7), &coins([("uatom", 50)]));
        let oracle = MockPriceOracle::new().with_pool(PoolInfo {
            id: PoolId(3),
            assets: coins([("uatom", 100)]),
            total_shares: 1000,
            share_denom: "gamm/pool/3".into(),
            expected_apy: Decimal::zero(),
        });
        let mut gateway = RecordingAmmGateway::new();

        let created = deploy_capital(
            &mut store,
            &oracle,
            &mut gateway,
            EpochDay(1),
            LockupTier::Days7,
        )
        .unwrap();
        assert!(created.is_empty());
        assert!(gateway.requests.is_empty());
    }

    #[test]
    fn test_trigger_exits_for_matured_deployments() {
        let mut store = VaultStore::new();
        store.record_deployment(
            EpochDay(3),
            LockupTier::Days7,
            PoolId(1),
            &coins([("uatom", 25), ("uosmo", 100)]),
        );
        let oracle = MockPriceOracle::new().with_pool(two_asset_pool(1, 100, 400, 1000));
        let mut gateway = RecordingAmmGateway::new();

        let seqs = trigger_exits(
            &mut store,
            &oracle,
            &mut gateway,
            EpochDay(10),
            LockupTier::Days7,
        )
        .unwrap();
        assert_eq!(seqs.len(), 1);
        assert_eq!(gateway.exits().len(), 1);
        let pending = store.take_pending_exit(seqs[0]).unwrap();
        assert_eq!(pending.pool_id, PoolId(1));
        assert_eq!(pending.day, EpochDay(10));
    }

    #[test]
    fn test_trigger_exits_before_maturity_is_noop() {
        let mut store = VaultStore::new();
        let oracle = MockPriceOracle::new();
        let mut gateway = RecordingAmmGateway::new();
        let seqs = trigger_exits(
            &mut store,
            &oracle,
            &mut gateway,
            EpochDay(3),
            LockupTier::Days7,
        )
        .unwrap();
        assert!(seqs.is_empty());
    }
}
