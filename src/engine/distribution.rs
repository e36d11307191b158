//! Principal and reward distribution at settlement time.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::collab::{DepositLedger, PriceOracle};
use crate::domain::{Amount, Coin, CoinSet, Decimal, Denom, EpochDay, LockupTier, UserAccount};
use crate::engine::fees::fee_on_coins;
use crate::engine::minter::mint_deficit;
use crate::engine::solver::allocate;
use crate::error::EngineError;
use crate::store::{AccountId, VaultStore};

/// Deferred credit toward the external deposit ledger. Settlement computes
/// these against scratch state; the orchestrator flushes them only after
/// the whole transition has committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditOp {
    /// Settled principal, withdrawable by the user.
    Claimable { user: UserAccount, coins: CoinSet },
    /// Distributed yield.
    Reward { user: UserAccount, coins: CoinSet },
}

impl CreditOp {
    /// Apply this credit to the deposit ledger.
    pub fn apply(&self, ledger: &mut dyn DepositLedger) {
        match self {
            CreditOp::Claimable { user, coins } => ledger.credit_claimable(user, coins),
            CreditOp::Reward { user, coins } => ledger.credit_reward(user, coins),
        }
    }
}

/// One user's stake in a settling cohort: the deposited amount of one denom
/// and its share of the cohort total for that denom.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDenomWeight {
    pub user: UserAccount,
    pub denom: Denom,
    pub amount: Amount,
    pub weight: Decimal,
}

/// Aggregate the settling cohorts into per-(user, denom) weights and the
/// total principal owed.
///
/// Weights are each user's deposited amount over the cohort total for that
/// denom, so they sum to one per denom. Output is ordered by (user, denom).
pub fn cohort_weights(
    ledger: &dyn DepositLedger,
    cohorts: &[(EpochDay, LockupTier)],
) -> Result<(Vec<UserDenomWeight>, CoinSet), EngineError> {
    let mut per_user: BTreeMap<(UserAccount, Denom), Amount> = BTreeMap::new();
    let mut needed = CoinSet::new();

    for (deposit_day, tier) in cohorts {
        for (user, coins) in ledger.epoch_user_deposits(*deposit_day, *tier) {
            for coin in coins.iter() {
                *per_user.entry((user.clone(), coin.denom.clone())).or_insert(0) += coin.amount;
                needed.add_coin(coin);
            }
        }
    }

    let mut weights = Vec::with_capacity(per_user.len());
    for ((user, denom), amount) in per_user {
        let total = needed.amount_of(&denom);
        let weight = Decimal::from_ratio(amount, total).ok_or_else(|| {
            EngineError::Arithmetic(format!("weight out of range for {}/{}", user, denom))
        })?;
        weights.push(UserDenomWeight {
            user,
            denom,
            amount,
            weight,
        });
    }
    Ok((weights, needed))
}

/// One user's cut of the settled principal for a deposited denom.
///
/// The pot for the denom is what the funding solver covered plus any
/// backstop coins minted against its deficit. The user's gross is
/// `pot * weight`; the management fee comes out of the gross, and both
/// sides truncate to integer coins.
pub fn user_share_and_fees(
    denom: &Denom,
    weight: Decimal,
    available: &CoinSet,
    minted: &BTreeMap<Denom, Coin>,
    mgmt_fee_rate: Decimal,
) -> Result<(CoinSet, CoinSet), EngineError> {
    let mut pot: Vec<Coin> = vec![Coin::new(denom.clone(), available.amount_of(denom))];
    if let Some(backstop) = minted.get(denom) {
        pot.push(backstop.clone());
    }

    let mut user_coins = CoinSet::new();
    let mut fees = CoinSet::new();
    for coin in pot {
        let gross = Decimal::from_amount(coin.amount)
            .ok_or_else(|| EngineError::Arithmetic(format!("amount out of range: {}", coin)))?
            * weight;
        let fee = gross * mgmt_fee_rate;
        let net = gross - fee;

        let fee_amount = fee.to_amount_floor().ok_or_else(|| {
            EngineError::Arithmetic(format!("fee out of range for {}", coin.denom))
        })?;
        let net_amount = net.to_amount_floor().ok_or_else(|| {
            EngineError::Arithmetic(format!("share out of range for {}", coin.denom))
        })?;
        user_coins.add_coin(Coin::new(coin.denom.clone(), net_amount));
        fees.add_coin(Coin::new(coin.denom, fee_amount));
    }
    Ok((user_coins, fees))
}

/// Return settled principal to the depositors whose lockups end on `day`.
///
/// Funding cascades from the day's exit ledger into the reserve; any
/// remaining deficit is covered by backstop minting. Each user is credited
/// their weighted share net of the management fee. Returns the ledger
/// credits for the orchestrator to flush after commit.
pub fn distribute_principal(
    store: &mut VaultStore,
    ledger: &dyn DepositLedger,
    oracle: &dyn PriceOracle,
    day: EpochDay,
    mgmt_fee_rate: Decimal,
    backstop_denom: &Denom,
    governance_denom: &Denom,
) -> Result<Vec<CreditOp>, EngineError> {
    let cohorts = store.settlement_cohorts(day);
    if cohorts.is_empty() {
        store.mark_settled(day);
        return Ok(Vec::new());
    }

    let (weights, needed) = cohort_weights(ledger, &cohorts)?;
    let epoch_exit = store.epoch_exit_coins(day, &needed);
    let reserve = store.balance(AccountId::Reserve);
    let alloc = allocate(&needed, &epoch_exit, &reserve);

    info!(
        %day, needed = %needed, from_exit = %alloc.from_exit,
        from_reserve = %alloc.from_reserve, deficit = %alloc.deficit,
        excess = %alloc.excess_exit, "settling principal"
    );

    let minted = mint_deficit(store, oracle, &alloc.deficit, backstop_denom, governance_denom)?;

    for coin in alloc.from_exit.iter() {
        store.sub_epoch_exit_amount(day, &coin);
    }
    store.debit(AccountId::Reserve, &alloc.from_reserve)?;
    // Minted coverage leaves the reserve as part of the distribution pot.
    let minted_total: CoinSet = minted.values().cloned().collect();
    store.debit(AccountId::Reserve, &minted_total)?;

    let available = alloc.funded();
    let mut ops = Vec::new();
    let mut total_fees = CoinSet::new();
    for entry in &weights {
        let (user_coins, fees) = user_share_and_fees(
            &entry.denom,
            entry.weight,
            &available,
            &minted,
            mgmt_fee_rate,
        )?;
        if !user_coins.is_empty() {
            ops.push(CreditOp::Claimable {
                user: entry.user.clone(),
                coins: user_coins,
            });
        }
        total_fees = total_fees.add(&fees);
    }
    store.credit(AccountId::MgmtFeeCollector, &total_fees);
    store.mark_settled(day);
    Ok(ops)
}

/// Split the day's collected yield across every depositor still locked.
///
/// The performance fee comes off the top. What remains is first split
/// across the deposited denoms by their backstop-priced share of the
/// capital locked the previous day, then within each denom by the user's
/// share of that denom. Every division truncates, so no asset is ever
/// over-distributed.
///
/// The store is written only after every price lookup has succeeded: a
/// missing quote leaves the collection stored and the fee untaken.
pub fn distribute_rewards(
    store: &mut VaultStore,
    ledger: &dyn DepositLedger,
    oracle: &dyn PriceOracle,
    day: EpochDay,
    perf_fee_rate: Decimal,
    backstop_denom: &Denom,
) -> Result<Vec<CreditOp>, EngineError> {
    let collected = store
        .reward_collection(day)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(format!("no reward collection for day {}", day)))?;

    let fees = fee_on_coins(&collected, perf_fee_rate)?;
    let net = collected.saturating_sub(&fees);

    let locked_day = day.minus(1).unwrap_or(day);
    let total_locked = store.total_locked_coins(locked_day);
    if total_locked.is_empty() {
        warn!(%day, "no capital locked, rewards stay collected");
        return Ok(Vec::new());
    }

    // Backstop-priced value of the locked capital, per denom and in total.
    let mut equivalent: BTreeMap<Denom, Decimal> = BTreeMap::new();
    let mut total_equivalent = Decimal::zero();
    for coin in total_locked.iter() {
        let price = oracle
            .relative_price(&coin.denom, backstop_denom)
            .ok_or_else(|| {
                EngineError::NotFound(format!("no {} quote for {}", backstop_denom, coin.denom))
            })?;
        let value = Decimal::from_amount(coin.amount)
            .ok_or_else(|| EngineError::Arithmetic(format!("amount out of range: {}", coin)))?
            * price;
        total_equivalent = total_equivalent + value;
        equivalent.insert(coin.denom, value);
    }
    if total_equivalent.is_zero() {
        return Err(EngineError::Degenerate(
            "locked capital has zero priced value".to_string(),
        ));
    }

    // Reward pot attributed to each locked denom.
    let mut denom_rewards: BTreeMap<Denom, CoinSet> = BTreeMap::new();
    for (denom, value) in &equivalent {
        let weight = *value / total_equivalent;
        let mut share = CoinSet::new();
        for coin in net.iter() {
            let amount = (Decimal::from_amount(coin.amount).ok_or_else(|| {
                EngineError::Arithmetic(format!("amount out of range: {}", coin))
            })? * weight)
                .to_amount_floor()
                .ok_or_else(|| {
                    EngineError::Arithmetic(format!("reward out of range for {}", coin.denom))
                })?;
            share.add_coin(Coin::new(coin.denom, amount));
        }
        denom_rewards.insert(denom.clone(), share);
    }

    let mut ops = Vec::new();
    for (user, deposits) in ledger.active_user_deposits(day) {
        let mut total_reward = CoinSet::new();
        for coin in deposits.iter() {
            let denom_total = total_locked.amount_of(&coin.denom);
            if denom_total == 0 {
                continue;
            }
            let weight = Decimal::from_ratio(coin.amount, denom_total).ok_or_else(|| {
                EngineError::Arithmetic(format!("weight out of range for {}", coin.denom))
            })?;
            let Some(pot) = denom_rewards.get(&coin.denom) else {
                continue;
            };
            for reward_coin in pot.iter() {
                let amount = (Decimal::from_amount(reward_coin.amount).ok_or_else(|| {
                    EngineError::Arithmetic(format!("amount out of range: {}", reward_coin))
                })? * weight)
                    .to_amount_floor()
                    .ok_or_else(|| {
                        EngineError::Arithmetic(format!(
                            "reward out of range for {}",
                            reward_coin.denom
                        ))
                    })?;
                total_reward.add_coin(Coin::new(reward_coin.denom, amount));
            }
        }
        if !total_reward.is_empty() {
            ops.push(CreditOp::Reward {
                user,
                coins: total_reward,
            });
        }
    }

    store.credit(AccountId::PerfFeeCollector, &fees);
    store.remove_reward_collection(day);
    info!(%day, users = ops.len(), fees = %fees, "distributed rewards");
    Ok(ops)
}
