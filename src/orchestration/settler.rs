//! The epoch-end settlement transition.

use tracing::{debug, info, warn};

use crate::collab::{AmmGateway, DepositLedger, PriceOracle};
use crate::config::Config;
use crate::domain::{CoinSet, EpochDay, LockupTier};
use crate::engine::allocator::{deploy_capital, trigger_exits};
use crate::engine::distribution::{distribute_principal, distribute_rewards, CreditOp};
use crate::error::EngineError;
use crate::store::{AccountId, VaultStore};

/// Owns the live store and drives the end-of-epoch transition.
///
/// The whole transition runs against a scratch clone; the live store is
/// replaced only when every step has succeeded, and the deferred ledger
/// credits are flushed only after that swap. A failed transition leaves
/// both the store and the ledger exactly as they were.
#[derive(Debug)]
pub struct Settler {
    config: Config,
    store: VaultStore,
}

impl Settler {
    pub fn new(config: Config) -> Self {
        Settler {
            config,
            store: VaultStore::new(),
        }
    }

    pub fn with_store(config: Config, store: VaultStore) -> Self {
        Settler { config, store }
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut VaultStore {
        &mut self.store
    }

    /// Record yield gathered for `day`, to be distributed when that day's
    /// epoch ends.
    pub fn record_reward_collection(&mut self, day: EpochDay, rewards: crate::domain::CoinSet) {
        self.store.set_reward_collection(day, rewards);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// End-of-epoch hook. `identifier` must match the configured epoch
    /// identifier; anything else is ignored, as is the disabled state.
    pub fn on_epoch_end(
        &mut self,
        identifier: &str,
        epoch_number: u64,
        ledger: &mut dyn DepositLedger,
        oracle: &dyn PriceOracle,
        gateway: &mut dyn AmmGateway,
    ) -> Result<(), EngineError> {
        if identifier != self.config.epoch_identifier {
            debug!(identifier, "ignoring foreign epoch identifier");
            return Ok(());
        }
        if !self.config.enabled {
            debug!("settlement disabled, skipping epoch end");
            return Ok(());
        }
        let day = EpochDay(epoch_number);
        info!(%day, "epoch ended, starting settlement");

        let backlog = self.store.unsettled_backlog(day);
        if !backlog.is_empty() {
            warn!(%day, ?backlog, "settlement backlog: cohorts scheduled for past days never settled");
        }

        let mut scratch = self.store.clone();
        let ops = run_transition(&mut scratch, &self.config, day, ledger, oracle, gateway)?;

        self.store = scratch;
        for op in &ops {
            op.apply(ledger);
        }
        info!(%day, credits = ops.len(), "settlement committed");
        Ok(())
    }
}

/// The settlement steps, in order: stage the day's deposits, deploy and
/// unwind per tier, settle principal, then distribute rewards.
fn run_transition(
    store: &mut VaultStore,
    config: &Config,
    day: EpochDay,
    ledger: &mut dyn DepositLedger,
    oracle: &dyn PriceOracle,
    gateway: &mut dyn AmmGateway,
) -> Result<Vec<CreditOp>, EngineError> {
    // New deposits move into the per-tier staking accounts and toward the
    // remote chain.
    let mut staged_total = CoinSet::new();
    for tier in LockupTier::ALL {
        let staged = ledger.epoch_lockup_deposits(day, tier);
        if staged.is_empty() {
            continue;
        }
        store.credit(AccountId::Staking(tier), &staged);
        for coin in staged.iter() {
            let seq = gateway.request_transfer(&coin);
            store.set_pending_transfer(seq, coin);
        }
        staged_total = staged_total.add(&staged);
    }
    let reported = ledger.total_epoch_deposits(day);
    if staged_total != reported {
        warn!(%day, staged = %staged_total, reported = %reported,
            "per-tier deposits disagree with the ledger's epoch total");
    }

    for tier in LockupTier::ALL {
        deploy_capital(store, oracle, gateway, day, tier)?;
        trigger_exits(store, oracle, gateway, day, tier)?;
    }

    let mut ops = distribute_principal(
        store,
        ledger,
        oracle,
        day,
        config.mgmt_fee_rate,
        &config.backstop_denom,
        &config.governance_denom,
    )?;

    // Yield may not have been gathered for this day; only a missing
    // collection is skippable. Any failure inside the distribution aborts
    // the transition.
    if store.reward_collection(day).is_some() {
        ops.extend(distribute_rewards(
            store,
            ledger,
            oracle,
            day,
            config.perf_fee_rate,
            &config.backstop_denom,
        )?);
    } else {
        debug!(%day, "no reward collection to distribute");
    }

    Ok(ops)
}
