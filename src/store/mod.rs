//! In-memory deterministic state store for the settlement engine.
//!
//! All collections are ordered (BTreeMap/BTreeSet) so every iteration the
//! engine performs is in a fixed total order. The store is `Clone`; a
//! settlement transition runs against a scratch clone and is committed by
//! replacing the live store, which gives all-or-nothing semantics without
//! an undo log.

pub mod accounts;
pub mod exits;
pub mod positions;

pub use accounts::AccountId;
pub use exits::{PendingExit, PendingJoin};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    Amount, Coin, CoinSet, Denom, EpochDay, EpochStats, LockupTier, LpPosition, PoolId,
    PositionId, SeqNo,
};

/// The module's persisted keyspace, one field per logical key family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultStore {
    // Position ledger: (epochDay, positionId) -> record, plus the reverse
    // index resolving a position's owning epoch day.
    pub(crate) positions: BTreeMap<(EpochDay, PositionId), LpPosition>,
    pub(crate) position_days: BTreeMap<PositionId, EpochDay>,
    pub(crate) position_count: u64,
    pub(crate) epoch_stats: BTreeMap<EpochDay, EpochStats>,
    pub(crate) epoch_denoms: BTreeSet<(EpochDay, Denom)>,

    // Day mappings: (targetDay, depositDay, lockupTier) facts consumed at
    // settlement time, plus the settled-day marker used for backlog reporting.
    pub(crate) day_mappings: BTreeSet<(EpochDay, EpochDay, LockupTier)>,
    pub(crate) settled_days: BTreeSet<EpochDay>,

    // Exit ledger: (epochDay, asset) -> amount returned from pools that day.
    pub(crate) exit_ledger: BTreeMap<(EpochDay, Denom), Amount>,
    // Reward collection: epochDay -> yield gathered for that day.
    pub(crate) reward_collections: BTreeMap<EpochDay, CoinSet>,
    // Pool deployments: (epochDay, tier, poolId) -> coins deployed, for
    // later exit matching.
    pub(crate) deployments: BTreeMap<(EpochDay, LockupTier, PoolId), CoinSet>,

    // Named module-owned balances.
    pub(crate) balances: BTreeMap<AccountId, CoinSet>,

    // Transport correlation: outstanding request sequence numbers.
    pub(crate) pending_joins: BTreeMap<SeqNo, PendingJoin>,
    pub(crate) pending_exits: BTreeMap<SeqNo, PendingExit>,
    pub(crate) pending_transfers: BTreeMap<SeqNo, Coin>,
}

impl VaultStore {
    pub fn new() -> Self {
        VaultStore::default()
    }
}
