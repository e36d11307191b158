//! Domain types and determinism layer for the epoch settlement engine.
//!
//! This module provides:
//! - Integer coin arithmetic via Coin/CoinSet with clamped subtraction
//! - Decimal prices/weights with explicit rounding back to amounts
//! - Domain primitives: EpochDay, Denom, UserAccount, PoolId, PositionId
//! - LP position records with their activity window logic

pub mod coin;
pub mod decimal;
pub mod lockup;
pub mod position;
pub mod primitives;

pub use coin::{Coin, CoinSet};
pub use decimal::Decimal;
pub use lockup::LockupTier;
pub use position::{EpochStats, LpPosition};
pub use primitives::{Amount, Denom, EpochDay, PoolId, PositionId, SeqNo, UserAccount};
