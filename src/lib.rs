pub mod collab;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use collab::{AmmGateway, DepositLedger, PoolInfo, PriceOracle};
pub use config::Config;
pub use domain::{
    Amount, Coin, CoinSet, Decimal, Denom, EpochDay, LockupTier, LpPosition, PoolId, PositionId,
    SeqNo, UserAccount,
};
pub use engine::{Allocation, CreditOp};
pub use error::EngineError;
pub use orchestration::Settler;
pub use store::{AccountId, VaultStore};
