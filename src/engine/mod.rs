//! Settlement-engine logic: pool sizing, funding allocation, deficit
//! minting, fee math, and distribution.

pub mod allocator;
pub mod distribution;
pub mod fees;
pub mod minter;
pub mod solver;

pub use allocator::{compute_needed_coins, compute_share_out_amount, deploy_capital, trigger_exits};
pub use distribution::{
    cohort_weights, distribute_principal, distribute_rewards, user_share_and_fees, CreditOp,
    UserDenomWeight,
};
pub use fees::{deduct_vault_fees, fee_on_coin, fee_on_coins};
pub use minter::mint_deficit;
pub use solver::{allocate, Allocation};
