//! Management and performance fee math plus fee deduction transfers.

use crate::domain::{Coin, CoinSet, Decimal};
use crate::error::EngineError;
use crate::store::{AccountId, VaultStore};

fn validate_rate(rate: Decimal) -> Result<(), EngineError> {
    if rate.is_negative() || rate > Decimal::one() {
        return Err(EngineError::InvalidInput(format!(
            "fee rate out of range: {}",
            rate.to_canonical_string()
        )));
    }
    Ok(())
}

/// Fee on a single coin, rounded half-up.
///
/// Note the asymmetry with [`fee_on_coins`], which truncates per coin.
pub fn fee_on_coin(coin: &Coin, rate: Decimal) -> Result<Coin, EngineError> {
    validate_rate(rate)?;
    let value = Decimal::from_amount(coin.amount)
        .ok_or_else(|| EngineError::Arithmetic(format!("amount out of range: {}", coin)))?;
    let fee = (value * rate).to_amount_round_half_up().ok_or_else(|| {
        EngineError::Arithmetic(format!("fee out of range for {}", coin.denom))
    })?;
    Ok(Coin::new(coin.denom.clone(), fee))
}

/// Fee on a coin set, truncated per coin.
pub fn fee_on_coins(coins: &CoinSet, rate: Decimal) -> Result<CoinSet, EngineError> {
    validate_rate(rate)?;
    let mut fees = CoinSet::new();
    for coin in coins.iter() {
        let value = Decimal::from_amount(coin.amount)
            .ok_or_else(|| EngineError::Arithmetic(format!("amount out of range: {}", coin)))?;
        let fee = (value * rate).to_amount_floor().ok_or_else(|| {
            EngineError::Arithmetic(format!("fee out of range for {}", coin.denom))
        })?;
        fees.add_coin(Coin::new(coin.denom, fee));
    }
    Ok(fees)
}

/// Move collected fees from a module account into a fee collector.
///
/// # Errors
/// `InsufficientFunds` when the source account cannot cover `fees`.
pub fn deduct_vault_fees(
    store: &mut VaultStore,
    from: AccountId,
    collector: AccountId,
    fees: &CoinSet,
) -> Result<(), EngineError> {
    store.transfer(from, collector, fees)
}
