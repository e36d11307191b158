//! Backstop minting for deficits the funding solver could not cover.

use std::collections::BTreeMap;

use tracing::info;

use crate::collab::PriceOracle;
use crate::domain::{Coin, CoinSet, Decimal, Denom};
use crate::error::EngineError;
use crate::store::{AccountId, VaultStore};

/// Cover a deficit by minting backstop units into the reserve, plus the
/// equivalent governance units into the permanently locked sub-account.
///
/// Per deficit asset, in denom order, `floor(deficit * price)` backstop
/// units are minted. Every asset is quoted before anything is minted, so a
/// missing quote aborts the batch with no partial mint.
///
/// Returns the minted backstop coin per deficit denom.
pub fn mint_deficit(
    store: &mut VaultStore,
    oracle: &dyn PriceOracle,
    deficit: &CoinSet,
    backstop_denom: &Denom,
    governance_denom: &Denom,
) -> Result<BTreeMap<Denom, Coin>, EngineError> {
    let mut quotes: Vec<(Coin, Decimal, Decimal)> = Vec::new();
    for coin in deficit.iter() {
        let backstop_price = oracle
            .relative_price(&coin.denom, backstop_denom)
            .ok_or_else(|| {
                EngineError::NotFound(format!("no {} quote for {}", backstop_denom, coin.denom))
            })?;
        let governance_price = oracle
            .relative_price(&coin.denom, governance_denom)
            .ok_or_else(|| {
                EngineError::NotFound(format!("no {} quote for {}", governance_denom, coin.denom))
            })?;
        quotes.push((coin, backstop_price, governance_price));
    }

    let mut minted = BTreeMap::new();
    for (coin, backstop_price, governance_price) in quotes {
        let value = Decimal::from_amount(coin.amount).ok_or_else(|| {
            EngineError::Arithmetic(format!("deficit amount out of range: {}", coin))
        })?;

        let backstop_amount = (value * backstop_price).to_amount_floor().ok_or_else(|| {
            EngineError::Arithmetic(format!("backstop mint out of range for {}", coin.denom))
        })?;
        let governance_amount =
            (value * governance_price).to_amount_floor().ok_or_else(|| {
                EngineError::Arithmetic(format!("governance mint out of range for {}", coin.denom))
            })?;

        let backstop_coin = Coin::new(backstop_denom.clone(), backstop_amount);
        store.mint_into(AccountId::Reserve, backstop_coin.clone());
        store.mint_into(
            AccountId::LockedGovernance,
            Coin::new(governance_denom.clone(), governance_amount),
        );

        info!(
            deficit = %coin, backstop = %backstop_coin, governance_amount,
            "minted backstop coverage"
        );
        minted.insert(coin.denom, backstop_coin);
    }
    Ok(minted)
}
