use anyhow::Context;
use epochvault::collab::mock::AmmRequest;
use epochvault::collab::{MockDepositLedger, MockPriceOracle, RecordingAmmGateway};
use epochvault::{
    Coin, CoinSet, Config, Decimal, EpochDay, LockupTier, PoolId, PoolInfo, Settler,
};

/// Simulates a few settlement days against mock collaborators: deposits
/// arrive, capital deploys, joins and exits resolve, and lockups settle
/// back to the depositors.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let identifier = config.epoch_identifier.clone();
    let mut settler = Settler::new(config);

    let oracle = MockPriceOracle::new()
        .with_price("uatom", "uvault", Decimal::from_str_canonical("2.0")?)
        .with_price("uatom", "ugov", Decimal::from_str_canonical("0.5")?)
        .with_price("uosmo", "uvault", Decimal::from_str_canonical("0.5")?)
        .with_price("uosmo", "ugov", Decimal::from_str_canonical("0.125")?)
        .with_pool(PoolInfo {
            id: PoolId(1),
            assets: CoinSet::from_coins([Coin::new("uatom", 100_000), Coin::new("uosmo", 400_000)]),
            total_shares: 1_000_000,
            share_denom: "gamm/pool/1".into(),
            expected_apy: Decimal::from_str_canonical("0.22")?,
        });

    let mut ledger = MockDepositLedger::new()
        .with_deposit(
            EpochDay(1),
            LockupTier::Days7,
            "alice",
            CoinSet::from_coins([Coin::new("uatom", 3_000), Coin::new("uosmo", 12_000)]),
        )
        .with_deposit(
            EpochDay(1),
            LockupTier::Days7,
            "bob",
            CoinSet::from_coins([Coin::new("uatom", 1_000), Coin::new("uosmo", 4_000)]),
        )
        .with_active_deposit(
            EpochDay(8),
            "alice",
            CoinSet::from_coins([Coin::new("uatom", 3_000)]),
        );

    let mut gateway = RecordingAmmGateway::new();

    for day in 1..=8u64 {
        settler.on_epoch_end(&identifier, day, &mut ledger, &oracle, &mut gateway)?;

        // Resolve everything the settler sent this day.
        let sent: Vec<AmmRequest> = gateway.requests.drain(..).collect();
        for request in sent {
            match request {
                AmmRequest::Join { seq, coins, share_out, .. } => {
                    tracing::info!(%seq, %coins, share_out, "ack: join granted");
                    settler.on_join_ack(seq, Ok(Coin::new("gamm/pool/1", share_out)))?;
                }
                AmmRequest::Exit { seq, pool, .. } => {
                    // Exit returns what was deployed.
                    let returned = settler
                        .store()
                        .deployment(
                            EpochDay(day.saturating_sub(LockupTier::Days7.days())),
                            LockupTier::Days7,
                            pool,
                        )
                        .cloned()
                        .unwrap_or_default();
                    settler.on_exit_ack(seq, Ok(returned))?;
                }
                AmmRequest::Transfer { seq, .. } => {
                    settler.on_transfer_ack(seq, true)?;
                }
            }
        }

        // Yield shows up the day before the lockup settles.
        if day == 7 {
            settler.record_reward_collection(
                EpochDay(8),
                CoinSet::from_coins([Coin::new("uosmo", 500)]),
            );
        }
    }

    let report = serde_json::json!({
        "claimable": ledger.claimable,
        "rewards": ledger.rewards,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
