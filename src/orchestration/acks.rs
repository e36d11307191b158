//! Handlers for transport acknowledgements arriving after settlement.
//!
//! Each handler is its own state transition: the pending record is
//! consumed first and every mutation after that point is infallible, so a
//! handled ack never leaves the store half-updated.

use tracing::{info, warn};

use super::settler::Settler;
use crate::domain::{Coin, CoinSet, SeqNo};
use crate::error::EngineError;
use crate::store::AccountId;

impl Settler {
    /// A pool-join request resolved. On success the granted receipt is
    /// annotated onto the position; on failure the deployed coins return to
    /// the tier staking account and the position is removed.
    pub fn on_join_ack(
        &mut self,
        seq: SeqNo,
        granted: Result<Coin, String>,
    ) -> Result<(), EngineError> {
        let pending = self
            .store_mut()
            .take_pending_join(seq)
            .ok_or_else(|| EngineError::NotFound(format!("no pending join for seq {}", seq)))?;

        match granted {
            Ok(receipt) => {
                info!(%seq, position = %pending.position_id, %receipt, "pool join confirmed");
                self.store_mut()
                    .annotate_receipt(pending.position_id, receipt, None)
            }
            Err(reason) => {
                warn!(%seq, position = %pending.position_id, %reason, "pool join rejected, refunding");
                let store = self.store_mut();
                store.credit(AccountId::Staking(pending.tier), &pending.coins);
                if let Some(position) = store.remove_position(pending.position_id) {
                    store.reduce_deployment(
                        position.bonding_start_day,
                        pending.tier,
                        position.pool_id,
                        &pending.coins,
                    );
                }
                Ok(())
            }
        }
    }

    /// A pool-exit request resolved. Received coins land in the exit
    /// ledger of the day the exit was requested, funding that day's
    /// principal distribution.
    pub fn on_exit_ack(
        &mut self,
        seq: SeqNo,
        received: Result<CoinSet, String>,
    ) -> Result<(), EngineError> {
        let pending = self
            .store_mut()
            .take_pending_exit(seq)
            .ok_or_else(|| EngineError::NotFound(format!("no pending exit for seq {}", seq)))?;

        match received {
            Ok(coins) => {
                info!(%seq, pool = %pending.pool_id, %coins, "pool exit confirmed");
                for coin in coins.iter() {
                    self.store_mut().add_epoch_exit_amount(pending.day, &coin);
                }
            }
            Err(reason) => {
                warn!(%seq, pool = %pending.pool_id, %reason, "pool exit rejected, funds remain deployed");
            }
        }
        Ok(())
    }

    /// A token-transfer request resolved; either way the pending record is
    /// cleared.
    pub fn on_transfer_ack(&mut self, seq: SeqNo, ok: bool) -> Result<(), EngineError> {
        let coin = self
            .store_mut()
            .take_pending_transfer(seq)
            .ok_or_else(|| EngineError::NotFound(format!("no pending transfer for seq {}", seq)))?;
        if ok {
            info!(%seq, %coin, "transfer confirmed");
        } else {
            warn!(%seq, %coin, "transfer failed");
        }
        Ok(())
    }
}
