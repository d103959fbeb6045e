//! Pool entry and confirmation tracking.

use std::sync::Arc;

use bulkmint_primitives::{Bytes32, Coin};
use bulkmint_rpc::NodeRpc;

use crate::{
    cancel::CancelSignal,
    config::{ConfirmationPolicy, TxManagerConfig},
    error::TxError,
};

/// Polls the node for a submitted bundle.
///
/// Both waits are bounded by the configured attempt counts and return
/// [`TxError::Cancelled`] as soon as the signal fires.
pub struct TxMonitor<N> {
    /// Node being polled.
    node: Arc<N>,
    /// Polling intervals, limits and confirmation policy.
    config: TxManagerConfig,
}

impl<N> TxMonitor<N> {
    /// Creates a new monitor.
    pub const fn new(node: Arc<N>, config: TxManagerConfig) -> Self {
        Self { node, config }
    }
}

impl<N: NodeRpc> TxMonitor<N> {
    /// Waits for a bundle to show up in the pool.
    ///
    /// # Returns
    ///
    /// The pool id the bundle is listed under.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::NotInPool`] once the lookups are exhausted.
    pub async fn wait_in_pool(
        &self,
        bundle_name: Bytes32,
        cancel: &CancelSignal,
    ) -> Result<Bytes32, TxError> {
        for attempt in 1..=self.config.max_pool_lookups {
            if cancel.is_cancelled() {
                return Err(TxError::Cancelled);
            }

            let items = self.node.get_all_mempool_items().await?;
            let found = items.iter().find(|(_, item)| item.spend_bundle_name == bundle_name);
            if let Some((tx_id, item)) = found {
                tracing::info!(bundle = %bundle_name, %tx_id, cost = item.cost, fee = item.fee, "Bundle in pool");
                return Ok(*tx_id);
            }

            tracing::debug!(bundle = %bundle_name, attempt, pool_items = items.len(), "Bundle not yet pooled");
            if attempt < self.config.max_pool_lookups
                && !cancel.sleep(self.config.pool_lookup_interval).await
            {
                return Err(TxError::Cancelled);
            }
        }

        Err(TxError::NotInPool { bundle: bundle_name, attempts: self.config.max_pool_lookups })
    }

    /// Waits for a pooled bundle to leave the pool, then applies the confirmation policy.
    ///
    /// # Arguments
    ///
    /// * `bundle_name` - Name of the submitted bundle
    /// * `tx_id` - Pool id returned by [`wait_in_pool`](Self::wait_in_pool)
    /// * `removals` - Coins the bundle spends, checked under [`ConfirmationPolicy::VerifySpent`]
    /// * `cancel` - Cancellation signal checked every poll
    ///
    /// # Errors
    ///
    /// Returns [`TxError::ConfirmationTimeout`] if the bundle is still pooled after the last
    /// poll, and [`TxError::Evicted`] if the strict policy finds an unspent removal.
    pub async fn wait_confirmed(
        &self,
        bundle_name: Bytes32,
        tx_id: Bytes32,
        removals: &[Coin],
        cancel: &CancelSignal,
    ) -> Result<(), TxError> {
        for poll in 1..=self.config.max_confirmation_polls {
            if cancel.is_cancelled() {
                return Err(TxError::Cancelled);
            }

            if self.node.get_mempool_item_by_tx_id(tx_id).await?.is_none() {
                tracing::debug!(bundle = %bundle_name, poll, "Bundle left the pool");
                return self.check_policy(bundle_name, removals).await;
            }

            tracing::debug!(bundle = %bundle_name, poll, "Bundle still pooled");
            if !cancel.sleep(self.config.confirmation_poll_interval).await {
                return Err(TxError::Cancelled);
            }
        }

        Err(TxError::ConfirmationTimeout {
            bundle: bundle_name,
            polls: self.config.max_confirmation_polls,
        })
    }

    async fn check_policy(&self, bundle_name: Bytes32, removals: &[Coin]) -> Result<(), TxError> {
        match self.config.confirmation_policy {
            ConfirmationPolicy::AssumeConfirmed => {
                tracing::warn!(
                    bundle = %bundle_name,
                    "Bundle left the pool; assuming it was included without checking coin records"
                );
                Ok(())
            }
            ConfirmationPolicy::VerifySpent => {
                for coin in removals {
                    let name = coin.name();
                    let spent = self
                        .node
                        .get_coin_record_by_name(name)
                        .await?
                        .is_some_and(|record| record.spent);
                    if !spent {
                        return Err(TxError::Evicted { bundle: bundle_name, coin: name });
                    }
                }
                tracing::info!(bundle = %bundle_name, removals = removals.len(), "Verified removals spent");
                Ok(())
            }
        }
    }
}

impl<N> std::fmt::Debug for TxMonitor<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxMonitor").field("config", &self.config).finish_non_exhaustive()
    }
}
