//! Sequential send pipeline for batch bundles.

use std::sync::Arc;

use bulkmint_rpc::{AddressCodec, BundleRuntimeExt, NodeRpc, SpendRuntime, WalletRpc};

use crate::{
    builder::FeeAttacher,
    cancel::CancelSignal,
    candidate::{TxCandidate, TxReceipt},
    config::TxManagerConfig,
    error::TxError,
    fee::FeeEstimator,
    monitor::TxMonitor,
    state::SendStage,
    submitter::TxSubmitter,
};

/// Takes one batch bundle at a time from built to confirmed.
///
/// Each send prices the bundle, attaches a fee, pushes the aggregate, waits for it to enter
/// and then leave the pool, and pauses before returning. Nothing is retried and no step is
/// rolled back: once the aggregate is pushed it may still be included after an error.
pub struct TxManager<N, W, R, A> {
    runtime: Arc<R>,
    estimator: FeeEstimator<N>,
    attacher: FeeAttacher<W, R, A>,
    submitter: TxSubmitter<N>,
    monitor: TxMonitor<N>,
    config: TxManagerConfig,
}

impl<N, W, R, A> TxManager<N, W, R, A> {
    /// Creates a new transaction manager.
    ///
    /// # Arguments
    ///
    /// * `node` - Full node used for pricing, submission and polling
    /// * `wallet` - Wallet paying the fees
    /// * `runtime` - Runtime computing bundle cost and aggregating signatures
    /// * `codec` - Codec for the fee wallet's change address
    /// * `config` - Fee, polling and confirmation settings
    pub fn new(
        node: Arc<N>,
        wallet: Arc<W>,
        runtime: Arc<R>,
        codec: Arc<A>,
        config: TxManagerConfig,
    ) -> Self {
        Self {
            estimator: FeeEstimator::new(Arc::clone(&node), config.clone()),
            attacher: FeeAttacher::new(wallet, Arc::clone(&runtime), codec, config.fee_wallet_id),
            submitter: TxSubmitter::new(Arc::clone(&node)),
            monitor: TxMonitor::new(node, config.clone()),
            runtime,
            config,
        }
    }

    /// Returns the manager configuration.
    pub const fn config(&self) -> &TxManagerConfig {
        &self.config
    }
}

impl<N, W, R, A> TxManager<N, W, R, A>
where
    N: NodeRpc,
    W: WalletRpc,
    R: SpendRuntime,
    A: AddressCodec,
{
    /// Sends a batch bundle and waits for it to confirm.
    ///
    /// # Errors
    ///
    /// Any failure ends the send. The error is logged with the stage it occurred in.
    pub async fn send(
        &self,
        candidate: &TxCandidate,
        cancel: &CancelSignal,
    ) -> Result<TxReceipt, TxError> {
        let mut stage = SendStage::Built;
        let result = self.drive(candidate, cancel, &mut stage).await;
        if let Err(err) = &result {
            tracing::error!(batch = candidate.batch_index, %stage, error = %err, "Send failed");
        }
        result
    }

    async fn drive(
        &self,
        candidate: &TxCandidate,
        cancel: &CancelSignal,
        stage: &mut SendStage,
    ) -> Result<TxReceipt, TxError> {
        if cancel.is_cancelled() {
            return Err(TxError::Cancelled);
        }

        let cost = self.runtime.bundle_cost(&candidate.bundle, self.config.max_spend_cost)?;
        let quote = self.estimator.estimate(cost).await?;
        tracing::info!(
            batch = candidate.batch_index,
            bundle = %candidate.batch_name(),
            cost,
            fee = quote.fee,
            source = ?quote.source,
            "Priced batch bundle"
        );

        let record = self.attacher.attach(&candidate.bundle, quote.fee).await?;
        let aggregate = record.spend_bundle.as_ref().ok_or(TxError::MissingFeeBundle(record.name))?;
        *stage = stage.advance(SendStage::FeeAttached)?;

        self.submitter.publish(aggregate).await?;
        *stage = stage.advance(SendStage::Submitted)?;

        let tx_id = self.monitor.wait_in_pool(record.name, cancel).await?;
        *stage = stage.advance(SendStage::InPool)?;

        self.monitor.wait_confirmed(record.name, tx_id, &record.removals, cancel).await?;
        *stage = stage.advance(SendStage::Confirmed)?;
        tracing::info!(batch = candidate.batch_index, bundle = %record.name, "Batch confirmed");

        // The bundle is confirmed either way; a cancel here is picked up before the next batch.
        cancel.sleep(self.config.post_confirmation_delay).await;

        Ok(TxReceipt {
            batch_index: candidate.batch_index,
            bundle_name: record.name,
            tx_id,
            cost,
            fee: quote.fee,
            fee_source: quote.source,
        })
    }
}

impl<N, W, R, A> std::fmt::Debug for TxManager<N, W, R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxManager").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bulkmint_primitives::{BlockchainState, Bytes32, Coin};

    use super::*;
    use crate::{
        builder::tests::{HashCodec, MockWallet, XorRuntime, batch_bundle},
        cancel::CancelHandle,
        error::Rejection,
        fee::FeeSource,
        monitor::tests::{PoolNode, TX_ID},
    };

    type TestManager = TxManager<PoolNode, MockWallet, XorRuntime, HashCodec>;

    fn fee_coin() -> Coin {
        Coin::new(Bytes32::repeat_byte(9), Bytes32::repeat_byte(8), 1_000)
    }

    fn manager(node: PoolNode, config: TxManagerConfig) -> (Arc<PoolNode>, TestManager) {
        let node = Arc::new(node);
        let wallet = Arc::new(MockWallet { coins: vec![fee_coin()], ..Default::default() });
        let manager =
            TxManager::new(Arc::clone(&node), wallet, Arc::new(XorRuntime), Arc::new(HashCodec), config);
        (node, manager)
    }

    fn free_block() -> BlockchainState {
        BlockchainState { block_max_cost: 1_000_000, mempool_max_total_cost: 1_000_000, mempool_cost: 0 }
    }

    #[tokio::test(start_paused = true)]
    async fn send_walks_the_full_pipeline() {
        let node = PoolNode { hidden_lookups: 1, pooled_polls: 2, state: free_block(), ..Default::default() };
        let (node, manager) = manager(node, TxManagerConfig::default());
        let candidate = TxCandidate::new(0, batch_bundle());
        let start = tokio::time::Instant::now();

        let receipt = manager.send(&candidate, &CancelSignal::never()).await.unwrap();

        let pushed = node.inner.lock().unwrap().pushed.clone();
        assert_eq!(pushed.len(), 1);
        assert_eq!(receipt.bundle_name, pushed[0].name());
        assert_ne!(receipt.bundle_name, candidate.batch_name());
        assert_eq!(receipt.tx_id, TX_ID);
        assert_eq!(receipt.cost, 10);
        assert_eq!(receipt.fee, 1);
        assert_eq!(receipt.fee_source, FeeSource::FreeCapacity);
        // fee spend first, batch spend last
        assert_eq!(pushed[0].coin_spends[0].coin, fee_coin());
        assert_eq!(pushed[0].coin_spends[1], candidate.bundle.coin_spends[0]);
        // 250ms pool lookup, two 1s confirmation polls, 2s post-confirmation pause
        assert_eq!(start.elapsed(), Duration::from_millis(4_250));
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_rate_fee_is_cost_times_rate() {
        let node = PoolNode { state: free_block(), ..Default::default() };
        let config = TxManagerConfig::builder().fee_per_cost(Some(5)).build();
        let (_, manager) = manager(node, config);

        let receipt =
            manager.send(&TxCandidate::new(2, batch_bundle()), &CancelSignal::never()).await.unwrap();

        assert_eq!(receipt.batch_index, 2);
        assert_eq!(receipt.fee, 50);
        assert_eq!(receipt.fee_source, FeeSource::Override);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_rate_submits_the_bare_batch() {
        let node = PoolNode { state: free_block(), ..Default::default() };
        let config = TxManagerConfig::builder().fee_per_cost(Some(0)).build();
        let (node, manager) = manager(node, config);
        let candidate = TxCandidate::new(0, batch_bundle());

        let receipt = manager.send(&candidate, &CancelSignal::never()).await.unwrap();

        assert_eq!(receipt.fee, 0);
        assert_eq!(receipt.bundle_name, candidate.batch_name());
        assert_eq!(node.inner.lock().unwrap().pushed[0], candidate.bundle);
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_stops_before_polling() {
        let node = PoolNode {
            reject: Some("DOUBLE_SPEND".into()),
            state: free_block(),
            ..Default::default()
        };
        let (node, manager) = manager(node, TxManagerConfig::default());

        let err = manager
            .send(&TxCandidate::new(0, batch_bundle()), &CancelSignal::never())
            .await
            .unwrap_err();

        assert_eq!(err, TxError::SubmissionRejected(Rejection::DoubleSpend));
        let inner = node.inner.lock().unwrap();
        assert_eq!(inner.scans, 0);
        assert_eq!(inner.polls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_send_does_nothing() {
        let (node, manager) = manager(PoolNode { state: free_block(), ..Default::default() }, TxManagerConfig::default());
        let handle = CancelHandle::new();
        handle.cancel();

        let err = manager.send(&TxCandidate::new(0, batch_bundle()), &handle.signal()).await.unwrap_err();

        assert_eq!(err, TxError::Cancelled);
        assert!(node.inner.lock().unwrap().pushed.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bundle_missing_from_pool_fails_after_push() {
        let node = PoolNode { hidden_lookups: u32::MAX, state: free_block(), ..Default::default() };
        let config = TxManagerConfig::builder().max_pool_lookups(3).build();
        let (node, manager) = manager(node, config);

        let err = manager
            .send(&TxCandidate::new(0, batch_bundle()), &CancelSignal::never())
            .await
            .unwrap_err();

        assert!(matches!(err, TxError::NotInPool { attempts: 3, .. }));
        assert!(err.may_be_pending());
        assert_eq!(node.inner.lock().unwrap().pushed.len(), 1);
    }
}
