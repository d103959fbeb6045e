//! Mint run orchestration.

use std::sync::Arc;

use bulkmint_primitives::MintRecord;
use bulkmint_rpc::{AddressCodec, NodeRpc, SpendRuntime, WalletRpc};
use bulkmint_txmgr::{CancelSignal, TxCandidate, TxManager, TxManagerConfig, TxReceipt};
use tokio::time::Instant;

use crate::{BatchBuilder, BuiltBatch, MintError, MintMetrics, MinterConfig, write_audit_trail};

/// Runs a bulk mint: builds every batch bundle, then sends them one at a time.
pub struct MintRunner<N, W, R, A> {
    builder: BatchBuilder<W, R, A>,
    manager: TxManager<N, W, R, A>,
    metrics: MintMetrics,
}

impl<N, W, R, A> MintRunner<N, W, R, A> {
    /// Creates a new mint runner.
    ///
    /// # Arguments
    ///
    /// * `node` - Full node used by the send pipeline
    /// * `wallet` - Wallet holding the funding, authority and fee coins
    /// * `runtime` - Runtime for bundle cost, additions and signatures
    /// * `codec` - Address codec for targets, royalty and change addresses
    /// * `config` - Batching, wallet and output settings
    /// * `tx_config` - Fee and polling settings for the send pipeline
    pub fn new(
        node: Arc<N>,
        wallet: Arc<W>,
        runtime: Arc<R>,
        codec: Arc<A>,
        config: MinterConfig,
        tx_config: TxManagerConfig,
    ) -> Self {
        Self {
            builder: BatchBuilder::new(
                Arc::clone(&wallet),
                Arc::clone(&runtime),
                Arc::clone(&codec),
                config,
            ),
            manager: TxManager::new(node, wallet, runtime, codec, tx_config),
            metrics: MintMetrics::new(),
        }
    }

    /// Returns the minter configuration.
    pub const fn config(&self) -> &MinterConfig {
        self.builder.config()
    }

    /// Returns the run metrics.
    pub const fn metrics(&self) -> &MintMetrics {
        &self.metrics
    }
}

impl<N, W, R, A> MintRunner<N, W, R, A>
where
    N: NodeRpc,
    W: WalletRpc,
    R: SpendRuntime,
    A: AddressCodec,
{
    /// Builds every batch bundle and writes the audit trail when an output path is set.
    ///
    /// # Errors
    ///
    /// Any [`BatchBuilder::build`] error, or [`MintError::Audit`] if the trail cannot be
    /// written. No trail is written when building fails.
    pub async fn build(
        &mut self,
        records: &[MintRecord],
        targets: &[String],
    ) -> Result<Vec<BuiltBatch>, MintError> {
        let batches = self.builder.build(records, targets).await?;
        self.metrics.batches_built += batches.len() as u64;

        if let Some(path) = &self.builder.config().output_path {
            write_audit_trail(path, &batches)?;
        }
        Ok(batches)
    }

    /// Sends `batches` in order, each only after the previous one confirmed.
    ///
    /// The cancel signal is checked before each batch and inside every wait.
    ///
    /// # Errors
    ///
    /// The first failure stops the run. [`MintError::Cancelled`] and
    /// [`MintError::Submission`] carry the index of the batch that did not complete.
    pub async fn submit(
        &mut self,
        batches: &[BuiltBatch],
        cancel: &CancelSignal,
    ) -> Result<Vec<TxReceipt>, MintError> {
        let mut receipts = Vec::with_capacity(batches.len());

        for batch in batches {
            if cancel.is_cancelled() {
                tracing::warn!(batch = batch.index, "Run cancelled before batch");
                return Err(MintError::Cancelled { batch: batch.index });
            }

            let started = Instant::now();
            let candidate = TxCandidate::new(batch.index, batch.bundle.clone());
            let receipt = match self.manager.send(&candidate, cancel).await {
                Ok(receipt) => receipt,
                Err(err) => {
                    tracing::error!(
                        batch = batch.index,
                        records = ?batch.range,
                        confirmed = receipts.len(),
                        error = %err,
                        "Batch failed"
                    );
                    return Err(MintError::submission(batch.index, err));
                }
            };

            self.metrics.record_confirmed(&receipt, batch.range.len(), started.elapsed());
            tracing::info!(
                batch = batch.index,
                records = ?batch.range,
                fee = receipt.fee,
                cost = receipt.cost,
                "Batch confirmed"
            );
            receipts.push(receipt);
        }

        Ok(receipts)
    }

    /// Builds and sends a whole run.
    ///
    /// # Errors
    ///
    /// See [`Self::build`] and [`Self::submit`].
    pub async fn run(
        &mut self,
        records: &[MintRecord],
        targets: &[String],
        cancel: &CancelSignal,
    ) -> Result<Vec<TxReceipt>, MintError> {
        let batches = self.build(records, targets).await?;
        let receipts = self.submit(&batches, cancel).await?;
        tracing::info!(
            batches = self.metrics.batches_confirmed,
            records = self.metrics.records_minted,
            total_fees = self.metrics.total_fees,
            "Mint complete"
        );
        Ok(receipts)
    }
}

impl<N, W, R, A> std::fmt::Debug for MintRunner<N, W, R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintRunner")
            .field("builder", &self.builder)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
