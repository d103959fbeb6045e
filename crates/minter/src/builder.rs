//! Batch bundle construction.

use std::{ops::Range, sync::Arc};

use bulkmint_primitives::{MintRecord, SpendBundle};
use bulkmint_rpc::{
    AddressCodec, BundleRuntimeExt, MintBatchRequest, MintBatchResponse, SpendRuntime, WalletRpc,
};

use crate::{CoinSelector, LineageState, MintError, MinterConfig};

/// Splits `total` records into consecutive ranges of at most `chunk_size`. A zero
/// `chunk_size` yields no ranges.
pub fn chunk_ranges(total: usize, chunk_size: usize) -> Vec<Range<usize>> {
    if chunk_size == 0 {
        return Vec::new();
    }
    (0..total).step_by(chunk_size).map(|start| start..(start + chunk_size).min(total)).collect()
}

/// A batch bundle ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltBatch {
    /// Batch index, 0-based.
    pub index: usize,
    /// Records minted by the batch.
    pub range: Range<usize>,
    /// The signed batch bundle, without a fee.
    pub bundle: SpendBundle,
}

impl BuiltBatch {
    /// Canonical serialization of the bundle.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bundle.to_bytes()
    }
}

/// Builds every batch bundle of a run up front.
///
/// Each batch spends the funding change and authority successor created by the batch before
/// it, so bundles are only valid when submitted in order.
pub struct BatchBuilder<W, R, A> {
    wallet: Arc<W>,
    runtime: Arc<R>,
    codec: Arc<A>,
    config: MinterConfig,
}

impl<W, R, A> BatchBuilder<W, R, A> {
    /// Creates a new batch builder.
    pub const fn new(wallet: Arc<W>, runtime: Arc<R>, codec: Arc<A>, config: MinterConfig) -> Self {
        Self { wallet, runtime, codec, config }
    }

    /// Returns the builder configuration.
    pub const fn config(&self) -> &MinterConfig {
        &self.config
    }
}

impl<W, R, A> BatchBuilder<W, R, A>
where
    W: WalletRpc,
    R: SpendRuntime,
    A: AddressCodec,
{
    /// Builds one bundle per chunk of `records`.
    ///
    /// `targets` is either empty or parallel to `records`. No coins are selected when
    /// `records` is empty.
    ///
    /// # Errors
    ///
    /// Input validation errors, selection errors, and per-batch
    /// [`MintError::BundleConstruction`] or [`MintError::LineageBreak`] naming the record
    /// range at fault. Nothing built before the failure is returned.
    pub async fn build(
        &self,
        records: &[MintRecord],
        targets: &[String],
    ) -> Result<Vec<BuiltBatch>, MintError> {
        if records.is_empty() {
            tracing::info!("No records to mint");
            return Ok(Vec::new());
        }
        self.validate(records, targets)?;

        let total = records.len();
        let selector = CoinSelector::new(Arc::clone(&self.wallet));
        let funding = selector.select_funding(total as u64, self.config.funding_wallet_id).await?;
        let authority = selector.select_authority(self.config.authority_wallet_id).await?;
        let royalty = self.config.royalty();

        let mut lineage = LineageState::genesis(funding, authority);
        let ranges = chunk_ranges(total, self.config.chunk_size);
        let mut batches = Vec::with_capacity(ranges.len());

        for (index, range) in ranges.into_iter().enumerate() {
            let request = MintBatchRequest {
                wallet_id: self.config.authority_wallet_id,
                records: records[range.clone()].to_vec(),
                targets: if targets.is_empty() { Vec::new() } else { targets[range.clone()].to_vec() },
                royalty_address: royalty.map(|(address, _)| address.to_string()),
                royalty_percentage: royalty.map(|(_, percentage)| percentage),
                starting_num: range.start as u64 + 1,
                max_num: total as u64,
                funding_coin: lineage.funding_coin,
                change_puzzle_hash: lineage.funding_coin.puzzle_hash,
                authority_coin: lineage.authority_coin,
                authority_lineage_parent: lineage.authority_lineage_parent,
            };

            let bundle = match self.wallet.mint_batch(request).await {
                Ok(MintBatchResponse::Success { spend_bundle }) => spend_bundle,
                Ok(MintBatchResponse::Failure { reason }) => {
                    return Err(MintError::BundleConstruction { range, reason });
                }
                Err(err) => {
                    return Err(MintError::BundleConstruction { range, reason: err.to_string() });
                }
            };

            let additions = self.runtime.bundle_additions(&bundle)?;
            lineage = lineage
                .advance(funding.puzzle_hash, &bundle.removals(), &additions)
                .map_err(|cause| MintError::LineageBreak { range: range.clone(), cause })?;

            tracing::info!(
                batch = index,
                records = ?range,
                bundle = %bundle.name(),
                spends = bundle.coin_spends.len(),
                "Built batch bundle"
            );
            batches.push(BuiltBatch { index, range, bundle });
        }

        Ok(batches)
    }

    fn validate(&self, records: &[MintRecord], targets: &[String]) -> Result<(), MintError> {
        if self.config.chunk_size == 0 {
            return Err(MintError::InvalidConfig("chunk size must be positive".into()));
        }
        if !targets.is_empty() && targets.len() != records.len() {
            return Err(MintError::TargetCountMismatch {
                records: records.len(),
                targets: targets.len(),
            });
        }
        for target in targets {
            self.codec.decode_address(target)?;
        }
        if let Some((address, _)) = self.config.royalty() {
            self.codec.decode_address(address)?;
        }
        Ok(())
    }
}

impl<W, R, A> std::fmt::Debug for BatchBuilder<W, R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}
