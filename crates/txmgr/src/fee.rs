//! Pool-driven fee estimation.

use std::{collections::BTreeMap, sync::Arc};

use bulkmint_primitives::{BlockchainState, Bytes32, PoolItem};
use bulkmint_rpc::NodeRpc;

use crate::{config::TxManagerConfig, error::TxError};

/// Where a fee came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeSource {
    /// Fixed rate from configuration; the pool was not read.
    Override,
    /// The block has room for the bundle.
    FreeCapacity,
    /// The pool has items but nothing to price against.
    EmptyPool,
    /// Priced against the cheapest pool items.
    Congested,
}

/// A fee and how it was derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeQuote {
    /// Fee to attach.
    pub fee: u64,
    /// Fee per cost unit the fee was derived from, if any.
    pub rate: Option<u64>,
    /// Derivation branch.
    pub source: FeeSource,
}

/// Estimates the fee a bundle needs to displace the cheapest pool items.
///
/// When the block has room for the bundle on top of the pool, the minimum fee is enough.
/// Otherwise pool items are walked cheapest-first until their combined cost covers the bundle,
/// and the bundle pays one unit more than those items did, spread over the same cost.
pub struct FeeEstimator<N> {
    node: Arc<N>,
    config: TxManagerConfig,
}

impl<N> FeeEstimator<N> {
    /// Creates a new fee estimator.
    pub const fn new(node: Arc<N>, config: TxManagerConfig) -> Self {
        Self { node, config }
    }
}

impl<N: NodeRpc> FeeEstimator<N> {
    /// Estimates the fee for a bundle of the given cost.
    ///
    /// # Arguments
    ///
    /// * `bundle_cost` - Execution cost of the bundle the fee is attached to
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Rpc`] if the pool or chain state cannot be read, and
    /// [`TxError::PoolDivision`] if a congested pool holds only zero-cost items.
    pub async fn estimate(&self, bundle_cost: u64) -> Result<FeeQuote, TxError> {
        if let Some(rate) = self.config.fee_per_cost {
            let quote = FeeQuote {
                fee: bundle_cost.saturating_mul(rate),
                rate: Some(rate),
                source: FeeSource::Override,
            };
            tracing::debug!(bundle_cost, rate, fee = quote.fee, "Using fixed fee rate");
            return Ok(quote);
        }

        let state = self.node.get_blockchain_state().await?;
        tracing::debug!(
            bundle_cost,
            mempool_cost = state.mempool_cost,
            mempool_max_total_cost = state.mempool_max_total_cost,
            block_max_cost = state.block_max_cost,
            "Read chain capacity"
        );
        if state.fits_in_block(bundle_cost) {
            return Ok(FeeQuote {
                fee: self.config.min_fee,
                rate: None,
                source: FeeSource::FreeCapacity,
            });
        }

        let items = self.node.get_all_mempool_items().await?;
        let quote = estimate_from_pool(bundle_cost, &state, &items, self.config.min_fee)?;
        tracing::info!(
            bundle_cost,
            pool_items = items.len(),
            fee = quote.fee,
            rate = ?quote.rate,
            "Estimated fee from pool"
        );
        Ok(quote)
    }
}

impl<N> std::fmt::Debug for FeeEstimator<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeEstimator").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Prices a bundle against a pool snapshot. Pure; [`FeeEstimator::estimate`] does the I/O.
///
/// Zero-cost items carry no rate and are skipped. Items are ordered by floor fee per cost,
/// ties kept in map order. The rate is the largest `floor((fee_sum + 1) / cost_sum)` seen over
/// the walked prefixes, so a bigger bundle never pays a lower rate than a smaller one.
///
/// # Errors
///
/// Returns [`TxError::PoolDivision`] when a non-empty pool yields no cost to divide by.
pub fn estimate_from_pool(
    bundle_cost: u64,
    state: &BlockchainState,
    items: &BTreeMap<Bytes32, PoolItem>,
    min_fee: u64,
) -> Result<FeeQuote, TxError> {
    if state.fits_in_block(bundle_cost) {
        return Ok(FeeQuote { fee: min_fee, rate: None, source: FeeSource::FreeCapacity });
    }
    if items.is_empty() {
        return Ok(FeeQuote { fee: min_fee, rate: None, source: FeeSource::EmptyPool });
    }

    let mut ranked: Vec<(u64, &PoolItem)> =
        items.values().filter_map(|item| item.fee_per_cost().map(|rate| (rate, item))).collect();
    ranked.sort_by_key(|(rate, _)| *rate);

    let mut cost_sum = 0u64;
    let mut fee_sum = 0u64;
    let mut rate = 0u64;
    for (_, item) in &ranked {
        cost_sum = cost_sum.saturating_add(item.cost);
        fee_sum = fee_sum.saturating_add(item.fee);
        rate = rate.max(fee_sum.saturating_add(1) / cost_sum);
        if cost_sum >= bundle_cost {
            break;
        }
    }

    if cost_sum == 0 {
        return Err(TxError::PoolDivision { items: items.len() });
    }

    let fee = bundle_cost.saturating_mul(rate).max(min_fee);
    Ok(FeeQuote { fee, rate: Some(rate), source: FeeSource::Congested })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bulkmint_primitives::{CoinRecord, SpendBundle};
    use bulkmint_rpc::{PushTxResponse, RpcError};
    use rstest::rstest;

    use super::*;

    /// Block already full: nothing fits.
    const FULL: BlockchainState =
        BlockchainState { block_max_cost: 100, mempool_max_total_cost: 1_000, mempool_cost: 100 };

    fn pool(items: &[(u64, u64)]) -> BTreeMap<Bytes32, PoolItem> {
        items
            .iter()
            .enumerate()
            .map(|(i, (cost, fee))| {
                let id = Bytes32::with_last_byte(i as u8);
                (id, PoolItem { spend_bundle_name: id, cost: *cost, fee: *fee })
            })
            .collect()
    }

    #[rstest]
    #[case(&[], "empty pool")]
    #[case(&[(10, 1_000)], "expensive pool")]
    #[case(&[(0, 0)], "zero-cost items")]
    fn free_capacity_returns_min_fee(#[case] items: &[(u64, u64)], #[case] _description: &str) {
        let state =
            BlockchainState { block_max_cost: 1_000, mempool_max_total_cost: 1_000, mempool_cost: 10 };
        let quote = estimate_from_pool(500, &state, &pool(items), 1).unwrap();
        assert_eq!(quote, FeeQuote { fee: 1, rate: None, source: FeeSource::FreeCapacity });
    }

    #[test]
    fn boundary_cost_counts_as_free() {
        let state =
            BlockchainState { block_max_cost: 1_000, mempool_max_total_cost: 1_000, mempool_cost: 400 };
        let quote = estimate_from_pool(600, &state, &pool(&[(10, 10)]), 1).unwrap();
        assert_eq!(quote.source, FeeSource::FreeCapacity);
        let quote = estimate_from_pool(601, &state, &pool(&[(10, 10)]), 1).unwrap();
        assert_eq!(quote.source, FeeSource::Congested);
    }

    #[test]
    fn empty_congested_pool_returns_min_fee() {
        let quote = estimate_from_pool(50, &FULL, &BTreeMap::new(), 1).unwrap();
        assert_eq!(quote, FeeQuote { fee: 1, rate: None, source: FeeSource::EmptyPool });
    }

    #[test]
    fn only_zero_cost_items_is_a_division_error() {
        let err = estimate_from_pool(50, &FULL, &pool(&[(0, 5), (0, 9)]), 1).unwrap_err();
        assert_eq!(err, TxError::PoolDivision { items: 2 });
    }

    #[rstest]
    // one item covers the bundle: floor((100 + 1) / 10) = 10 per cost
    #[case(&[(10, 100)], 5, 10, 50)]
    // cheapest first: (10, 20) then (10, 100) -> floor(121 / 20) = 6
    #[case(&[(10, 100), (10, 20)], 15, 6, 90)]
    // bundle bigger than the whole pool uses every item
    #[case(&[(10, 30)], 1_000, 3, 3_000)]
    // zero-cost items are ignored
    #[case(&[(0, 999), (4, 8)], 4, 2, 8)]
    fn congested_rate(
        #[case] items: &[(u64, u64)],
        #[case] bundle_cost: u64,
        #[case] rate: u64,
        #[case] fee: u64,
    ) {
        let quote = estimate_from_pool(bundle_cost, &FULL, &pool(items), 1).unwrap();
        assert_eq!(quote.source, FeeSource::Congested);
        assert_eq!(quote.rate, Some(rate));
        assert_eq!(quote.fee, fee);
    }

    #[test]
    fn congested_fee_never_drops_below_min_fee() {
        // floor((0 + 1) / 100) = 0
        let quote = estimate_from_pool(10, &FULL, &pool(&[(100, 0)]), 3).unwrap();
        assert_eq!(quote.rate, Some(0));
        assert_eq!(quote.fee, 3);
    }

    #[test]
    fn congested_fee_is_non_decreasing_in_bundle_cost() {
        let items = pool(&[(1, 0), (1, 0), (5, 40), (3, 3), (7, 100), (2, 1)]);
        let mut last = 0;
        for bundle_cost in 1..60 {
            let fee = estimate_from_pool(bundle_cost, &FULL, &items, 1).unwrap().fee;
            assert!(fee >= last, "fee dropped at cost {bundle_cost}: {fee} < {last}");
            last = fee;
        }
    }

    #[test]
    fn equal_rates_keep_map_order() {
        // Both rate 1; map order decides which is walked first.
        let items = pool(&[(10, 10), (20, 39)]);
        let quote = estimate_from_pool(10, &FULL, &items, 1).unwrap();
        assert_eq!(quote.rate, Some(1)); // floor(11 / 10)
    }

    /// Node returning fixed state and counting pool reads.
    struct FixedNode {
        state: BlockchainState,
        items: BTreeMap<Bytes32, PoolItem>,
        pool_reads: AtomicUsize,
        state_reads: AtomicUsize,
    }

    impl FixedNode {
        fn new(state: BlockchainState, items: BTreeMap<Bytes32, PoolItem>) -> Self {
            Self { state, items, pool_reads: AtomicUsize::new(0), state_reads: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl NodeRpc for FixedNode {
        async fn get_all_mempool_items(&self) -> Result<BTreeMap<Bytes32, PoolItem>, RpcError> {
            self.pool_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.clone())
        }

        async fn get_mempool_item_by_tx_id(&self, _: Bytes32) -> Result<Option<PoolItem>, RpcError> {
            Ok(None)
        }

        async fn push_tx(&self, _: &SpendBundle) -> Result<PushTxResponse, RpcError> {
            Ok(PushTxResponse::accepted())
        }

        async fn get_blockchain_state(&self) -> Result<BlockchainState, RpcError> {
            self.state_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.state)
        }

        async fn get_coin_record_by_name(&self, _: Bytes32) -> Result<Option<CoinRecord>, RpcError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn override_skips_the_pool() {
        let node = Arc::new(FixedNode::new(FULL, pool(&[(10, 1_000)])));
        let config = TxManagerConfig::builder().fee_per_cost(Some(5)).build();
        let estimator = FeeEstimator::new(Arc::clone(&node), config);

        let quote = estimator.estimate(1_000).await.unwrap();

        assert_eq!(quote, FeeQuote { fee: 5_000, rate: Some(5), source: FeeSource::Override });
        assert_eq!(node.pool_reads.load(Ordering::SeqCst), 0);
        assert_eq!(node.state_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn free_capacity_does_not_read_the_pool() {
        let state =
            BlockchainState { block_max_cost: 1_000, mempool_max_total_cost: 1_000, mempool_cost: 0 };
        let node = Arc::new(FixedNode::new(state, pool(&[(10, 1_000)])));
        let estimator = FeeEstimator::new(Arc::clone(&node), TxManagerConfig::default());

        let quote = estimator.estimate(10).await.unwrap();

        assert_eq!(quote.fee, 1);
        assert_eq!(node.pool_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn congested_node_prices_from_pool() {
        let node = Arc::new(FixedNode::new(FULL, pool(&[(10, 100)])));
        let estimator = FeeEstimator::new(Arc::clone(&node), TxManagerConfig::default());

        let quote = estimator.estimate(5).await.unwrap();

        assert_eq!(quote.fee, 50);
        assert_eq!(node.pool_reads.load(Ordering::SeqCst), 1);
    }
}
