//! Full node interface.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bulkmint_primitives::{BlockchainState, Bytes32, CoinRecord, PoolItem, SpendBundle};
use serde::{Deserialize, Serialize};

use crate::RpcError;

/// Outcome of a bundle submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTxResponse {
    /// Whether the node accepted the bundle into its pool.
    pub success: bool,
    /// Node-reported reason when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
}

impl PushTxResponse {
    /// An accepted submission.
    pub const fn accepted() -> Self {
        Self { success: true, error: None }
    }

    /// A rejected submission with the node's reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self { success: false, error: Some(reason.into()) }
    }
}

/// Full node RPC surface used by the submission pipeline.
///
/// Pool items are keyed by their transaction id. The map is ordered so that every
/// enumeration of the same snapshot visits items in the same order.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// Returns every item currently in the transaction pool.
    async fn get_all_mempool_items(&self) -> Result<BTreeMap<Bytes32, PoolItem>, RpcError>;

    /// Returns the pool item with the given transaction id, if still pooled.
    async fn get_mempool_item_by_tx_id(&self, tx_id: Bytes32) -> Result<Option<PoolItem>, RpcError>;

    /// Submits a bundle to the pool.
    async fn push_tx(&self, bundle: &SpendBundle) -> Result<PushTxResponse, RpcError>;

    /// Returns current block and pool capacity figures.
    async fn get_blockchain_state(&self) -> Result<BlockchainState, RpcError>;

    /// Returns the chain record for a coin, if the node knows it.
    async fn get_coin_record_by_name(&self, name: Bytes32) -> Result<Option<CoinRecord>, RpcError>;
}
