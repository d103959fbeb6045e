//! Bundle submission.

use std::sync::Arc;

use bulkmint_primitives::SpendBundle;
use bulkmint_rpc::NodeRpc;

use crate::error::{Rejection, TxError};

/// Pushes bundles to the node's transaction pool.
pub struct TxSubmitter<N> {
    /// Node accepting submissions.
    node: Arc<N>,
}

impl<N> TxSubmitter<N> {
    /// Creates a new submitter.
    pub const fn new(node: Arc<N>) -> Self {
        Self { node }
    }
}

impl<N: NodeRpc> TxSubmitter<N> {
    /// Publishes a bundle.
    ///
    /// Submission is attempted once. A rejection is never retried here since the same bundle
    /// would be rejected again.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::SubmissionRejected`] with the classified node reason when the node
    /// refuses the bundle, or [`TxError::Rpc`] when the call itself fails.
    pub async fn publish(&self, bundle: &SpendBundle) -> Result<(), TxError> {
        let response = self.node.push_tx(bundle).await?;
        if response.success {
            tracing::info!(bundle = %bundle.name(), spends = bundle.coin_spends.len(), "Bundle accepted");
            return Ok(());
        }

        let reason = response.error.unwrap_or_else(|| "no reason given".to_string());
        tracing::warn!(bundle = %bundle.name(), %reason, "Bundle rejected");
        Err(TxError::SubmissionRejected(Rejection::from_node_error(&reason)))
    }
}

impl<N> std::fmt::Debug for TxSubmitter<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSubmitter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Mutex};

    use async_trait::async_trait;
    use bulkmint_primitives::{BlockchainState, Bytes32, CoinRecord, PoolItem};
    use bulkmint_rpc::{PushTxResponse, RpcError};
    use rstest::rstest;

    use super::*;

    struct ScriptedNode {
        response: Result<PushTxResponse, RpcError>,
        pushed: Mutex<Vec<Bytes32>>,
    }

    #[async_trait]
    impl NodeRpc for ScriptedNode {
        async fn get_all_mempool_items(&self) -> Result<BTreeMap<Bytes32, PoolItem>, RpcError> {
            Ok(BTreeMap::new())
        }

        async fn get_mempool_item_by_tx_id(&self, _: Bytes32) -> Result<Option<PoolItem>, RpcError> {
            Ok(None)
        }

        async fn push_tx(&self, bundle: &SpendBundle) -> Result<PushTxResponse, RpcError> {
            self.pushed.lock().unwrap().push(bundle.name());
            self.response.clone()
        }

        async fn get_blockchain_state(&self) -> Result<BlockchainState, RpcError> {
            Ok(BlockchainState::default())
        }

        async fn get_coin_record_by_name(&self, _: Bytes32) -> Result<Option<CoinRecord>, RpcError> {
            Ok(None)
        }
    }

    fn submitter(response: Result<PushTxResponse, RpcError>) -> TxSubmitter<ScriptedNode> {
        TxSubmitter::new(Arc::new(ScriptedNode { response, pushed: Mutex::new(Vec::new()) }))
    }

    #[tokio::test]
    async fn accepted_bundle_is_pushed_once() {
        let submitter = submitter(Ok(PushTxResponse::accepted()));
        let bundle = SpendBundle::default();

        submitter.publish(&bundle).await.unwrap();

        assert_eq!(*submitter.node.pushed.lock().unwrap(), vec![bundle.name()]);
    }

    #[rstest]
    #[case(PushTxResponse::rejected("DOUBLE_SPEND"), Rejection::DoubleSpend)]
    #[case(PushTxResponse::rejected("INVALID_FEE_LOW_FEE"), Rejection::FeeTooLow)]
    #[case(PushTxResponse::rejected("ASSERT_HEIGHT"), Rejection::Other("ASSERT_HEIGHT".into()))]
    #[case(PushTxResponse { success: false, error: None }, Rejection::Other("no reason given".into()))]
    #[tokio::test]
    async fn rejection_is_classified(#[case] response: PushTxResponse, #[case] expected: Rejection) {
        let submitter = submitter(Ok(response));

        let err = submitter.publish(&SpendBundle::default()).await.unwrap_err();

        assert_eq!(err, TxError::SubmissionRejected(expected));
        assert_eq!(submitter.node.pushed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_an_rpc_error() {
        let submitter = submitter(Err(RpcError::Connection("refused".into())));
        let err = submitter.publish(&SpendBundle::default()).await.unwrap_err();
        assert_eq!(err, TxError::Rpc(RpcError::Connection("refused".into())));
    }
}
