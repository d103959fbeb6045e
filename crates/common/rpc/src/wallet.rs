//! Wallet interface.

use async_trait::async_trait;
use bulkmint_primitives::{Bytes32, Coin, MintRecord, SpendBundle, TransactionRecord};
use serde::{Deserialize, Serialize};

use crate::RpcError;

/// Wallet identifier within the wallet service.
pub type WalletId = u32;

/// An output requested from a signed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addition {
    /// Destination puzzle hash.
    pub puzzle_hash: Bytes32,
    /// Amount to send.
    pub amount: u64,
}

/// Request to mint one batch of tokens from an authority coin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintBatchRequest {
    /// Authority wallet that owns `authority_coin`.
    pub wallet_id: WalletId,
    /// Tokens to mint in this batch.
    pub records: Vec<MintRecord>,
    /// Destination addresses, parallel to `records`; empty to keep tokens in the wallet.
    pub targets: Vec<String>,
    /// Royalty destination. Royalties apply only when both royalty fields are set.
    pub royalty_address: Option<String>,
    /// Royalty share in basis points.
    pub royalty_percentage: Option<u16>,
    /// 1-based series number of the first record.
    pub starting_num: u64,
    /// Total number of tokens in the run.
    pub max_num: u64,
    /// Coin paying for the batch.
    pub funding_coin: Coin,
    /// Where the funding coin's change is sent.
    pub change_puzzle_hash: Bytes32,
    /// Current authority coin.
    pub authority_coin: Coin,
    /// Parent of the authority coin spent in the previous batch, none for the first batch.
    pub authority_lineage_parent: Option<Bytes32>,
}

/// Outcome of a batch mint request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MintBatchResponse {
    /// The wallet built and signed the batch bundle.
    Success {
        /// Signed bundle minting the batch.
        spend_bundle: SpendBundle,
    },
    /// The wallet could not build the batch.
    Failure {
        /// Wallet-reported reason.
        reason: String,
    },
}

/// Wallet RPC surface used by coin selection, batch building and fee attachment.
#[async_trait]
pub trait WalletRpc: Send + Sync {
    /// Selects coins worth at least `amount` from a wallet, skipping `exclude`.
    async fn select_coins(
        &self,
        amount: u64,
        wallet_id: WalletId,
        exclude: &[Coin],
    ) -> Result<Vec<Coin>, RpcError>;

    /// Returns a receive address for the wallet.
    async fn get_next_address(&self, wallet_id: WalletId, new_address: bool) -> Result<String, RpcError>;

    /// Builds and signs a transaction spending `coins` into `additions` plus `fee`.
    async fn create_signed_transaction(
        &self,
        additions: &[Addition],
        coins: &[Coin],
        fee: u64,
    ) -> Result<TransactionRecord, RpcError>;

    /// Builds and signs a bundle minting one batch of tokens.
    async fn mint_batch(&self, request: MintBatchRequest) -> Result<MintBatchResponse, RpcError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_response_is_tagged() {
        let failure = MintBatchResponse::Failure { reason: "no coins".into() };
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(json, r#"{"status":"failure","reason":"no coins"}"#);

        let success: MintBatchResponse = serde_json::from_str(
            r#"{"status":"success","spend_bundle":{"coin_spends":[],"aggregated_signature":"0x"}}"#,
        )
        .unwrap();
        assert_eq!(success, MintBatchResponse::Success { spend_bundle: SpendBundle::default() });
    }
}
