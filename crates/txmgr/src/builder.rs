//! Fee transaction construction and aggregation.

use std::{collections::HashSet, sync::Arc};

use bulkmint_primitives::{Bytes32, Coin, SpendBundle, TransactionRecord};
use bulkmint_rpc::{AddressCodec, Addition, RpcError, SpendRuntime, WalletId, WalletRpc};

use crate::error::TxError;

/// Pays for a batch bundle by aggregating a signed fee transaction into it.
pub struct FeeAttacher<W, R, A> {
    /// Wallet service selecting and signing the fee coins.
    wallet: Arc<W>,
    /// Runtime aggregating signatures.
    runtime: Arc<R>,
    /// Codec for the wallet's change address.
    codec: Arc<A>,
    /// Wallet the fee is paid from.
    wallet_id: WalletId,
}

impl<W, R, A> FeeAttacher<W, R, A> {
    /// Creates a new fee attacher.
    ///
    /// # Arguments
    ///
    /// * `wallet` - Wallet service selecting and signing fee coins
    /// * `runtime` - Runtime used for signature aggregation
    /// * `codec` - Codec decoding the wallet's change address
    /// * `wallet_id` - Wallet the fee is paid from
    pub const fn new(wallet: Arc<W>, runtime: Arc<R>, codec: Arc<A>, wallet_id: WalletId) -> Self {
        Self { wallet, runtime, codec, wallet_id }
    }
}

impl<W, R, A> FeeAttacher<W, R, A>
where
    W: WalletRpc,
    R: SpendRuntime,
    A: AddressCodec,
{
    /// Attaches `fee` to `batch`.
    ///
    /// Fee coins are selected from the fee wallet excluding every coin the batch spends. The
    /// returned record is renamed to the aggregate of the fee bundle and the batch bundle, fee
    /// spends first. A zero fee wraps the batch bundle alone.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::FeeCoinConflict`] if the wallet hands back a coin the batch already
    /// spends, [`TxError::MissingFeeBundle`] if the signed fee transaction carries no bundle,
    /// and RPC, address or runtime errors from the collaborators.
    pub async fn attach(&self, batch: &SpendBundle, fee: u64) -> Result<TransactionRecord, TxError> {
        if fee == 0 {
            return Ok(TransactionRecord {
                name: batch.name(),
                spend_bundle: Some(batch.clone()),
                fee_amount: 0,
                additions: Vec::new(),
                removals: batch.removals(),
            });
        }

        let removals = batch.removals();
        let coins = self.wallet.select_coins(fee, self.wallet_id, &removals).await?;
        ensure_disjoint(&coins, &batch.removal_names())?;

        let selected = coins.iter().fold(0u64, |total, coin| total.saturating_add(coin.amount));
        if selected < fee {
            return Err(RpcError::InvalidResponse(format!(
                "selected {selected} for a fee of {fee}"
            ))
            .into());
        }

        let mut additions = Vec::new();
        let change = selected - fee;
        if change > 0 {
            let address = self.wallet.get_next_address(self.wallet_id, false).await?;
            let puzzle_hash = self.codec.decode_address(&address)?;
            additions.push(Addition { puzzle_hash, amount: change });
        }

        let record = self.wallet.create_signed_transaction(&additions, &coins, fee).await?;
        let fee_bundle =
            record.spend_bundle.as_ref().ok_or(TxError::MissingFeeBundle(record.name))?;

        let signature = self.runtime.aggregate_signatures(&[
            fee_bundle.aggregated_signature.clone(),
            batch.aggregated_signature.clone(),
        ])?;
        let aggregate = SpendBundle::aggregate([fee_bundle, batch], signature);

        tracing::debug!(
            fee,
            fee_coins = coins.len(),
            change,
            fee_tx = %record.name,
            aggregate = %aggregate.name(),
            "Attached fee"
        );
        Ok(record.with_bundle(aggregate))
    }
}

impl<W, R, A> std::fmt::Debug for FeeAttacher<W, R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeAttacher").field("wallet_id", &self.wallet_id).finish_non_exhaustive()
    }
}

fn ensure_disjoint(coins: &[Coin], removals: &HashSet<Bytes32>) -> Result<(), TxError> {
    match coins.iter().map(Coin::name).find(|name| removals.contains(name)) {
        Some(coin) => Err(TxError::FeeCoinConflict { coin }),
        None => Ok(()),
    }
}
