//! Coin spends and spend bundles.

use std::collections::HashSet;

use alloy_primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Coin, CodecError, codec};

/// A single coin spend: the coin, the revealed puzzle and the solution fed to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSpend {
    /// Coin being spent.
    pub coin: Coin,
    /// Serialized puzzle whose hash must equal the coin's puzzle hash.
    pub puzzle_reveal: Bytes,
    /// Serialized solution.
    pub solution: Bytes,
}

impl CoinSpend {
    /// Creates a new coin spend.
    pub const fn new(coin: Coin, puzzle_reveal: Bytes, solution: Bytes) -> Self {
        Self { coin, puzzle_reveal, solution }
    }
}

/// A set of coin spends submitted atomically, with their aggregated signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendBundle {
    /// Spends in the bundle, in order.
    pub coin_spends: Vec<CoinSpend>,
    /// Aggregated signature over all spends.
    pub aggregated_signature: Bytes,
}

impl SpendBundle {
    /// Creates a new spend bundle.
    pub const fn new(coin_spends: Vec<CoinSpend>, aggregated_signature: Bytes) -> Self {
        Self { coin_spends, aggregated_signature }
    }

    /// Coins consumed by this bundle.
    pub fn removals(&self) -> Vec<Coin> {
        self.coin_spends.iter().map(|spend| spend.coin).collect()
    }

    /// Names of the coins consumed by this bundle.
    pub fn removal_names(&self) -> HashSet<B256> {
        self.coin_spends.iter().map(|spend| spend.coin.name()).collect()
    }

    /// Content-addressed name: `sha256` of the canonical serialization.
    pub fn name(&self) -> B256 {
        B256::from_slice(&Sha256::digest(self.to_bytes()))
    }

    /// Serializes the bundle into its canonical wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode_bundle(self)
    }

    /// Deserializes a bundle from its canonical wire format.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the input is truncated or carries trailing bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        codec::decode_bundle(data)
    }

    /// Combines several bundles into one, keeping spend order.
    ///
    /// Signature aggregation is ledger arithmetic this crate does not perform; the caller
    /// supplies the already-aggregated signature.
    pub fn aggregate<'a>(
        bundles: impl IntoIterator<Item = &'a Self>,
        aggregated_signature: Bytes,
    ) -> Self {
        let coin_spends =
            bundles.into_iter().flat_map(|bundle| bundle.coin_spends.iter().cloned()).collect();
        Self { coin_spends, aggregated_signature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spend(byte: u8, amount: u64) -> CoinSpend {
        CoinSpend::new(
            Coin::new(B256::repeat_byte(byte), B256::repeat_byte(byte + 1), amount),
            Bytes::from(vec![byte; 4]),
            Bytes::from(vec![byte; 2]),
        )
    }

    #[test]
    fn removals_follow_spend_order() {
        let bundle = SpendBundle::new(vec![spend(1, 10), spend(5, 20)], Bytes::new());
        let removals = bundle.removals();
        assert_eq!(removals.len(), 2);
        assert_eq!(removals[0].amount, 10);
        assert_eq!(removals[1].amount, 20);
        assert!(bundle.removal_names().contains(&removals[1].name()));
    }

    #[test]
    fn name_changes_with_content() {
        let a = SpendBundle::new(vec![spend(1, 10)], Bytes::new());
        let b = SpendBundle::new(vec![spend(1, 11)], Bytes::new());
        assert_eq!(a.name(), a.clone().name());
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn aggregate_concatenates_spends() {
        let fee = SpendBundle::new(vec![spend(1, 10)], Bytes::from(vec![1]));
        let batch = SpendBundle::new(vec![spend(3, 1), spend(7, 2)], Bytes::from(vec![2]));

        let combined = SpendBundle::aggregate([&fee, &batch], Bytes::from(vec![3]));

        assert_eq!(combined.coin_spends.len(), 3);
        assert_eq!(combined.coin_spends[0], fee.coin_spends[0]);
        assert_eq!(combined.coin_spends[2], batch.coin_spends[1]);
        assert_eq!(combined.aggregated_signature, Bytes::from(vec![3]));
    }

    #[test]
    fn bytes_roundtrip_preserves_name() {
        let bundle = SpendBundle::new(vec![spend(1, 10), spend(2, 0)], Bytes::from(vec![9; 96]));
        let decoded = SpendBundle::from_bytes(&bundle.to_bytes()).unwrap();
        assert_eq!(decoded, bundle);
        assert_eq!(decoded.name(), bundle.name());
    }
}
