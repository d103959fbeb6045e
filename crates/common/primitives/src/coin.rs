//! Coin identity and on-chain coin records.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An output in the coin-set ledger.
///
/// A coin is identified entirely by its three fields; its [`name`](Coin::name) is derived
/// from them and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Name of the coin whose spend created this coin.
    pub parent_coin_info: B256,
    /// Hash of the puzzle locking this coin.
    pub puzzle_hash: B256,
    /// Value in the ledger's smallest unit.
    pub amount: u64,
}

impl Coin {
    /// Creates a new coin.
    pub const fn new(parent_coin_info: B256, puzzle_hash: B256, amount: u64) -> Self {
        Self { parent_coin_info, puzzle_hash, amount }
    }

    /// Returns the coin's name: `sha256(parent ‖ puzzle_hash ‖ amount)`.
    ///
    /// The amount is hashed in its minimal big-endian signed form, so `0` contributes no
    /// bytes and values with the high bit set gain a leading zero byte.
    pub fn name(&self) -> B256 {
        let mut hasher = Sha256::new();
        hasher.update(self.parent_coin_info);
        hasher.update(self.puzzle_hash);
        hasher.update(amount_bytes(self.amount));
        B256::from_slice(&hasher.finalize())
    }

    /// Returns true if this coin was created by spending `parent`.
    pub fn is_child_of(&self, parent: &Self) -> bool {
        self.parent_coin_info == parent.name()
    }
}

/// Minimal big-endian two's complement encoding of a non-negative amount.
fn amount_bytes(amount: u64) -> Vec<u8> {
    if amount == 0 {
        return Vec::new();
    }
    let raw = amount.to_be_bytes();
    let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len() - 1);
    let mut out = Vec::with_capacity(raw.len() - start + 1);
    if raw[start] & 0x80 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&raw[start..]);
    out
}

/// Chain-side view of a coin, as returned by the node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// The coin itself.
    pub coin: Coin,
    /// Height at which the coin was created.
    pub confirmed_block_index: u32,
    /// Height at which the coin was spent (0 while unspent).
    pub spent_block_index: u32,
    /// Whether the coin has been spent on chain.
    pub spent: bool,
    /// Whether the coin is a block reward.
    pub coinbase: bool,
    /// Timestamp of the creating block.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, vec![])]
    #[case(1, vec![0x01])]
    #[case(0x7f, vec![0x7f])]
    #[case(0x80, vec![0x00, 0x80])]
    #[case(0xff, vec![0x00, 0xff])]
    #[case(0x0100, vec![0x01, 0x00])]
    #[case(1_000_000_000_000, vec![0x00, 0xe8, 0xd4, 0xa5, 0x10, 0x00])]
    #[case(u64::MAX, vec![0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff])]
    fn amount_encoding(#[case] amount: u64, #[case] expected: Vec<u8>) {
        assert_eq!(amount_bytes(amount), expected);
    }

    #[test]
    fn name_is_sha256_of_fields() {
        let coin = Coin::new(B256::repeat_byte(0x11), B256::repeat_byte(0x22), 0x80);

        let mut hasher = Sha256::new();
        hasher.update([0x11u8; 32]);
        hasher.update([0x22u8; 32]);
        hasher.update([0x00u8, 0x80]);
        let expected = B256::from_slice(&hasher.finalize());

        assert_eq!(coin.name(), expected);
    }

    #[rstest]
    #[case(Coin::new(B256::ZERO, B256::ZERO, 2), "amount differs")]
    #[case(Coin::new(B256::ZERO, B256::repeat_byte(1), 1), "puzzle hash differs")]
    #[case(Coin::new(B256::repeat_byte(1), B256::ZERO, 1), "parent differs")]
    fn name_depends_on_every_field(#[case] other: Coin, #[case] _description: &str) {
        let base = Coin::new(B256::ZERO, B256::ZERO, 1);
        assert_ne!(base.name(), other.name());
    }

    #[test]
    fn child_relationship() {
        let parent = Coin::new(B256::repeat_byte(3), B256::repeat_byte(4), 1);
        let child = Coin::new(parent.name(), parent.puzzle_hash, 1);
        let stranger = Coin::new(B256::repeat_byte(9), parent.puzzle_hash, 1);

        assert!(child.is_child_of(&parent));
        assert!(!stranger.is_child_of(&parent));
    }

    #[test]
    fn coin_serde_uses_hex_hashes() {
        let coin = Coin::new(B256::repeat_byte(0xab), B256::ZERO, 7);
        let json = serde_json::to_string(&coin).unwrap();
        assert!(json.contains("0xabab"));

        let back: Coin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coin);
    }
}
