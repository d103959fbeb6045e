//! Address encoding.

use bulkmint_primitives::Bytes32;
use thiserror::Error;

/// Address decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address is not valid for this ledger.
    #[error("Invalid address {address}: {reason}")]
    Invalid {
        /// The offending address.
        address: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Converts between human-readable addresses and puzzle hashes.
pub trait AddressCodec: Send + Sync {
    /// Decodes an address into the puzzle hash it pays to.
    fn decode_address(&self, address: &str) -> Result<Bytes32, AddressError>;

    /// Encodes a puzzle hash as an address.
    fn encode_address(&self, puzzle_hash: Bytes32) -> String;
}
