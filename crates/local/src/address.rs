//! Hex address codec.

use bulkmint_primitives::{Bytes32, hex};
use bulkmint_rpc::{AddressCodec, AddressError};

/// Encodes a puzzle hash as its `0x`-prefixed hex string.
#[derive(Clone, Copy, Debug, Default)]
pub struct HexAddressCodec;

impl AddressCodec for HexAddressCodec {
    fn decode_address(&self, address: &str) -> Result<Bytes32, AddressError> {
        let invalid = |reason: String| AddressError::Invalid { address: address.to_string(), reason };

        let digits = address.strip_prefix("0x").ok_or_else(|| invalid("missing 0x prefix".into()))?;
        let bytes = hex::decode(digits).map_err(|e| invalid(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(invalid(format!("expected 32 bytes, got {}", bytes.len())));
        }
        Ok(Bytes32::from_slice(&bytes))
    }

    fn encode_address(&self, puzzle_hash: Bytes32) -> String {
        format!("0x{}", hex::encode(puzzle_hash))
    }
}
