//! Canonical spend bundle wire format.
//!
//! All integers big-endian:
//!
//! ```text
//! bundle    := u32 spend_count, spend*, blob signature
//! spend     := [u8; 32] parent, [u8; 32] puzzle_hash, u64 amount, blob puzzle, blob solution
//! blob      := u32 len, [u8; len]
//! ```

use alloy_primitives::{B256, Bytes};

use crate::{Coin, CoinSpend, SpendBundle};

/// Size of an encoded coin in bytes.
const COIN_SIZE: usize = 32 + 32 + 8;

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Truncated data at offset.
    #[error("Truncated data at offset {0}")]
    Truncated(usize),
    /// Unconsumed bytes after the bundle.
    #[error("Trailing bytes after bundle: {0}")]
    TrailingBytes(usize),
    /// Audit trail does not start with the expected magic.
    #[error("Not an audit trail")]
    BadMagic,
    /// Audit trail written by an unknown format version.
    #[error("Unsupported audit trail version {0}")]
    UnsupportedVersion(u16),
}

pub(crate) fn encode_bundle(bundle: &SpendBundle) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(bundle));
    out.extend_from_slice(&(bundle.coin_spends.len() as u32).to_be_bytes());
    for spend in &bundle.coin_spends {
        out.extend_from_slice(spend.coin.parent_coin_info.as_slice());
        out.extend_from_slice(spend.coin.puzzle_hash.as_slice());
        out.extend_from_slice(&spend.coin.amount.to_be_bytes());
        put_blob(&mut out, &spend.puzzle_reveal);
        put_blob(&mut out, &spend.solution);
    }
    put_blob(&mut out, &bundle.aggregated_signature);
    out
}

pub(crate) fn decode_bundle(data: &[u8]) -> Result<SpendBundle, CodecError> {
    let mut reader = Reader::new(data);
    let count = reader.u32()? as usize;

    // Every spend needs at least a coin and two length prefixes.
    let min_spend = COIN_SIZE + 8;
    if count.saturating_mul(min_spend) > data.len() {
        return Err(CodecError::Truncated(reader.offset()));
    }

    let mut coin_spends = Vec::with_capacity(count);
    for _ in 0..count {
        let parent = reader.hash()?;
        let puzzle_hash = reader.hash()?;
        let amount = reader.u64()?;
        let puzzle_reveal = reader.blob()?;
        let solution = reader.blob()?;
        coin_spends.push(CoinSpend::new(Coin::new(parent, puzzle_hash, amount), puzzle_reveal, solution));
    }
    let aggregated_signature = reader.blob()?;

    let remaining = reader.remaining();
    if remaining != 0 {
        return Err(CodecError::TrailingBytes(remaining));
    }
    Ok(SpendBundle { coin_spends, aggregated_signature })
}

fn encoded_len(bundle: &SpendBundle) -> usize {
    let spends: usize = bundle
        .coin_spends
        .iter()
        .map(|s| COIN_SIZE + 8 + s.puzzle_reveal.len() + s.solution.len())
        .sum();
    4 + spends + 4 + bundle.aggregated_signature.len()
}

pub(crate) fn put_blob(out: &mut Vec<u8>, blob: &[u8]) {
    out.extend_from_slice(&(blob.len() as u32).to_be_bytes());
    out.extend_from_slice(blob);
}

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub(crate) const fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self.offset.checked_add(len).ok_or(CodecError::Truncated(self.offset))?;
        let slice = self.data.get(self.offset..end).ok_or(CodecError::Truncated(self.offset))?;
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn u16(&mut self) -> Result<u16, CodecError> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2)?);
        Ok(u16::from_be_bytes(buf))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CodecError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, CodecError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    pub(crate) fn hash(&mut self) -> Result<B256, CodecError> {
        Ok(B256::from_slice(self.take(32)?))
    }

    pub(crate) fn blob(&mut self) -> Result<Bytes, CodecError> {
        let len = self.u32()? as usize;
        Ok(Bytes::copy_from_slice(self.take(len)?))
    }
}
