//! Audit trail format for a run's serialized bundles.
//!
//! ```text
//! trail  := [u8; 4] magic "BMNT", u16 version, u32 count, blob*
//! blob   := u32 len, [u8; len]
//! ```
//!
//! Each blob is one canonically serialized bundle. Order matters: blob `k` is batch `k`.

use crate::{
    CodecError, SpendBundle,
    codec::{Reader, put_blob},
};

/// Leading bytes of every audit trail.
pub const AUDIT_MAGIC: [u8; 4] = *b"BMNT";

/// Current audit trail format version.
pub const AUDIT_VERSION: u16 = 1;

/// Ordered list of serialized batch bundles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditTrail {
    bundles: Vec<Vec<u8>>,
}

impl AuditTrail {
    /// Creates a trail from serialized bundles, keeping their order.
    pub const fn new(bundles: Vec<Vec<u8>>) -> Self {
        Self { bundles }
    }

    /// Appends a serialized bundle.
    pub fn push(&mut self, bundle: Vec<u8>) {
        self.bundles.push(bundle);
    }

    /// Serialized bundles in batch order.
    pub fn bundles(&self) -> &[Vec<u8>] {
        &self.bundles
    }

    /// Number of bundles.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Returns true if the trail holds no bundles.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Decodes every bundle in the trail.
    ///
    /// # Errors
    ///
    /// Returns the first [`CodecError`] hit while decoding a bundle.
    pub fn decode_bundles(&self) -> Result<Vec<SpendBundle>, CodecError> {
        self.bundles.iter().map(|bytes| SpendBundle::from_bytes(bytes)).collect()
    }

    /// Serializes the trail.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body: usize = self.bundles.iter().map(|b| 4 + b.len()).sum();
        let mut out = Vec::with_capacity(AUDIT_MAGIC.len() + 2 + 4 + body);
        out.extend_from_slice(&AUDIT_MAGIC);
        out.extend_from_slice(&AUDIT_VERSION.to_be_bytes());
        out.extend_from_slice(&(self.bundles.len() as u32).to_be_bytes());
        for bundle in &self.bundles {
            put_blob(&mut out, bundle);
        }
        out
    }

    /// Parses a serialized trail.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BadMagic`] or [`CodecError::UnsupportedVersion`] for a foreign
    /// header, and the usual truncation errors otherwise.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(data);
        if reader.take(AUDIT_MAGIC.len()).map_err(|_| CodecError::BadMagic)? != AUDIT_MAGIC {
            return Err(CodecError::BadMagic);
        }
        let version = reader.u16()?;
        if version != AUDIT_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let count = reader.u32()? as usize;
        if count.saturating_mul(4) > reader.remaining() {
            return Err(CodecError::Truncated(reader.offset()));
        }
        let mut bundles = Vec::with_capacity(count);
        for _ in 0..count {
            bundles.push(reader.blob()?.to_vec());
        }

        match reader.remaining() {
            0 => Ok(Self { bundles }),
            extra => Err(CodecError::TrailingBytes(extra)),
        }
    }
}

impl From<Vec<Vec<u8>>> for AuditTrail {
    fn from(bundles: Vec<Vec<u8>>) -> Self {
        Self::new(bundles)
    }
}
