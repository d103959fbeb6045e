//! Token metadata for a single mint.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Metadata for one token in a bulk mint.
///
/// Records are immutable once loaded; the series fields are carried as given and not
/// cross-checked against the position of the record in the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRecord {
    /// Hash of the token's data.
    pub hash: B256,
    /// Locations of the token's data.
    #[serde(default)]
    pub uris: Vec<String>,
    /// Hash of the token's metadata document.
    pub meta_hash: B256,
    /// Locations of the metadata document.
    #[serde(default)]
    pub meta_uris: Vec<String>,
    /// Hash of the license document.
    pub license_hash: B256,
    /// Locations of the license document.
    #[serde(default)]
    pub license_uris: Vec<String>,
    /// Position of this token in its series (1-based).
    pub series_number: u64,
    /// Size of the series.
    pub series_total: u64,
}
