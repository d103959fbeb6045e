//! Audit trail files.

use std::{fs, path::Path};

use bulkmint_primitives::AuditTrail;

use crate::{BuiltBatch, MintError};

/// Atomically writes the serialized bundles of `batches` to `path`, in batch order.
///
/// The trail is written to a sibling temporary file first and renamed into place, so a
/// reader never sees a partial trail.
///
/// # Errors
///
/// Returns [`MintError::Audit`] if the file cannot be written or renamed.
pub fn write_audit_trail(path: &Path, batches: &[BuiltBatch]) -> Result<AuditTrail, MintError> {
    let trail = AuditTrail::new(batches.iter().map(BuiltBatch::to_bytes).collect());

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, trail.to_bytes())
        .map_err(|e| MintError::Audit(format!("write {}: {e}", temp_path.display())))?;
    fs::rename(&temp_path, path)
        .map_err(|e| MintError::Audit(format!("rename to {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), bundles = trail.len(), "Wrote audit trail");
    Ok(trail)
}

/// Reads an audit trail written by [`write_audit_trail`].
///
/// # Errors
///
/// Returns [`MintError::Audit`] if the file cannot be read or is not a valid trail.
pub fn read_audit_trail(path: &Path) -> Result<AuditTrail, MintError> {
    let bytes = fs::read(path)
        .map_err(|e| MintError::Audit(format!("read {}: {e}", path.display())))?;
    AuditTrail::from_bytes(&bytes)
        .map_err(|e| MintError::Audit(format!("parse {}: {e}", path.display())))
}
