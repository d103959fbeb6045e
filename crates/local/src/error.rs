//! Local error types.

/// Errors from loading local input files.
#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV parse error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A CSV row that does not describe a record.
    #[error("Invalid record on line {line}: {reason}")]
    InvalidRecord {
        /// Line of the row in the file.
        line: u64,
        /// What is wrong with it.
        reason: String,
    },
    /// File not found.
    #[error("File not found: {0}")]
    NotFound(String),
    /// Some records carry a target and some do not.
    #[error("{with_target} of {records} records have a target; give all or none")]
    PartialTargets {
        /// Records with a target.
        with_target: usize,
        /// Total records.
        records: usize,
    },
}
