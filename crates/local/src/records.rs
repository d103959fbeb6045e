//! Mint records loaded from JSON or CSV.
//!
//! A CSV records file has one record per row. The `uris`, `meta_uris` and `license_uris`
//! columns may repeat; each non-empty cell is appended to the record's list in column order.
//! An optional `target` column gives the address each token is minted to. Files without a
//! header row use [`CSV_COLUMNS`], optionally followed by a `target` column.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use bulkmint_primitives::{Bytes32, MintRecord};
use serde::{Deserialize, Serialize};

use crate::LocalError;

/// Column order of a CSV records file without a header row.
pub const CSV_COLUMNS: [&str; 8] = [
    "hash",
    "uris",
    "meta_hash",
    "meta_uris",
    "license_hash",
    "license_uris",
    "series_number",
    "series_total",
];

/// Encoding of a records file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordFormat {
    /// `{"records": [...]}`.
    #[default]
    Json,
    /// CSV whose first row names the columns.
    Csv,
    /// CSV in [`CSV_COLUMNS`] order with no header row.
    HeaderlessCsv,
}

impl RecordFormat {
    /// Format implied by the file extension: `.csv` is headed CSV, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// JSON representation of one record and its optional recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRecord {
    /// Token metadata.
    #[serde(flatten)]
    pub record: MintRecord,
    /// Address the token is minted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// JSON representation of a records file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRecordFile {
    /// Records in mint order.
    pub records: Vec<JsonRecord>,
}

/// Records of a run with their targets, either one per record or none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    /// Records in mint order.
    pub records: Vec<MintRecord>,
    /// Target addresses parallel to `records`, or empty.
    pub targets: Vec<String>,
}

impl RecordSet {
    /// Loads a record set from a file, picking the format from its extension.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, LocalError> {
        let path = path.into();
        let format = RecordFormat::from_path(&path);
        Self::from_file_as(path, format)
    }

    /// Loads a record set from a file in the given format.
    pub fn from_file_as(path: impl Into<PathBuf>, format: RecordFormat) -> Result<Self, LocalError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LocalError::NotFound(path.display().to_string())
            } else {
                LocalError::Io(e)
            }
        })?;
        match format {
            RecordFormat::Json => Self::from_json(&content),
            RecordFormat::Csv => Self::from_csv(content.as_bytes(), true),
            RecordFormat::HeaderlessCsv => Self::from_csv(content.as_bytes(), false),
        }
    }

    /// Loads a record set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LocalError> {
        Self::from_data(serde_json::from_str(json)?)
    }

    /// Loads a record set from CSV.
    ///
    /// Without a header the columns are [`CSV_COLUMNS`] plus an optional ninth `target`
    /// column. Unknown header columns are ignored.
    pub fn from_csv(reader: impl Read, has_header: bool) -> Result<Self, LocalError> {
        let mut csv =
            csv::ReaderBuilder::new().has_headers(has_header).trim(csv::Trim::All).from_reader(reader);
        let columns: Vec<String> = if has_header {
            csv.headers()?.iter().map(str::to_string).collect()
        } else {
            CSV_COLUMNS.iter().chain(&["target"]).map(|c| c.to_string()).collect()
        };

        let mut records = Vec::new();
        for row in csv.records() {
            let row = row?;
            let line = row.position().map_or(0, |p| p.line());
            if row.len() > columns.len() {
                return Err(LocalError::InvalidRecord {
                    line,
                    reason: format!("{} fields for {} columns", row.len(), columns.len()),
                });
            }
            records.push(csv_record(&columns, &row, line)?);
        }
        tracing::debug!(records = records.len(), has_header, "Parsed CSV records");
        Self::from_data(JsonRecordFile { records })
    }

    /// Splits parsed records into records and targets.
    pub fn from_data(data: JsonRecordFile) -> Result<Self, LocalError> {
        let records = data.records.len();
        let with_target = data.records.iter().filter(|r| r.target.is_some()).count();
        if with_target != 0 && with_target != records {
            return Err(LocalError::PartialTargets { with_target, records });
        }

        let (records, targets) =
            data.records.into_iter().map(|r| (r.record, r.target)).unzip::<_, _, Vec<_>, Vec<_>>();
        Ok(Self { records, targets: targets.into_iter().flatten().collect() })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn csv_record(columns: &[String], row: &csv::StringRecord, line: u64) -> Result<JsonRecord, LocalError> {
    let invalid = |reason: String| LocalError::InvalidRecord { line, reason };
    let hash = |column: &str, value: &str| {
        value.parse::<Bytes32>().map_err(|e| invalid(format!("{column}: {e}")))
    };
    let number = |column: &str, value: &str| {
        value.parse::<u64>().map_err(|e| invalid(format!("{column}: {e}")))
    };

    let (mut uris, mut meta_uris, mut license_uris) = (Vec::new(), Vec::new(), Vec::new());
    let (mut record_hash, mut meta_hash, mut license_hash) = (None, None, None);
    let (mut series_number, mut series_total, mut target) = (None, None, None);
    for (column, value) in columns.iter().map(String::as_str).zip(row.iter()) {
        match column {
            "uris" | "meta_uris" | "license_uris" if value.is_empty() => {}
            "uris" => uris.push(value.to_string()),
            "meta_uris" => meta_uris.push(value.to_string()),
            "license_uris" => license_uris.push(value.to_string()),
            "hash" => record_hash = Some(hash(column, value)?),
            "meta_hash" => meta_hash = Some(hash(column, value)?),
            "license_hash" => license_hash = Some(hash(column, value)?),
            "series_number" => series_number = Some(number(column, value)?),
            "series_total" => series_total = Some(number(column, value)?),
            "target" if !value.is_empty() => target = Some(value.to_string()),
            _ => {}
        }
    }

    let missing = |column: &str| invalid(format!("missing {column}"));
    let record = MintRecord {
        hash: record_hash.ok_or_else(|| missing("hash"))?,
        uris,
        meta_hash: meta_hash.ok_or_else(|| missing("meta_hash"))?,
        meta_uris,
        license_hash: license_hash.ok_or_else(|| missing("license_hash"))?,
        license_uris,
        series_number: series_number.ok_or_else(|| missing("series_number"))?,
        series_total: series_total.ok_or_else(|| missing("series_total"))?,
    };
    Ok(JsonRecord { record, target })
}
