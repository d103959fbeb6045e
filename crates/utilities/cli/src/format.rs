//! Records file format selection for CLI.

use std::path::Path;

use bulkmint_local::RecordFormat;
use clap::ValueEnum;

/// Encoding of the records file.
///
/// # Examples
///
/// ```
/// use bulkmint_cli::FormatArg;
///
/// assert_eq!(FormatArg::HeaderlessCsv.to_string(), "headerless-csv");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, derive_more::Display)]
pub enum FormatArg {
    /// `{"records": [...]}` JSON.
    #[display("json")]
    Json,
    /// CSV with a header row naming the columns.
    #[display("csv")]
    Csv,
    /// CSV without a header row, in the default column order.
    #[display("headerless-csv")]
    HeaderlessCsv,
}

impl From<FormatArg> for RecordFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
            FormatArg::HeaderlessCsv => Self::HeaderlessCsv,
        }
    }
}

/// The chosen format, or the one implied by the file extension.
pub(crate) fn resolve(arg: Option<FormatArg>, path: &Path) -> RecordFormat {
    arg.map_or_else(|| RecordFormat::from_path(path), Into::into)
}
