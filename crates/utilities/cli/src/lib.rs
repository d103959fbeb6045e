#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/bulkmint/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

/// CLI argument parsing.
///
/// The [`Cli`] struct parses the mint arguments with `clap` and converts them into the
/// minter and transaction manager configurations.
mod cli;
pub use cli::Cli;

/// Records file format selection.
mod format;
pub use format::FormatArg;

/// Confirmation policy selection.
mod policy;
pub use policy::PolicyArg;

/// Tracing initialization utilities.
///
/// The [`init_tracing`] function configures the tracing subscriber with a verbosity-based
/// log level and respects the `RUST_LOG` environment variable.
mod tracing_init;
pub use crate::tracing_init::{init_tracing, level_for};

/// Ctrl+C signal handling.
///
/// The [`cancel_on_ctrlc`] function turns Ctrl+C into a cancel signal for the mint run.
mod ctrlc;
pub use crate::ctrlc::cancel_on_ctrlc;
