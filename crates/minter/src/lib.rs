#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/bulkmint/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod audit;
pub use audit::{read_audit_trail, write_audit_trail};

mod builder;
pub use builder::{BatchBuilder, BuiltBatch, chunk_ranges};

mod config;
pub use config::{MinterConfig, MinterConfigBuilder};

mod error;
pub use error::MintError;

mod lineage;
pub use lineage::{LineageBreak, LineageState};

mod metrics;
pub use metrics::MintMetrics;

mod runner;
pub use runner::MintRunner;

mod selector;
pub use selector::CoinSelector;
