#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/bulkmint/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod builder;
pub use builder::FeeAttacher;

mod cancel;
pub use cancel::{CancelHandle, CancelSignal};

mod candidate;
pub use candidate::{TxCandidate, TxReceipt};

mod config;
pub use config::{ConfirmationPolicy, TxManagerConfig, TxManagerConfigBuilder};

mod error;
pub use error::{Rejection, TxError};

mod fee;
pub use fee::{FeeEstimator, FeeQuote, FeeSource, estimate_from_pool};

mod manager;
pub use manager::TxManager;

mod monitor;
pub use monitor::TxMonitor;

mod state;
pub use state::SendStage;

mod submitter;
pub use submitter::TxSubmitter;
