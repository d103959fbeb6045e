#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/bulkmint/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod address;
pub use address::HexAddressCodec;

mod config;
pub use config::{LedgerConfig, LedgerConfigBuilder};

mod error;
pub use error::LocalError;

mod ledger;
pub use ledger::{LedgerStats, LocalLedger, nft_puzzle_hash, pool_tx_id, wallet_puzzle_hash};

mod records;
pub use records::{CSV_COLUMNS, JsonRecord, JsonRecordFile, RecordFormat, RecordSet};

mod runtime;
pub use runtime::{CREATE_ENTRY_LEN, LocalRuntime, SIGNATURE_LEN};
