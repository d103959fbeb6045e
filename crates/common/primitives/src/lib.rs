#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/bulkmint/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod audit;
pub use audit::{AUDIT_MAGIC, AUDIT_VERSION, AuditTrail};

mod coin;
pub use coin::{Coin, CoinRecord};

mod codec;
pub use codec::CodecError;

mod mint_record;
pub use mint_record::MintRecord;

mod pool;
pub use pool::{BlockchainState, PoolItem};

mod spend_bundle;
pub use spend_bundle::{CoinSpend, SpendBundle};

mod transaction;
pub use transaction::TransactionRecord;

pub use alloy_primitives::{B256 as Bytes32, Bytes, hex};
