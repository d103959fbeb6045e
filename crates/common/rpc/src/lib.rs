#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/bulkmint/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod address;
pub use address::{AddressCodec, AddressError};

mod error;
pub use error::RpcError;

mod node;
pub use node::{NodeRpc, PushTxResponse};

mod runtime;
pub use runtime::{BundleRuntimeExt, RuntimeError, SpendRuntime};

mod wallet;
pub use wallet::{Addition, MintBatchRequest, MintBatchResponse, WalletId, WalletRpc};
