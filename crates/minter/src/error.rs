//! Mint run error types.

use std::ops::Range;

use bulkmint_rpc::{AddressError, RpcError, RuntimeError, WalletId};
use bulkmint_txmgr::TxError;
use thiserror::Error;

use crate::lineage::LineageBreak;

/// Mint run errors. Every variant ends the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MintError {
    /// Configuration that cannot produce a run.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Targets given for some records but not all.
    #[error("Got {targets} targets for {records} records")]
    TargetCountMismatch {
        /// Number of records.
        records: usize,
        /// Number of targets.
        targets: usize,
    },

    /// A target or royalty address does not decode.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// The wallet returned nothing for a selection.
    #[error("No coins selected from wallet {wallet_id} for amount {amount}")]
    NoCoinsSelected {
        /// Wallet queried.
        wallet_id: WalletId,
        /// Amount requested.
        amount: u64,
    },

    /// The funding selection needs more than one coin.
    #[error("Bulk minting needs a single coin worth at least {amount}, wallet selected {count}")]
    AmbiguousFunding {
        /// Coins selected.
        count: usize,
        /// Amount requested.
        amount: u64,
    },

    /// The authority selection did not yield exactly one coin of amount 1.
    #[error("Expected one authority coin of amount 1, wallet selected {count} (first amount {amount})")]
    AmbiguousAuthority {
        /// Coins selected.
        count: usize,
        /// Amount of the first selected coin.
        amount: u64,
    },

    /// The wallet could not build a batch bundle.
    #[error("Bundle for records {range:?} could not be built: {reason}")]
    BundleConstruction {
        /// Record range of the batch.
        range: Range<usize>,
        /// Wallet-reported reason.
        reason: String,
    },

    /// A batch bundle does not continue the coin lineage.
    #[error("Lineage broken by bundle for records {range:?}: {cause}")]
    LineageBreak {
        /// Record range of the batch.
        range: Range<usize>,
        /// What was missing.
        cause: LineageBreak,
    },

    /// A batch failed in the send pipeline.
    #[error("Batch {batch} failed: {source}")]
    Submission {
        /// Batch index, 0-based.
        batch: usize,
        /// Send pipeline error.
        source: TxError,
    },

    /// The run was cancelled before or during a batch.
    #[error("Cancelled at batch {batch}")]
    Cancelled {
        /// Batch index, 0-based.
        batch: usize,
    },

    /// RPC error outside a specific batch.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Runtime error evaluating a bundle.
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Audit trail could not be written or read.
    #[error("Audit trail error: {0}")]
    Audit(String),
}

impl MintError {
    /// Wraps a send pipeline error for a batch, keeping cancellation distinct.
    pub fn submission(batch: usize, source: TxError) -> Self {
        match source {
            TxError::Cancelled => Self::Cancelled { batch },
            source => Self::Submission { batch, source },
        }
    }

    /// Batch index the error occurred at, if any.
    pub const fn batch(&self) -> Option<usize> {
        match self {
            Self::Submission { batch, .. } | Self::Cancelled { batch } => Some(*batch),
            _ => None,
        }
    }

    /// Classifies whether a fresh run could succeed without intervention.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Rpc(err) => err.is_retryable(),
            Self::Submission { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Classifies whether the error needs the input or wallet state fixed first.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::TargetCountMismatch { .. }
                | Self::InvalidAddress(_)
                | Self::NoCoinsSelected { .. }
                | Self::AmbiguousFunding { .. }
                | Self::AmbiguousAuthority { .. }
                | Self::LineageBreak { .. }
        )
    }
}
