//! Transaction manager error types.

use bulkmint_primitives::Bytes32;
use bulkmint_rpc::{AddressError, RpcError, RuntimeError};
use thiserror::Error;

use crate::state::SendStage;

/// Why the node refused a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A spent coin is already spent or pending in another bundle.
    DoubleSpend,
    /// The fee is too low for current pool conditions.
    FeeTooLow,
    /// A spent coin does not exist.
    UnknownCoin,
    /// Anything else, verbatim.
    Other(String),
}

impl Rejection {
    /// Classifies a node error string.
    pub fn from_node_error(msg: &str) -> Self {
        let lower = msg.to_lowercase();

        if lower.contains("double_spend") || lower.contains("double spend") {
            Self::DoubleSpend
        } else if lower.contains("fee_low_fee")
            || lower.contains("fee_too_close_to_zero")
            || lower.contains("fee too low")
        {
            Self::FeeTooLow
        } else if lower.contains("unknown_unspent") || lower.contains("unknown coin") {
            Self::UnknownCoin
        } else {
            Self::Other(msg.to_string())
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DoubleSpend => f.write_str("double spend"),
            Self::FeeTooLow => f.write_str("fee too low"),
            Self::UnknownCoin => f.write_str("unknown coin"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

/// Transaction manager errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// RPC error.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Runtime error while costing or aggregating.
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// The wallet handed out an address the codec cannot decode.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Fee estimation accumulated no cost from a non-empty pool.
    #[error("Fee estimation accumulated zero cost from {items} pool items")]
    PoolDivision {
        /// Number of pool items inspected.
        items: usize,
    },

    /// Fee coin selection returned a coin the batch bundle already spends.
    #[error("Fee coin {coin} is already spent by the batch bundle")]
    FeeCoinConflict {
        /// Name of the conflicting coin.
        coin: Bytes32,
    },

    /// The wallet did not return a bundle for the fee transaction.
    #[error("Wallet returned fee transaction {0} without a bundle")]
    MissingFeeBundle(Bytes32),

    /// The node rejected the submission.
    #[error("Submission rejected: {0}")]
    SubmissionRejected(Rejection),

    /// The bundle never showed up in the pool.
    #[error("Bundle {bundle} not seen in pool after {attempts} lookups")]
    NotInPool {
        /// Name of the submitted bundle.
        bundle: Bytes32,
        /// Lookups performed.
        attempts: u32,
    },

    /// The bundle stayed in the pool past the polling limit.
    #[error("Bundle {bundle} still pooled after {polls} polls")]
    ConfirmationTimeout {
        /// Name of the submitted bundle.
        bundle: Bytes32,
        /// Polls performed.
        polls: u32,
    },

    /// The bundle left the pool but its coins were not spent on chain.
    #[error("Bundle {bundle} left the pool unspent (coin {coin})")]
    Evicted {
        /// Name of the submitted bundle.
        bundle: Bytes32,
        /// First coin found unspent.
        coin: Bytes32,
    },

    /// A send-state transition out of order.
    #[error("Invalid send state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current stage.
        from: SendStage,
        /// Requested stage.
        to: SendStage,
    },

    /// The run was cancelled.
    #[error("Cancelled")]
    Cancelled,
}

impl TxError {
    /// Classifies whether the error is transient. Nothing in the send path retries on its
    /// own; callers decide.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Rpc(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Classifies whether the bundle may already be on its way to inclusion.
    ///
    /// After a successful push a resubmission risks a double spend.
    pub const fn may_be_pending(&self) -> bool {
        matches!(self, Self::NotInPool { .. } | Self::ConfirmationTimeout { .. } | Self::Cancelled)
    }
}
