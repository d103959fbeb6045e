//! Bundles entering the send pipeline and their receipts.

use bulkmint_primitives::{Bytes32, SpendBundle};

use crate::fee::FeeSource;

/// A built batch bundle waiting for a fee and submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxCandidate {
    /// Position of the batch in the run, 0-based.
    pub batch_index: usize,
    /// The batch bundle, without a fee.
    pub bundle: SpendBundle,
}

impl TxCandidate {
    /// Creates a new candidate.
    pub const fn new(batch_index: usize, bundle: SpendBundle) -> Self {
        Self { batch_index, bundle }
    }

    /// Name of the fee-less batch bundle.
    pub fn batch_name(&self) -> Bytes32 {
        self.bundle.name()
    }
}

/// Result of a confirmed send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    /// Position of the batch in the run, 0-based.
    pub batch_index: usize,
    /// Name of the submitted aggregate bundle.
    pub bundle_name: Bytes32,
    /// Pool id the aggregate was tracked under.
    pub tx_id: Bytes32,
    /// Execution cost of the batch bundle.
    pub cost: u64,
    /// Fee attached.
    pub fee: u64,
    /// How the fee was derived.
    pub fee_source: FeeSource,
}
