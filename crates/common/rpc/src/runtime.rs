//! Ledger runtime interface.

use bulkmint_primitives::{Bytes, Coin, CoinSpend, SpendBundle};
use thiserror::Error;

/// Errors raised while evaluating spends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The puzzle failed or exceeded the cost ceiling.
    #[error("Spend of {coin} failed: {reason}")]
    SpendFailed {
        /// Name of the coin whose spend failed.
        coin: String,
        /// Runtime-reported reason.
        reason: String,
    },
    /// Signatures could not be aggregated.
    #[error("Signature aggregation failed: {0}")]
    Signature(String),
}

/// Puzzle execution and signature arithmetic supplied by the ledger.
///
/// These operations are pure with respect to chain state.
pub trait SpendRuntime: Send + Sync {
    /// Execution cost of running `puzzle_reveal` with `solution`, bounded by `max_cost`.
    fn cost(&self, puzzle_reveal: &Bytes, solution: &Bytes, max_cost: u64) -> Result<u64, RuntimeError>;

    /// Coins created by a spend.
    fn additions(&self, spend: &CoinSpend) -> Result<Vec<Coin>, RuntimeError>;

    /// Aggregates bundle signatures into one.
    fn aggregate_signatures(&self, signatures: &[Bytes]) -> Result<Bytes, RuntimeError>;
}

/// Bundle-level helpers over any [`SpendRuntime`].
pub trait BundleRuntimeExt: SpendRuntime {
    /// Coins created by every spend in the bundle, in spend order.
    fn bundle_additions(&self, bundle: &SpendBundle) -> Result<Vec<Coin>, RuntimeError> {
        let mut additions = Vec::new();
        for spend in &bundle.coin_spends {
            additions.extend(self.additions(spend)?);
        }
        Ok(additions)
    }

    /// Sum of the execution cost of every spend in the bundle.
    ///
    /// `max_cost` bounds each individual spend.
    fn bundle_cost(&self, bundle: &SpendBundle, max_cost: u64) -> Result<u64, RuntimeError> {
        bundle.coin_spends.iter().try_fold(0u64, |total, spend| {
            let cost = self.cost(&spend.puzzle_reveal, &spend.solution, max_cost)?;
            Ok(total.saturating_add(cost))
        })
    }
}

impl<T: SpendRuntime + ?Sized> BundleRuntimeExt for T {}
