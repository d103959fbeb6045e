//! Wallet transaction records.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::{Coin, SpendBundle};

/// A signed transaction produced by the wallet.
///
/// When a fee transaction is combined with a batch bundle, the record is replaced by one
/// whose bundle and name describe the aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction name (the name of its bundle once one is attached).
    pub name: B256,
    /// Signed bundle, absent if the wallet could not produce one.
    pub spend_bundle: Option<SpendBundle>,
    /// Fee carried by the transaction.
    pub fee_amount: u64,
    /// Coins the transaction creates.
    #[serde(default)]
    pub additions: Vec<Coin>,
    /// Coins the transaction consumes.
    #[serde(default)]
    pub removals: Vec<Coin>,
}

impl TransactionRecord {
    /// Returns a copy of this record carrying `bundle`, renamed after it.
    pub fn with_bundle(&self, bundle: SpendBundle) -> Self {
        Self {
            name: bundle.name(),
            removals: bundle.removals(),
            spend_bundle: Some(bundle),
            fee_amount: self.fee_amount,
            additions: self.additions.clone(),
        }
    }
}
