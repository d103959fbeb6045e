//! Transaction-pool and chain-state snapshots.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// An entry observed in the node's transaction pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolItem {
    /// Name of the bundle this entry holds.
    pub spend_bundle_name: B256,
    /// Execution cost of the bundle.
    pub cost: u64,
    /// Fee paid by the bundle.
    pub fee: u64,
}

impl PoolItem {
    /// Fee per cost unit, floored. `None` for zero-cost entries.
    pub const fn fee_per_cost(&self) -> Option<u64> {
        if self.cost == 0 {
            return None;
        }
        Some(self.fee / self.cost)
    }
}

/// Capacity figures reported by the node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainState {
    /// Maximum cost a single block can include.
    pub block_max_cost: u64,
    /// Maximum total cost the pool holds.
    pub mempool_max_total_cost: u64,
    /// Total cost currently held in the pool.
    pub mempool_cost: u64,
}

impl BlockchainState {
    /// Returns true if a bundle of `cost` fits in the next block alongside the pool.
    pub const fn fits_in_block(&self, cost: u64) -> bool {
        match self.mempool_cost.checked_add(cost) {
            Some(total) => total <= self.block_max_cost,
            None => false,
        }
    }
}
