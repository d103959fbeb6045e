//! Local ledger configuration.

/// Capacity and timing of a [`LocalLedger`](crate::LocalLedger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Maximum cost a block can include.
    pub block_max_cost: u64,
    /// Maximum total cost the pool holds.
    pub mempool_max_total_cost: u64,
    /// Pool lookups by tx id a bundle survives before it is confirmed.
    pub polls_until_confirmed: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            block_max_cost: 11_000_000_000,
            mempool_max_total_cost: 110_000_000_000,
            polls_until_confirmed: 1,
        }
    }
}

impl LedgerConfig {
    /// Returns a builder starting from the defaults.
    pub fn builder() -> LedgerConfigBuilder {
        LedgerConfigBuilder::default()
    }
}

/// Builder for [`LedgerConfig`].
#[derive(Debug, Clone, Default)]
pub struct LedgerConfigBuilder {
    config: LedgerConfig,
}

impl LedgerConfigBuilder {
    /// Sets the block cost limit.
    pub const fn block_max_cost(mut self, block_max_cost: u64) -> Self {
        self.config.block_max_cost = block_max_cost;
        self
    }

    /// Sets the pool cost limit.
    pub const fn mempool_max_total_cost(mut self, mempool_max_total_cost: u64) -> Self {
        self.config.mempool_max_total_cost = mempool_max_total_cost;
        self
    }

    /// Sets how many lookups a pooled bundle survives.
    pub const fn polls_until_confirmed(mut self, polls_until_confirmed: u32) -> Self {
        self.config.polls_until_confirmed = polls_until_confirmed;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> LedgerConfig {
        self.config
    }
}
