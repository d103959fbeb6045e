//! Transaction manager configuration.

use std::time::Duration;

use bulkmint_rpc::WalletId;

/// How to interpret a submitted bundle disappearing from the pool.
///
/// The node reports the same thing whether the bundle was included in a block, expired, or
/// was replaced. Only a coin-record check tells these apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfirmationPolicy {
    /// Treat disappearance as confirmation.
    #[default]
    AssumeConfirmed,
    /// Require every coin the bundle spends to be recorded spent on chain.
    VerifySpent,
}

/// Transaction manager configuration.
#[derive(Clone, Debug)]
pub struct TxManagerConfig {
    // Fees
    /// Fee returned when the pool has room for the bundle (default: 1).
    pub min_fee: u64,
    /// Fixed fee per cost unit; bypasses pool inspection when set (default: none).
    pub fee_per_cost: Option<u64>,
    /// Cost ceiling for a single spend when recomputing bundle cost (default: 11 billion).
    pub max_spend_cost: u64,
    /// Wallet paying fees and receiving fee change (default: 1).
    pub fee_wallet_id: WalletId,

    // Pool entry
    /// Delay between pool scans while waiting for the bundle to appear (default: 250ms).
    pub pool_lookup_interval: Duration,
    /// Pool scans before giving up on the bundle appearing (default: 120).
    pub max_pool_lookups: u32,

    // Confirmation
    /// Delay between pool-item polls while waiting for confirmation (default: 1s).
    pub confirmation_poll_interval: Duration,
    /// Pool-item polls before giving up on confirmation (default: 1800).
    pub max_confirmation_polls: u32,
    /// Pause after a confirmation before the next bundle is sent (default: 2s).
    pub post_confirmation_delay: Duration,
    /// Interpretation of a bundle leaving the pool (default: assume confirmed).
    pub confirmation_policy: ConfirmationPolicy,
}

impl Default for TxManagerConfig {
    fn default() -> Self {
        Self {
            min_fee: 1,
            fee_per_cost: None,
            max_spend_cost: 11_000_000_000,
            fee_wallet_id: 1,
            pool_lookup_interval: Duration::from_millis(250),
            max_pool_lookups: 120,
            confirmation_poll_interval: Duration::from_secs(1),
            max_confirmation_polls: 1800, // 30 minutes at the default interval
            post_confirmation_delay: Duration::from_secs(2),
            confirmation_policy: ConfirmationPolicy::AssumeConfirmed,
        }
    }
}

impl TxManagerConfig {
    /// Creates a new builder for configuring a transaction manager.
    pub fn builder() -> TxManagerConfigBuilder {
        TxManagerConfigBuilder::default()
    }
}

/// Builder for [`TxManagerConfig`].
#[derive(Clone, Debug, Default)]
pub struct TxManagerConfigBuilder {
    config: TxManagerConfig,
}

impl TxManagerConfigBuilder {
    /// Sets the fee used when the pool has room.
    pub const fn min_fee(mut self, min_fee: u64) -> Self {
        self.config.min_fee = min_fee;
        self
    }

    /// Sets a fixed fee per cost unit, bypassing pool inspection.
    pub const fn fee_per_cost(mut self, fee_per_cost: Option<u64>) -> Self {
        self.config.fee_per_cost = fee_per_cost;
        self
    }

    /// Sets the per-spend cost ceiling.
    pub const fn max_spend_cost(mut self, max_spend_cost: u64) -> Self {
        self.config.max_spend_cost = max_spend_cost;
        self
    }

    /// Sets the wallet paying fees.
    pub const fn fee_wallet_id(mut self, fee_wallet_id: WalletId) -> Self {
        self.config.fee_wallet_id = fee_wallet_id;
        self
    }

    /// Sets the delay between pool scans.
    pub const fn pool_lookup_interval(mut self, pool_lookup_interval: Duration) -> Self {
        self.config.pool_lookup_interval = pool_lookup_interval;
        self
    }

    /// Sets the number of pool scans before giving up.
    pub const fn max_pool_lookups(mut self, max_pool_lookups: u32) -> Self {
        self.config.max_pool_lookups = max_pool_lookups;
        self
    }

    /// Sets the delay between confirmation polls.
    pub const fn confirmation_poll_interval(mut self, confirmation_poll_interval: Duration) -> Self {
        self.config.confirmation_poll_interval = confirmation_poll_interval;
        self
    }

    /// Sets the number of confirmation polls before giving up.
    pub const fn max_confirmation_polls(mut self, max_confirmation_polls: u32) -> Self {
        self.config.max_confirmation_polls = max_confirmation_polls;
        self
    }

    /// Sets the pause after each confirmation.
    pub const fn post_confirmation_delay(mut self, post_confirmation_delay: Duration) -> Self {
        self.config.post_confirmation_delay = post_confirmation_delay;
        self
    }

    /// Sets the confirmation policy.
    pub const fn confirmation_policy(mut self, confirmation_policy: ConfirmationPolicy) -> Self {
        self.config.confirmation_policy = confirmation_policy;
        self
    }

    /// Builds the [`TxManagerConfig`].
    pub fn build(self) -> TxManagerConfig {
        self.config
    }
}
