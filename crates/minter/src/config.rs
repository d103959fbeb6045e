//! Minter configuration.

use std::path::PathBuf;

use bulkmint_rpc::WalletId;

/// Minter configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinterConfig {
    /// Records per batch (default: 25).
    pub chunk_size: usize,
    /// Fungible wallet holding the funding coin (default: 1).
    pub funding_wallet_id: WalletId,
    /// Wallet holding the authority coin (default: 2).
    pub authority_wallet_id: WalletId,
    /// Royalty destination address.
    pub royalty_address: Option<String>,
    /// Royalty share in basis points.
    pub royalty_percentage: Option<u16>,
    /// Where built bundles are written, if anywhere.
    pub output_path: Option<PathBuf>,
}

impl Default for MinterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 25,
            funding_wallet_id: 1,
            authority_wallet_id: 2,
            royalty_address: None,
            royalty_percentage: None,
            output_path: None,
        }
    }
}

impl MinterConfig {
    /// Creates a new builder.
    pub fn builder() -> MinterConfigBuilder {
        MinterConfigBuilder::default()
    }

    /// Royalty address and share, only when both are set.
    pub fn royalty(&self) -> Option<(&str, u16)> {
        match (&self.royalty_address, self.royalty_percentage) {
            (Some(address), Some(percentage)) => Some((address.as_str(), percentage)),
            _ => None,
        }
    }
}

/// Builder for [`MinterConfig`].
#[derive(Clone, Debug, Default)]
pub struct MinterConfigBuilder {
    config: MinterConfig,
}

impl MinterConfigBuilder {
    /// Sets the number of records per batch.
    pub const fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Sets the funding wallet.
    pub const fn funding_wallet_id(mut self, funding_wallet_id: WalletId) -> Self {
        self.config.funding_wallet_id = funding_wallet_id;
        self
    }

    /// Sets the authority wallet.
    pub const fn authority_wallet_id(mut self, authority_wallet_id: WalletId) -> Self {
        self.config.authority_wallet_id = authority_wallet_id;
        self
    }

    /// Sets the royalty destination.
    pub fn royalty_address(mut self, royalty_address: Option<String>) -> Self {
        self.config.royalty_address = royalty_address;
        self
    }

    /// Sets the royalty share in basis points.
    pub const fn royalty_percentage(mut self, royalty_percentage: Option<u16>) -> Self {
        self.config.royalty_percentage = royalty_percentage;
        self
    }

    /// Sets the audit trail path.
    pub fn output_path(mut self, output_path: Option<PathBuf>) -> Self {
        self.config.output_path = output_path;
        self
    }

    /// Builds the [`MinterConfig`].
    pub fn build(self) -> MinterConfig {
        self.config
    }
}
