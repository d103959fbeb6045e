//! Funding and authority coin selection.

use std::sync::Arc;

use bulkmint_primitives::Coin;
use bulkmint_rpc::{WalletId, WalletRpc};

use crate::MintError;

/// Selects the single coins a run is built on. Never retries.
pub struct CoinSelector<W> {
    wallet: Arc<W>,
}

impl<W> CoinSelector<W> {
    /// Creates a new selector.
    pub const fn new(wallet: Arc<W>) -> Self {
        Self { wallet }
    }
}

impl<W: WalletRpc> CoinSelector<W> {
    /// Selects one coin worth at least `amount` from the funding wallet.
    ///
    /// # Errors
    ///
    /// [`MintError::NoCoinsSelected`] for an empty selection and
    /// [`MintError::AmbiguousFunding`] when the wallet needs several coins to cover `amount`.
    pub async fn select_funding(&self, amount: u64, wallet_id: WalletId) -> Result<Coin, MintError> {
        let coins = self.wallet.select_coins(amount, wallet_id, &[]).await?;
        match coins.as_slice() {
            [] => Err(MintError::NoCoinsSelected { wallet_id, amount }),
            [coin] => {
                tracing::info!(coin = %coin.name(), amount = coin.amount, "Selected funding coin");
                Ok(*coin)
            }
            _ => Err(MintError::AmbiguousFunding { count: coins.len(), amount }),
        }
    }

    /// Selects the authority coin: exactly one coin of amount 1.
    ///
    /// # Errors
    ///
    /// [`MintError::NoCoinsSelected`] for an empty selection and
    /// [`MintError::AmbiguousAuthority`] for anything but a single amount-1 coin.
    pub async fn select_authority(&self, wallet_id: WalletId) -> Result<Coin, MintError> {
        let coins = self.wallet.select_coins(1, wallet_id, &[]).await?;
        match coins.as_slice() {
            [] => Err(MintError::NoCoinsSelected { wallet_id, amount: 1 }),
            [coin] if coin.amount == 1 => {
                tracing::info!(coin = %coin.name(), "Selected authority coin");
                Ok(*coin)
            }
            [first, ..] => {
                Err(MintError::AmbiguousAuthority { count: coins.len(), amount: first.amount })
            }
        }
    }
}

impl<W> std::fmt::Debug for CoinSelector<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinSelector").finish_non_exhaustive()
    }
}
