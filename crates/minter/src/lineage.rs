//! Coin lineage carried from one batch to the next.

use bulkmint_primitives::{Bytes32, Coin};
use thiserror::Error;

/// How a batch bundle failed to continue the coin lineage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageBreak {
    /// No single addition pays back to the funding puzzle hash.
    #[error("expected one funding change coin, found {0}")]
    FundingChange(usize),
    /// The bundle does not spend the current authority coin.
    #[error("authority coin {0} is not spent")]
    AuthorityNotSpent(Bytes32),
    /// No single amount-1 child of the authority coin.
    #[error("expected one authority successor, found {0}")]
    AuthoritySuccessor(usize),
}

/// Coins the next batch builds on.
///
/// Produced fresh by [`advance`](Self::advance) after every accepted batch bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineageState {
    /// Coin funding the next batch.
    pub funding_coin: Coin,
    /// Authority coin the next batch spends.
    pub authority_coin: Coin,
    /// Parent of the authority coin spent by the previous batch.
    pub authority_lineage_parent: Option<Bytes32>,
}

impl LineageState {
    /// Lineage before the first batch.
    pub const fn genesis(funding_coin: Coin, authority_coin: Coin) -> Self {
        Self { funding_coin, authority_coin, authority_lineage_parent: None }
    }

    /// Derives the lineage after a batch bundle with the given removals and additions.
    ///
    /// `funding_puzzle_hash` is the puzzle hash of the run's original funding coin; change
    /// always returns there.
    pub fn advance(
        &self,
        funding_puzzle_hash: Bytes32,
        removals: &[Coin],
        additions: &[Coin],
    ) -> Result<Self, LineageBreak> {
        let funding_coin = single(additions.iter().filter(|c| c.puzzle_hash == funding_puzzle_hash))
            .map_err(LineageBreak::FundingChange)?;

        let authority_name = self.authority_coin.name();
        let spent_authority = removals
            .iter()
            .find(|coin| coin.name() == authority_name)
            .ok_or(LineageBreak::AuthorityNotSpent(authority_name))?;

        let authority_coin = single(
            additions.iter().filter(|c| c.parent_coin_info == authority_name && c.amount == 1),
        )
        .map_err(LineageBreak::AuthoritySuccessor)?;

        Ok(Self {
            funding_coin,
            authority_coin,
            authority_lineage_parent: Some(spent_authority.parent_coin_info),
        })
    }
}

/// The only item of `iter`, or the number found.
fn single<'a>(mut iter: impl Iterator<Item = &'a Coin>) -> Result<Coin, usize> {
    match (iter.next(), iter.next()) {
        (Some(coin), None) => Ok(*coin),
        (None, _) => Err(0),
        (Some(_), Some(_)) => Err(2 + iter.count()),
    }
}
