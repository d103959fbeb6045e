//! Send pipeline stages.

use crate::TxError;

/// Stage of a single bundle moving through the send pipeline.
///
/// Stages only move forward. A send starts at [`Built`](Self::Built) and ends in
/// [`Confirmed`](Self::Confirmed) or [`Failed`](Self::Failed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SendStage {
    /// The batch bundle exists; no fee yet.
    #[default]
    Built,
    /// The fee bundle is aggregated into the batch bundle.
    FeeAttached,
    /// The node accepted the aggregate.
    Submitted,
    /// The aggregate was seen in the pool.
    InPool,
    /// The aggregate left the pool and passed the confirmation policy.
    Confirmed,
    /// The send ended in an error.
    Failed,
}

impl SendStage {
    /// Returns true once no further transitions are allowed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Stage that normally follows this one, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Built => Some(Self::FeeAttached),
            Self::FeeAttached => Some(Self::Submitted),
            Self::Submitted => Some(Self::InPool),
            Self::InPool => Some(Self::Confirmed),
            Self::Confirmed | Self::Failed => None,
        }
    }

    /// Moves to `to`, which must be the next stage or [`Failed`](Self::Failed).
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidTransition`] for any other target, including any move out
    /// of a terminal stage.
    pub fn advance(self, to: Self) -> Result<Self, TxError> {
        let allowed = !self.is_terminal() && (to == Self::Failed || self.next() == Some(to));
        if allowed { Ok(to) } else { Err(TxError::InvalidTransition { from: self, to }) }
    }
}

impl std::fmt::Display for SendStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::FeeAttached => "fee_attached",
            Self::Submitted => "submitted",
            Self::InPool => "in_pool",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
