//! Confirmation policy selection for CLI.

use bulkmint_txmgr::ConfirmationPolicy;
use clap::ValueEnum;

/// How a bundle that left the pool is treated.
///
/// # Examples
///
/// ```
/// use bulkmint_cli::PolicyArg;
///
/// assert_eq!(PolicyArg::default(), PolicyArg::Assume);
/// assert_eq!(PolicyArg::Verify.to_string(), "verify");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, derive_more::Display)]
pub enum PolicyArg {
    /// Treat the bundle as confirmed once it leaves the pool.
    #[default]
    #[display("assume")]
    Assume,
    /// Check the spent coins' records before treating the bundle as confirmed.
    #[display("verify")]
    Verify,
}

impl From<PolicyArg> for ConfirmationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Assume => Self::AssumeConfirmed,
            PolicyArg::Verify => Self::VerifySpent,
        }
    }
}
