//! Ctrl+C signal handling.

use bulkmint_txmgr::{CancelHandle, CancelSignal};

/// Returns a signal that is cancelled when Ctrl+C is received.
///
/// The run stops at the next cancellation point: before the next batch or inside a pool
/// wait. A bundle already pushed may still confirm.
///
/// Must be called from within a tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use bulkmint_cli::cancel_on_ctrlc;
///
/// #[tokio::main]
/// async fn main() {
///     let cancel = cancel_on_ctrlc();
///     assert!(!cancel.is_cancelled());
/// }
/// ```
pub fn cancel_on_ctrlc() -> CancelSignal {
    let handle = CancelHandle::new();
    let signal = handle.signal();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            return;
        }
        tracing::warn!("Received Ctrl+C, stopping at the next cancellation point");
        handle.cancel();
    });
    signal
}
