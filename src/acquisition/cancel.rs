//! Ways to end an acquisition run
//!
//! The loop only watches a [`CancellationToken`]; these helpers fire it from
//! a timer or from Ctrl-C.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `token` once `deadline` has elapsed
pub fn cancel_after(token: CancellationToken, deadline: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(deadline) => {
                tracing::info!("Time budget of {:?} reached, stopping acquisition", deadline);
                token.cancel();
            }
        }
    })
}

/// Cancels `token` when the process receives Ctrl-C
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => tracing::info!("Interrupt received, stopping acquisition"),
                    Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
                }
                token.cancel();
            }
        }
    })
}
