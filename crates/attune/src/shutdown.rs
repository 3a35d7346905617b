// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! [`install_signal_handler`] hands out a [`CancellationToken`] that fires
//! on SIGTERM or SIGINT. On cancel the HTTP server stops accepting and
//! drains in-flight requests, and the extension expiry sweeper exits its
//! loop.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Resolves when the process receives SIGTERM or SIGINT (Ctrl+C).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                // No SIGTERM stream; Ctrl+C stays the only trigger.
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                info!("received SIGINT (Ctrl+C), initiating shutdown");
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received SIGINT (Ctrl+C), initiating shutdown");
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl+C, initiating shutdown");
    }
}

/// Spawns the signal listener and returns the token it cancels.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn installed_token_starts_live() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        // Cancel manually to clean up the background task.
        token.cancel();
    }

    #[tokio::test]
    async fn cancelled_token_wakes_waiters() {
        let token = install_signal_handler();
        let waiter = token.clone();
        token.cancel();
        waiter.cancelled().await;
    }
}
