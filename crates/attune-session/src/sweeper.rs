// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background expiry sweep for pending extension requests.
//!
//! The lazy expiry check in [`ExtensionNegotiator::respond`] only fires when
//! the giver eventually answers. The sweeper covers the silent case: on a
//! fixed interval it times out every pending request whose deadline has
//! passed, so receivers are not left waiting on a reply that will never come.
//!
//! [`ExtensionNegotiator::respond`]: crate::ExtensionNegotiator::respond

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::negotiator::ExtensionNegotiator;

pub struct ExpirySweeper {
    negotiator: Arc<ExtensionNegotiator>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(negotiator: Arc<ExtensionNegotiator>, interval_secs: u64) -> Self {
        Self {
            negotiator,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs the sweep loop until the token is cancelled. Sweep failures are
    /// logged and retried on the next tick.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        // The first tick fires immediately; skip it so startup is quiet.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.negotiator.sweep_expired().await {
                        Ok(0) => {}
                        Ok(count) => info!(count, "expired extension requests swept"),
                        Err(e) => warn!(error = %e, "extension expiry sweep failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("expiry sweeper shutting down");
                    break;
                }
            }
        }
    }
}
