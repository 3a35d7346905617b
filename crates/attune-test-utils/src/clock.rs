// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manually advanced time source for deterministic tests.
//!
//! The domain services take their time through [`NowFn`]; `ManualClock`
//! hands out a `NowFn` backed by a shared instant that tests move forward
//! explicitly. All clones observe the same instant.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use attune_core::time::NowFn;
use chrono::{DateTime, Utc};

/// A settable clock shared between a test and the services under test.
#[derive(Clone)]
pub struct ManualClock {
    epoch_millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// A clock frozen at the given instant.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            epoch_millis: Arc::new(AtomicI64::new(now.timestamp_millis())),
        }
    }

    /// The clock's current instant.
    pub fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.epoch_millis.load(Ordering::SeqCst))
            .unwrap_or_default()
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        self.epoch_millis
            .store(now.timestamp_millis(), Ordering::SeqCst);
    }

    /// Moves the clock forward (or backward, with a negative duration).
    pub fn advance(&self, delta: chrono::Duration) {
        self.epoch_millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    /// A [`NowFn`] reading this clock, for injection into the services.
    pub fn now_fn(&self) -> NowFn {
        let clock = self.clone();
        Arc::new(move || clock.now())
    }
}
