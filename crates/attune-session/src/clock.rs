// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic phase arithmetic and the storage-backed session clock.
//!
//! A session runs a fixed schedule measured in seconds since its start:
//! transmission, reflection, validation, emergence, then ended. [`phase_at`]
//! is the single source of truth for that mapping; it is total over all of
//! `i64` so callers never have to pre-validate an elapsed value.
//! [`SessionClock`] anchors the schedule to a booking's start timestamp and
//! refreshes the `session_states` read model on every query.

use std::sync::Arc;

use attune_core::time::{booking_start, format_timestamp};
pub use attune_core::time::NowFn;
use attune_core::types::{Booking, Phase, PhaseView, SessionState};
use attune_core::{AttuneError, StorageAdapter};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Cumulative phase boundaries, in seconds from session start.
const TRANSMISSION_END_SECS: i64 = 480;
const REFLECTION_END_SECS: i64 = 960;
const VALIDATION_END_SECS: i64 = 1200;

/// Scheduled length of the whole session.
pub const SESSION_TOTAL_SECS: i64 = 1500;

/// Maps elapsed seconds to the phase view at that instant.
///
/// Elapsed values before the session start clamp to the beginning of
/// transmission. Once the schedule is exhausted the session is ended: the
/// giver may speak freely and no seconds remain.
pub fn phase_at(elapsed_seconds: i64) -> PhaseView {
    let elapsed = elapsed_seconds.max(0);

    let (phase, phase_end) = match elapsed {
        e if e < TRANSMISSION_END_SECS => (Phase::Transmission, TRANSMISSION_END_SECS),
        e if e < REFLECTION_END_SECS => (Phase::Reflection, REFLECTION_END_SECS),
        e if e < VALIDATION_END_SECS => (Phase::Validation, VALIDATION_END_SECS),
        e if e < SESSION_TOTAL_SECS => (Phase::Emergence, SESSION_TOTAL_SECS),
        _ => (Phase::Ended, elapsed),
    };

    PhaseView {
        phase,
        giver_can_speak: phase != Phase::Transmission,
        seconds_remaining_in_phase: (phase_end - elapsed).max(0),
        total_elapsed_seconds: elapsed,
    }
}

/// Seconds left before the scheduled end of the whole session, floored at 0.
pub fn session_seconds_remaining(elapsed_seconds: i64) -> i64 {
    (SESSION_TOTAL_SECS - elapsed_seconds.max(0)).max(0)
}

/// Offset of a phase's first second from session start.
fn phase_start_offset(phase: Phase) -> i64 {
    match phase {
        Phase::Transmission => 0,
        Phase::Reflection => TRANSMISSION_END_SECS,
        Phase::Validation => REFLECTION_END_SECS,
        Phase::Emergence => VALIDATION_END_SECS,
        Phase::Ended => SESSION_TOTAL_SECS,
    }
}

/// Computes live phase views for bookings and projects them into the
/// `session_states` table.
#[derive(Clone)]
pub struct SessionClock {
    storage: Arc<dyn StorageAdapter>,
    now_fn: NowFn,
}

impl SessionClock {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            now_fn: Arc::new(Utc::now),
        }
    }

    /// Builds a clock with a custom time source.
    pub fn with_now_fn(storage: Arc<dyn StorageAdapter>, now_fn: NowFn) -> Self {
        Self { storage, now_fn }
    }

    /// The clock's current instant.
    pub fn now(&self) -> DateTime<Utc> {
        (self.now_fn)()
    }

    /// Computes the phase view for a booking at this instant.
    ///
    /// The authoritative answer comes from arithmetic on the booking row
    /// alone. Refreshing the `session_states` projection is a side effect:
    /// a projection failure is logged and the view is returned regardless.
    pub async fn query(&self, booking_id: &str) -> Result<PhaseView, AttuneError> {
        let booking = self
            .storage
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AttuneError::NotFound {
                entity: "booking",
                id: booking_id.to_string(),
            })?;

        let now = self.now();
        let start = booking_start(&booking)?;
        let view = phase_at((now - start).num_seconds());

        self.project(&booking, &view, start, now).await;

        Ok(view)
    }

    async fn project(&self, booking: &Booking, view: &PhaseView, start: DateTime<Utc>, now: DateTime<Utc>) {
        let extension_request_id = if booking.pending_extension {
            match self.storage.pending_extension_for_booking(&booking.id).await {
                Ok(request) => request.map(|r| r.id),
                Err(e) => {
                    warn!(booking_id = %booking.id, error = %e, "pending extension lookup failed");
                    None
                }
            }
        } else {
            None
        };

        let state = SessionState {
            booking_id: booking.id.clone(),
            phase: view.phase,
            giver_can_speak: view.giver_can_speak,
            phase_started_at: format_timestamp(start + chrono::Duration::seconds(phase_start_offset(view.phase))),
            seconds_remaining_in_phase: view.seconds_remaining_in_phase,
            total_elapsed_seconds: view.total_elapsed_seconds,
            pending_extension: booking.pending_extension,
            extension_request_id,
            end_reason: booking.end_reason,
            computed_at: format_timestamp(now),
        };

        if let Err(e) = self.storage.upsert_session_state(&state).await {
            warn!(booking_id = %booking.id, error = %e, "session state projection failed");
        }
    }
}
