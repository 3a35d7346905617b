// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical timestamp handling.
//!
//! Every persisted and wire-visible timestamp in Attune is UTC RFC 3339
//! with millisecond precision and a trailing `Z`, the same shape SQLite's
//! `strftime('%Y-%m-%dT%H:%M:%fZ')` produces. These helpers keep the two
//! sides in agreement.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::AttuneError;
use crate::types::Booking;

/// strftime pattern for the canonical timestamp shape.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Injectable wall-clock source so tests can pin "now".
pub type NowFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Formats an instant in the canonical shape, e.g. `2026-03-01T10:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp back into an instant.
///
/// Stored values come from our own writes, so a parse failure means
/// corrupted data and surfaces as an internal error.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AttuneError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AttuneError::Internal(format!("malformed timestamp {value:?}: {e}")))
}

/// The instant a booking's session is anchored to. Bookings that were never
/// marked as started fall back to their scheduled time.
pub fn booking_start(booking: &Booking) -> Result<DateTime<Utc>, AttuneError> {
    parse_timestamp(booking.started_at.as_deref().unwrap_or(&booking.scheduled_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_produces_millisecond_utc_shape() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(format_timestamp(at), "2026-03-01T10:00:00.000Z");
    }

    #[test]
    fn parse_round_trips_formatted_values() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 45).unwrap();
        let parsed = parse_timestamp(&format_timestamp(at)).unwrap();
        assert_eq!(parsed, at);
    }

    #[test]
    fn parse_accepts_sqlite_strftime_output() {
        // strftime('%Y-%m-%dT%H:%M:%fZ') emits exactly this shape.
        let parsed = parse_timestamp("2026-03-01T10:00:00.123Z").unwrap();
        assert_eq!(format_timestamp(parsed), "2026-03-01T10:00:00.123Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        let result = parse_timestamp("not-a-timestamp");
        assert!(matches!(result, Err(AttuneError::Internal(_))));
    }
}
