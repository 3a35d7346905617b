// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical fixtures for integration tests.
//!
//! Every builder anchors to the same instant so elapsed-time arithmetic in
//! tests stays readable: a 25-minute booking worth 5000 cents gross, a 750
//! cent platform fee, and a 4250 cent giver net. Tests mutate the returned
//! structs for their scenario.

use attune_core::time::format_timestamp;
use attune_core::types::{AvailabilitySlot, Booking, BookingStatus, PayoutStatus};
use chrono::{DateTime, TimeZone, Utc};

/// Anchor instant used by every fixture: 2026-03-01 10:00:00 UTC.
pub fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// An active booking between `giver-1` and `receiver-1`, started on time.
pub fn make_booking(id: &str) -> Booking {
    let start = format_timestamp(session_start());
    Booking {
        id: id.to_string(),
        giver_id: "giver-1".to_string(),
        receiver_id: "receiver-1".to_string(),
        scheduled_at: start.clone(),
        duration_minutes: 25,
        gross_amount_cents: 5000,
        platform_fee_cents: 750,
        payout_net_cents: 4250,
        payment_ref: Some("pi_test_1".to_string()),
        payout_account: Some("acct_test_1".to_string()),
        status: BookingStatus::Active,
        started_at: Some(start.clone()),
        ended_at: None,
        end_reason: None,
        elapsed_seconds: None,
        refund_gross_cents: None,
        payout_status: PayoutStatus::Pending,
        seeker_credit_earned: false,
        pending_extension: false,
        created_at: start.clone(),
        updated_at: start,
    }
}

/// An open slot on the giver's calendar covering the hour after the
/// session's scheduled end.
pub fn make_availability_slot(id: &str, giver_id: &str) -> AvailabilitySlot {
    AvailabilitySlot {
        id: id.to_string(),
        giver_id: giver_id.to_string(),
        starts_at: format_timestamp(session_start() + chrono::Duration::minutes(20)),
        ends_at: format_timestamp(session_start() + chrono::Duration::minutes(80)),
        booked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_is_the_expected_instant() {
        assert_eq!(
            format_timestamp(session_start()),
            "2026-03-01T10:00:00.000Z"
        );
    }

    #[test]
    fn booking_money_fields_are_consistent() {
        let booking = make_booking("bk-1");
        assert_eq!(
            booking.gross_amount_cents,
            booking.platform_fee_cents + booking.payout_net_cents
        );
        assert_eq!(booking.status, BookingStatus::Active);
        assert!(!booking.pending_extension);
    }

    #[test]
    fn slot_covers_the_post_session_window() {
        let slot = make_availability_slot("slot-1", "giver-1");
        // The 25-minute session ends at minute 25; the slot spans it.
        assert!(slot.starts_at.as_str() < "2026-03-01T10:25:00.000Z");
        assert!(slot.ends_at.as_str() > "2026-03-01T10:55:00.000Z");
        assert!(!slot.booked);
    }
}
