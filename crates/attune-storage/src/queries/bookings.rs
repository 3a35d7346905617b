// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking CRUD and the guarded settlement write.

use attune_core::types::{Booking, BookingSettlement};
use attune_core::AttuneError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_enum;

const BOOKING_COLUMNS: &str = "id, giver_id, receiver_id, scheduled_at, duration_minutes, \
     gross_amount_cents, platform_fee_cents, payout_net_cents, payment_ref, payout_account, \
     status, started_at, ended_at, end_reason, elapsed_seconds, refund_gross_cents, \
     payout_status, seeker_credit_earned, pending_extension, created_at, updated_at";

fn row_to_booking(row: &rusqlite::Row<'_>) -> Result<Booking, rusqlite::Error> {
    let status: String = row.get(10)?;
    let end_reason: Option<String> = row.get(13)?;
    let payout_status: String = row.get(16)?;
    Ok(Booking {
        id: row.get(0)?,
        giver_id: row.get(1)?,
        receiver_id: row.get(2)?,
        scheduled_at: row.get(3)?,
        duration_minutes: row.get(4)?,
        gross_amount_cents: row.get(5)?,
        platform_fee_cents: row.get(6)?,
        payout_net_cents: row.get(7)?,
        payment_ref: row.get(8)?,
        payout_account: row.get(9)?,
        status: parse_enum(10, status)?,
        started_at: row.get(11)?,
        ended_at: row.get(12)?,
        end_reason: end_reason.map(|r| parse_enum(13, r)).transpose()?,
        elapsed_seconds: row.get(14)?,
        refund_gross_cents: row.get(15)?,
        payout_status: parse_enum(16, payout_status)?,
        seeker_credit_earned: row.get(17)?,
        pending_extension: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
    })
}

/// Insert a new booking.
pub async fn create_booking(db: &Database, booking: &Booking) -> Result<(), AttuneError> {
    let booking = booking.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bookings (id, giver_id, receiver_id, scheduled_at, duration_minutes,
                     gross_amount_cents, platform_fee_cents, payout_net_cents, payment_ref,
                     payout_account, status, started_at, ended_at, end_reason, elapsed_seconds,
                     refund_gross_cents, payout_status, seeker_credit_earned, pending_extension,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21)",
                params![
                    booking.id,
                    booking.giver_id,
                    booking.receiver_id,
                    booking.scheduled_at,
                    booking.duration_minutes,
                    booking.gross_amount_cents,
                    booking.platform_fee_cents,
                    booking.payout_net_cents,
                    booking.payment_ref,
                    booking.payout_account,
                    booking.status.to_string(),
                    booking.started_at,
                    booking.ended_at,
                    booking.end_reason.map(|r| r.to_string()),
                    booking.elapsed_seconds,
                    booking.refund_gross_cents,
                    booking.payout_status.to_string(),
                    booking.seeker_credit_earned,
                    booking.pending_extension,
                    booking.created_at,
                    booking.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a booking by ID.
pub async fn get_booking(db: &Database, id: &str) -> Result<Option<Booking>, AttuneError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_booking);
            match result {
                Ok(booking) => Ok(Some(booking)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set or clear a booking's pending-extension flag.
pub async fn set_pending_extension(
    db: &Database,
    booking_id: &str,
    pending: bool,
) -> Result<(), AttuneError> {
    let booking_id = booking_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE bookings SET pending_extension = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![pending, booking_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One-shot settlement write, guarded by `ended_at IS NULL`.
///
/// Returns `true` when this call performed the settlement, `false` when a
/// concurrent caller already settled the booking. The row is never touched
/// in the `false` case.
pub async fn settle_booking(
    db: &Database,
    booking_id: &str,
    settlement: &BookingSettlement,
) -> Result<bool, AttuneError> {
    let booking_id = booking_id.to_string();
    let settlement = settlement.clone();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE bookings SET
                     status = 'ended',
                     ended_at = ?1,
                     elapsed_seconds = ?2,
                     end_reason = ?3,
                     payout_net_cents = ?4,
                     refund_gross_cents = ?5,
                     payout_status = 'completed',
                     pending_extension = 0,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?6 AND ended_at IS NULL",
                params![
                    settlement.ended_at,
                    settlement.elapsed_seconds,
                    settlement.end_reason.to_string(),
                    settlement.payout_net_cents,
                    settlement.refund_gross_cents,
                    booking_id,
                ],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
