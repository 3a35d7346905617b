// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phase clock projection rows. Last write wins, never authoritative.

use attune_core::types::SessionState;
use attune_core::AttuneError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_enum;

/// Upsert the projection row for a booking.
pub async fn upsert_session_state(db: &Database, state: &SessionState) -> Result<(), AttuneError> {
    let state = state.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO session_states (booking_id, phase, giver_can_speak,
                     phase_started_at, seconds_remaining_in_phase, total_elapsed_seconds,
                     pending_extension, extension_request_id, end_reason, computed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(booking_id) DO UPDATE SET
                     phase = excluded.phase,
                     giver_can_speak = excluded.giver_can_speak,
                     phase_started_at = excluded.phase_started_at,
                     seconds_remaining_in_phase = excluded.seconds_remaining_in_phase,
                     total_elapsed_seconds = excluded.total_elapsed_seconds,
                     pending_extension = excluded.pending_extension,
                     extension_request_id = excluded.extension_request_id,
                     end_reason = excluded.end_reason,
                     computed_at = excluded.computed_at",
                params![
                    state.booking_id,
                    state.phase.to_string(),
                    state.giver_can_speak,
                    state.phase_started_at,
                    state.seconds_remaining_in_phase,
                    state.total_elapsed_seconds,
                    state.pending_extension,
                    state.extension_request_id,
                    state.end_reason.map(|r| r.to_string()),
                    state.computed_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the projection row for a booking.
pub async fn get_session_state(
    db: &Database,
    booking_id: &str,
) -> Result<Option<SessionState>, AttuneError> {
    let booking_id = booking_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT booking_id, phase, giver_can_speak, phase_started_at,
                        seconds_remaining_in_phase, total_elapsed_seconds, pending_extension,
                        extension_request_id, end_reason, computed_at
                 FROM session_states WHERE booking_id = ?1",
            )?;
            let result = stmt.query_row(params![booking_id], |row| {
                let phase: String = row.get(1)?;
                let end_reason: Option<String> = row.get(8)?;
                Ok(SessionState {
                    booking_id: row.get(0)?,
                    phase: parse_enum(1, phase)?,
                    giver_can_speak: row.get(2)?,
                    phase_started_at: row.get(3)?,
                    seconds_remaining_in_phase: row.get(4)?,
                    total_elapsed_seconds: row.get(5)?,
                    pending_extension: row.get(6)?,
                    extension_request_id: row.get(7)?,
                    end_reason: end_reason.map(|r| parse_enum(8, r)).transpose()?,
                    computed_at: row.get(9)?,
                })
            });
            match result {
                Ok(state) => Ok(Some(state)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
