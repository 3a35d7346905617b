// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Giver calendar slots. Seeded externally; the negotiator only reads.
//!
//! RFC 3339 UTC strings compare correctly as text, so window containment is
//! plain string comparison in SQL.

use attune_core::types::AvailabilitySlot;
use attune_core::AttuneError;
use rusqlite::params;

use crate::database::Database;

/// Insert an availability slot.
pub async fn insert_availability_slot(
    db: &Database,
    slot: &AvailabilitySlot,
) -> Result<(), AttuneError> {
    let slot = slot.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO availability_slots (id, giver_id, starts_at, ends_at, booked)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![slot.id, slot.giver_id, slot.starts_at, slot.ends_at, slot.booked],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// First open unbooked slot for the giver fully covering `[from, until)`.
pub async fn find_open_slot(
    db: &Database,
    giver_id: &str,
    from: &str,
    until: &str,
) -> Result<Option<AvailabilitySlot>, AttuneError> {
    let giver_id = giver_id.to_string();
    let from = from.to_string();
    let until = until.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, giver_id, starts_at, ends_at, booked
                 FROM availability_slots
                 WHERE giver_id = ?1 AND booked = 0 AND starts_at <= ?2 AND ends_at >= ?3
                 ORDER BY starts_at ASC
                 LIMIT 1",
            )?;
            let result = stmt.query_row(params![giver_id, from, until], |row| {
                Ok(AvailabilitySlot {
                    id: row.get(0)?,
                    giver_id: row.get(1)?,
                    starts_at: row.get(2)?,
                    ends_at: row.get(3)?,
                    booked: row.get(4)?,
                })
            });
            match result {
                Ok(slot) => Ok(Some(slot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
