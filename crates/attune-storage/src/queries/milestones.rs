// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Milestone audit log. Append-only; callers treat writes as best-effort.

use attune_core::types::Milestone;
use attune_core::AttuneError;
use rusqlite::params;

use crate::database::Database;

/// Insert a milestone row.
pub async fn record_milestone(db: &Database, milestone: &Milestone) -> Result<(), AttuneError> {
    let milestone = milestone.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO milestones (id, event_type, user_id, booking_id, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    milestone.id,
                    milestone.event_type,
                    milestone.user_id,
                    milestone.booking_id,
                    milestone.metadata,
                    milestone.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All milestones recorded for a booking, oldest first.
pub async fn milestones_for_booking(
    db: &Database,
    booking_id: &str,
) -> Result<Vec<Milestone>, AttuneError> {
    let booking_id = booking_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, event_type, user_id, booking_id, metadata, created_at
                 FROM milestones WHERE booking_id = ?1 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![booking_id], |row| {
                Ok(Milestone {
                    id: row.get(0)?,
                    event_type: row.get(1)?,
                    user_id: row.get(2)?,
                    booking_id: row.get(3)?,
                    metadata: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut milestones = Vec::new();
            for row in rows {
                milestones.push(row?);
            }
            Ok(milestones)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::types::milestone_events;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_milestone(id: &str, event_type: &str, created_at: &str) -> Milestone {
        Milestone {
            id: id.to_string(),
            event_type: event_type.to_string(),
            user_id: "receiver-1".to_string(),
            booking_id: Some("bk-1".to_string()),
            metadata: None,
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn record_and_list_in_order() {
        let (db, _dir) = setup_db().await;

        record_milestone(
            &db,
            &make_milestone(
                "ms-1",
                milestone_events::EXTENSION_REQUESTED,
                "2026-03-01T10:22:00.000Z",
            ),
        )
        .await
        .unwrap();
        record_milestone(
            &db,
            &make_milestone(
                "ms-2",
                milestone_events::SESSION_ENDED,
                "2026-03-01T10:25:00.000Z",
            ),
        )
        .await
        .unwrap();

        let milestones = milestones_for_booking(&db, "bk-1").await.unwrap();
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[0].event_type, milestone_events::EXTENSION_REQUESTED);
        assert_eq!(milestones[1].event_type, milestone_events::SESSION_ENDED);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn metadata_json_roundtrips() {
        let (db, _dir) = setup_db().await;

        let mut milestone = make_milestone(
            "ms-meta",
            milestone_events::EXTENSION_DECLINED,
            "2026-03-01T10:22:30.000Z",
        );
        milestone.metadata = Some(r#"{"reason":"timeout"}"#.to_string());
        record_milestone(&db, &milestone).await.unwrap();

        let milestones = milestones_for_booking(&db, "bk-1").await.unwrap();
        assert_eq!(milestones.len(), 1);
        let parsed: serde_json::Value =
            serde_json::from_str(milestones[0].metadata.as_deref().unwrap()).unwrap();
        assert_eq!(parsed["reason"], "timeout");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_booking_lists_empty() {
        let (db, _dir) = setup_db().await;
        let milestones = milestones_for_booking(&db, "bk-none").await.unwrap();
        assert!(milestones.is_empty());
        db.close().await.unwrap();
    }
}
