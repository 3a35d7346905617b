// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform credit inserts and lookups. The table is append-only.

use attune_core::types::Credit;
use attune_core::AttuneError;
use rusqlite::params;

use crate::database::Database;

/// Insert a credit row.
pub async fn insert_credit(db: &Database, credit: &Credit) -> Result<(), AttuneError> {
    let credit = credit.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO credits (id, user_id, amount_cents, reason, booking_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    credit.id,
                    credit.user_id,
                    credit.amount_cents,
                    credit.reason,
                    credit.booking_id,
                    credit.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All credits for a user, newest first.
pub async fn credits_for_user(db: &Database, user_id: &str) -> Result<Vec<Credit>, AttuneError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, amount_cents, reason, booking_id, created_at
                 FROM credits WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(Credit {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    amount_cents: row.get(2)?,
                    reason: row.get(3)?,
                    booking_id: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut credits = Vec::new();
            for row in rows {
                credits.push(row?);
            }
            Ok(credits)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::bookings::{create_booking, tests_support::make_booking};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_credit(id: &str, user_id: &str, reason: &str) -> Credit {
        Credit {
            id: id.to_string(),
            user_id: user_id.to_string(),
            amount_cents: 750,
            reason: reason.to_string(),
            booking_id: Some("bk-1".to_string()),
            created_at: "2026-03-01T10:25:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_list_credits() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-1")).await.unwrap();

        insert_credit(&db, &make_credit("cr-1", "receiver-1", "safety_compensation"))
            .await
            .unwrap();
        let mut second = make_credit("cr-2", "receiver-1", "late_join");
        second.created_at = "2026-03-01T10:26:00.000Z".to_string();
        insert_credit(&db, &second).await.unwrap();

        let credits = credits_for_user(&db, "receiver-1").await.unwrap();
        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].reason, "late_join");
        assert_eq!(credits[1].reason, "safety_compensation");
        assert_eq!(credits[0].amount_cents, 750);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn credits_are_scoped_per_user() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-1")).await.unwrap();

        insert_credit(&db, &make_credit("cr-a", "receiver-1", "late_join"))
            .await
            .unwrap();
        insert_credit(&db, &make_credit("cr-b", "receiver-2", "late_join"))
            .await
            .unwrap();

        let for_one = credits_for_user(&db, "receiver-1").await.unwrap();
        assert_eq!(for_one.len(), 1);
        assert_eq!(for_one[0].id, "cr-a");

        let for_none = credits_for_user(&db, "receiver-3").await.unwrap();
        assert!(for_none.is_empty());

        db.close().await.unwrap();
    }
}
