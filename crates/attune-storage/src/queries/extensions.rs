// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extension request lifecycle: create, read, and guarded resolution.
//!
//! A partial unique index on `(booking_id) WHERE status = 'pending'` backs
//! the one-pending-per-booking invariant; resolution is a conditional update
//! that only ever moves a row out of `pending`.

use attune_core::types::{ExtensionRequest, ExtensionStatus, GiverResponse};
use attune_core::AttuneError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_enum;

const REQUEST_COLUMNS: &str = "id, booking_id, requested_by, requested_at, amount_cents, \
     giver_response, status, expires_at, resolved_at";

fn row_to_request(row: &rusqlite::Row<'_>) -> Result<ExtensionRequest, rusqlite::Error> {
    let giver_response: Option<String> = row.get(5)?;
    let status: String = row.get(6)?;
    Ok(ExtensionRequest {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        requested_by: row.get(2)?,
        requested_at: row.get(3)?,
        amount_cents: row.get(4)?,
        giver_response: giver_response.map(|r| parse_enum(5, r)).transpose()?,
        status: parse_enum(6, status)?,
        expires_at: row.get(7)?,
        resolved_at: row.get(8)?,
    })
}

/// Insert a new extension request.
///
/// Fails with a constraint error if the booking already has a pending one.
pub async fn create_extension_request(
    db: &Database,
    request: &ExtensionRequest,
) -> Result<(), AttuneError> {
    let request = request.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO extension_requests (id, booking_id, requested_by, requested_at,
                     amount_cents, giver_response, status, expires_at, resolved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    request.id,
                    request.booking_id,
                    request.requested_by,
                    request.requested_at,
                    request.amount_cents,
                    request.giver_response.map(|r| r.to_string()),
                    request.status.to_string(),
                    request.expires_at,
                    request.resolved_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an extension request by ID.
pub async fn get_extension_request(
    db: &Database,
    id: &str,
) -> Result<Option<ExtensionRequest>, AttuneError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_COLUMNS} FROM extension_requests WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_request);
            match result {
                Ok(request) => Ok(Some(request)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The booking's single pending request, if one exists.
pub async fn pending_extension_for_booking(
    db: &Database,
    booking_id: &str,
) -> Result<Option<ExtensionRequest>, AttuneError> {
    let booking_id = booking_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_COLUMNS} FROM extension_requests
                 WHERE booking_id = ?1 AND status = 'pending'"
            ))?;
            let result = stmt.query_row(params![booking_id], row_to_request);
            match result {
                Ok(request) => Ok(Some(request)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a request out of `pending`, guarded by `status = 'pending'`.
///
/// Returns `true` when this call performed the transition, `false` when the
/// request had already reached a terminal state.
pub async fn resolve_extension_request(
    db: &Database,
    id: &str,
    status: ExtensionStatus,
    giver_response: Option<GiverResponse>,
    resolved_at: &str,
) -> Result<bool, AttuneError> {
    let id = id.to_string();
    let resolved_at = resolved_at.to_string();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE extension_requests SET
                     status = ?1,
                     giver_response = ?2,
                     resolved_at = ?3
                 WHERE id = ?4 AND status = 'pending'",
                params![
                    status.to_string(),
                    giver_response.map(|r| r.to_string()),
                    resolved_at,
                    id,
                ],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Pending requests whose `expires_at` deadline has passed.
pub async fn expired_pending_extensions(
    db: &Database,
    now: &str,
) -> Result<Vec<ExtensionRequest>, AttuneError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_COLUMNS} FROM extension_requests
                 WHERE status = 'pending' AND expires_at <= ?1
                 ORDER BY expires_at ASC"
            ))?;
            let rows = stmt.query_map(params![now], row_to_request)?;
            let mut requests = Vec::new();
            for row in rows {
                requests.push(row?);
            }
            Ok(requests)
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

    fn make_request(id: &str, booking_id: &str) -> ExtensionRequest {
        ExtensionRequest {
            id: id.to_string(),
            booking_id: booking_id.to_string(),
            requested_by: "receiver-1".to_string(),
            requested_at: "2026-03-01T10:22:00.000Z".to_string(),
            amount_cents: 3000,
            giver_response: None,
            status: ExtensionStatus::Pending,
            expires_at: "2026-03-01T10:22:30.000Z".to_string(),
            resolved_at: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_request_roundtrips() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-1")).await.unwrap();

        create_extension_request(&db, &make_request("req-1", "bk-1"))
            .await
            .unwrap();

        let got = get_extension_request(&db, "req-1").await.unwrap().unwrap();
        assert_eq!(got.booking_id, "bk-1");
        assert_eq!(got.status, ExtensionStatus::Pending);
        assert_eq!(got.amount_cents, 3000);
        assert!(got.giver_response.is_none());
        assert!(got.resolved_at.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_pending_for_same_booking_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-dup")).await.unwrap();

        create_extension_request(&db, &make_request("req-a", "bk-dup"))
            .await
            .unwrap();

        let result = create_extension_request(&db, &make_request("req-b", "bk-dup")).await;
        assert!(result.is_err(), "unique index should reject second pending");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pending_lookup_finds_only_pending() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-find")).await.unwrap();
        create_extension_request(&db, &make_request("req-f", "bk-find"))
            .await
            .unwrap();

        let pending = pending_extension_for_booking(&db, "bk-find")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.id, "req-f");

        resolve_extension_request(
            &db,
            "req-f",
            ExtensionStatus::Declined,
            Some(GiverResponse::Declined),
            "2026-03-01T10:22:10.000Z",
        )
        .await
        .unwrap();

        let after = pending_extension_for_booking(&db, "bk-find").await.unwrap();
        assert!(after.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn resolve_writes_response_and_timestamp() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-res")).await.unwrap();
        create_extension_request(&db, &make_request("req-r", "bk-res"))
            .await
            .unwrap();

        let applied = resolve_extension_request(
            &db,
            "req-r",
            ExtensionStatus::Accepted,
            Some(GiverResponse::Accepted),
            "2026-03-01T10:22:15.000Z",
        )
        .await
        .unwrap();
        assert!(applied);

        let got = get_extension_request(&db, "req-r").await.unwrap().unwrap();
        assert_eq!(got.status, ExtensionStatus::Accepted);
        assert_eq!(got.giver_response, Some(GiverResponse::Accepted));
        assert_eq!(got.resolved_at.as_deref(), Some("2026-03-01T10:22:15.000Z"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn terminal_request_cannot_be_resolved_again() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-sticky")).await.unwrap();
        create_extension_request(&db, &make_request("req-s", "bk-sticky"))
            .await
            .unwrap();

        assert!(resolve_extension_request(
            &db,
            "req-s",
            ExtensionStatus::Timeout,
            Some(GiverResponse::Timeout),
            "2026-03-01T10:22:31.000Z",
        )
        .await
        .unwrap());

        // A late accept must not overwrite the timeout.
        let applied = resolve_extension_request(
            &db,
            "req-s",
            ExtensionStatus::Accepted,
            Some(GiverResponse::Accepted),
            "2026-03-01T10:22:40.000Z",
        )
        .await
        .unwrap();
        assert!(!applied);

        let got = get_extension_request(&db, "req-s").await.unwrap().unwrap();
        assert_eq!(got.status, ExtensionStatus::Timeout);
        assert_eq!(got.giver_response, Some(GiverResponse::Timeout));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn new_pending_allowed_after_resolution() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-again")).await.unwrap();
        create_extension_request(&db, &make_request("req-1st", "bk-again"))
            .await
            .unwrap();
        resolve_extension_request(
            &db,
            "req-1st",
            ExtensionStatus::Declined,
            Some(GiverResponse::Declined),
            "2026-03-01T10:22:20.000Z",
        )
        .await
        .unwrap();

        // Partial unique index only covers pending rows.
        create_extension_request(&db, &make_request("req-2nd", "bk-again"))
            .await
            .unwrap();

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn expired_scan_returns_only_overdue_pending() {
        let (db, _dir) = setup_db().await;
        create_booking(&db, &make_booking("bk-ex1")).await.unwrap();
        create_booking(&db, &make_booking("bk-ex2")).await.unwrap();
        create_booking(&db, &make_booking("bk-ex3")).await.unwrap();

        let mut overdue = make_request("req-over", "bk-ex1");
        overdue.expires_at = "2026-03-01T10:22:30.000Z".to_string();
        create_extension_request(&db, &overdue).await.unwrap();

        let mut fresh = make_request("req-fresh", "bk-ex2");
        fresh.expires_at = "2026-03-01T10:30:00.000Z".to_string();
        create_extension_request(&db, &fresh).await.unwrap();

        let mut resolved = make_request("req-done", "bk-ex3");
        resolved.expires_at = "2026-03-01T10:20:00.000Z".to_string();
        create_extension_request(&db, &resolved).await.unwrap();
        resolve_extension_request(
            &db,
            "req-done",
            ExtensionStatus::Accepted,
            Some(GiverResponse::Accepted),
            "2026-03-01T10:19:00.000Z",
        )
        .await
        .unwrap();

        let expired = expired_pending_extensions(&db, "2026-03-01T10:23:00.000Z")
            .await
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, "req-over");

        db.close().await.unwrap();
    }
}
