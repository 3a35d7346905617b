// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use attune_config::model::StorageConfig;
use attune_core::types::{
    AvailabilitySlot, Booking, BookingSettlement, Credit, ExtensionRequest, ExtensionStatus,
    GiverResponse, Milestone, SessionState,
};
use attune_core::{AdapterType, AttuneError, HealthStatus, ServiceAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, AttuneError> {
        self.db.get().ok_or_else(|| AttuneError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ServiceAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), AttuneError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| AttuneError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), AttuneError> {
        self.db()?.close().await
    }

    // --- Booking operations ---

    async fn create_booking(&self, booking: &Booking) -> Result<(), AttuneError> {
        queries::bookings::create_booking(self.db()?, booking).await
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AttuneError> {
        queries::bookings::get_booking(self.db()?, id).await
    }

    async fn set_pending_extension(
        &self,
        booking_id: &str,
        pending: bool,
    ) -> Result<(), AttuneError> {
        queries::bookings::set_pending_extension(self.db()?, booking_id, pending).await
    }

    async fn settle_booking(
        &self,
        booking_id: &str,
        settlement: &BookingSettlement,
    ) -> Result<bool, AttuneError> {
        queries::bookings::settle_booking(self.db()?, booking_id, settlement).await
    }

    // --- Session state projection ---

    async fn upsert_session_state(&self, state: &SessionState) -> Result<(), AttuneError> {
        queries::session_states::upsert_session_state(self.db()?, state).await
    }

    async fn get_session_state(
        &self,
        booking_id: &str,
    ) -> Result<Option<SessionState>, AttuneError> {
        queries::session_states::get_session_state(self.db()?, booking_id).await
    }

    // --- Extension requests ---

    async fn create_extension_request(
        &self,
        request: &ExtensionRequest,
    ) -> Result<(), AttuneError> {
        queries::extensions::create_extension_request(self.db()?, request).await
    }

    async fn get_extension_request(
        &self,
        id: &str,
    ) -> Result<Option<ExtensionRequest>, AttuneError> {
        queries::extensions::get_extension_request(self.db()?, id).await
    }

    async fn pending_extension_for_booking(
        &self,
        booking_id: &str,
    ) -> Result<Option<ExtensionRequest>, AttuneError> {
        queries::extensions::pending_extension_for_booking(self.db()?, booking_id).await
    }

    async fn resolve_extension_request(
        &self,
        id: &str,
        status: ExtensionStatus,
        giver_response: Option<GiverResponse>,
        resolved_at: &str,
    ) -> Result<bool, AttuneError> {
        queries::extensions::resolve_extension_request(
            self.db()?,
            id,
            status,
            giver_response,
            resolved_at,
        )
        .await
    }

    async fn expired_pending_extensions(
        &self,
        now: &str,
    ) -> Result<Vec<ExtensionRequest>, AttuneError> {
        queries::extensions::expired_pending_extensions(self.db()?, now).await
    }

    // --- Credits ---

    async fn insert_credit(&self, credit: &Credit) -> Result<(), AttuneError> {
        queries::credits::insert_credit(self.db()?, credit).await
    }

    async fn credits_for_user(&self, user_id: &str) -> Result<Vec<Credit>, AttuneError> {
        queries::credits::credits_for_user(self.db()?, user_id).await
    }

    // --- Milestones ---

    async fn record_milestone(&self, milestone: &Milestone) -> Result<(), AttuneError> {
        queries::milestones::record_milestone(self.db()?, milestone).await
    }

    async fn milestones_for_booking(
        &self,
        booking_id: &str,
    ) -> Result<Vec<Milestone>, AttuneError> {
        queries::milestones::milestones_for_booking(self.db()?, booking_id).await
    }

    // --- Availability ---

    async fn insert_availability_slot(&self, slot: &AvailabilitySlot) -> Result<(), AttuneError> {
        queries::availability::insert_availability_slot(self.db()?, slot).await
    }

    async fn find_open_slot(
        &self,
        giver_id: &str,
        from: &str,
        until: &str,
    ) -> Result<Option<AvailabilitySlot>, AttuneError> {
        queries::availability::find_open_slot(self.db()?, giver_id, from, until).await
    }
}
