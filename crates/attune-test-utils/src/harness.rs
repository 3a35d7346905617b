// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete domain stack (temp SQLite storage,
//! event bus, mock payment gateway, and a manual clock) and wires the
//! phase clock, extension negotiator, and settlement engine over it. Tests
//! seed bookings through `storage`, move `clock`, and drive the services
//! directly.

use std::sync::Arc;

use attune_bus::EventBus;
use attune_config::model::{ExtensionConfig, StorageConfig};
use attune_config::AttuneConfig;
use attune_core::{AttuneError, PaymentGateway, StorageAdapter};
use attune_session::{ExtensionNegotiator, SessionClock};
use attune_settlement::SettlementEngine;
use attune_storage::SqliteStorage;
use chrono::{DateTime, Utc};

use crate::clock::ManualClock;
use crate::fixtures;
use crate::mock_payment::MockPaymentGateway;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    start: DateTime<Utc>,
    extension: ExtensionConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            start: fixtures::session_start(),
            extension: ExtensionConfig::default(),
        }
    }

    /// Anchor the manual clock at the given instant instead of the fixture
    /// default.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Use custom extension negotiation settings.
    pub fn with_extension_config(mut self, extension: ExtensionConfig) -> Self {
        self.extension = extension;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, AttuneError> {
        // Temp directory for SQLite, cleaned up when the harness drops.
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| AttuneError::Storage { source: e.into() })?;
        let database_path = temp_dir
            .path()
            .join("attune-test.db")
            .to_string_lossy()
            .into_owned();

        let storage_config = StorageConfig {
            database_path,
            wal_mode: true,
        };
        let storage = SqliteStorage::new(storage_config.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let clock = ManualClock::starting_at(self.start);
        let bus = EventBus::default();
        let payments = MockPaymentGateway::new();

        let session_clock = SessionClock::with_now_fn(storage.clone(), clock.now_fn());
        let negotiator = Arc::new(ExtensionNegotiator::new(
            self.extension.clone(),
            storage.clone(),
            payments.clone() as Arc<dyn PaymentGateway>,
            bus.clone(),
            session_clock.clone(),
        ));
        let settlement = Arc::new(SettlementEngine::with_now_fn(
            storage.clone(),
            payments.clone() as Arc<dyn PaymentGateway>,
            bus.clone(),
            clock.now_fn(),
        ));

        let config = AttuneConfig {
            storage: storage_config,
            extension: self.extension,
            ..AttuneConfig::default()
        };

        Ok(TestHarness {
            storage,
            payments,
            bus,
            clock,
            session_clock,
            negotiator,
            settlement,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// Mock payment gateway, scriptable per capability.
    pub payments: Arc<MockPaymentGateway>,
    /// Broadcast event bus.
    pub bus: EventBus,
    /// Manual time source shared by every service below.
    pub clock: ManualClock,
    /// Phase clock over the temp storage.
    pub session_clock: SessionClock,
    /// Extension negotiator.
    pub negotiator: Arc<ExtensionNegotiator>,
    /// Settlement engine.
    pub settlement: Arc<SettlementEngine>,
    /// Assembled configuration matching the harness wiring.
    pub config: AttuneConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::types::Role;
    use attune_session::WindowState;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        // Storage should be functional and empty.
        let missing = harness.storage.get_booking("none").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn seeded_booking_round_trips() {
        let harness = TestHarness::builder().build().await.unwrap();
        let booking = fixtures::make_booking("bk-1");
        harness.storage.create_booking(&booking).await.unwrap();

        let loaded = harness.storage.get_booking("bk-1").await.unwrap().unwrap();
        assert_eq!(loaded.id, "bk-1");
        assert_eq!(loaded.payout_net_cents, 4250);
    }

    #[tokio::test]
    async fn wired_negotiator_sees_clock_and_slots() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness
            .storage
            .create_booking(&fixtures::make_booking("bk-1"))
            .await
            .unwrap();
        harness
            .storage
            .insert_availability_slot(&fixtures::make_availability_slot("slot-1", "giver-1"))
            .await
            .unwrap();

        // 180 seconds before the scheduled end.
        harness.clock.advance(chrono::Duration::seconds(1320));

        let check = harness
            .negotiator
            .check_window("bk-1", Role::Receiver)
            .await
            .unwrap();
        assert_eq!(check.state, WindowState::ReceiverPrompt);
        assert_eq!(check.seconds_remaining, 180);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        h1.storage
            .create_booking(&fixtures::make_booking("bk-1"))
            .await
            .unwrap();

        assert!(h1.storage.get_booking("bk-1").await.unwrap().is_some());
        assert!(h2.storage.get_booking("bk-1").await.unwrap().is_none());
    }
}
