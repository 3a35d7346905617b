// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures shared by the unit tests in this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use attune_config::model::StorageConfig;
use attune_core::time::format_timestamp;
use attune_core::types::{
    AccountStatus, AdapterType, AvailabilitySlot, Booking, BookingStatus, ChargeReceipt,
    ExtensionRequest, ExtensionStatus, HealthStatus, PayoutStatus, RefundReceipt,
};
use attune_core::{AttuneError, PaymentGateway, ServiceAdapter, StorageAdapter};
use attune_storage::SqliteStorage;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

/// Anchor instant used by every fixture: 2026-03-01 10:00:00 UTC.
pub(crate) fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
}

pub(crate) fn make_booking(id: &str) -> Booking {
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

pub(crate) fn make_extension_request(
    id: &str,
    booking_id: &str,
    status: ExtensionStatus,
) -> ExtensionRequest {
    let requested_at = session_start() + chrono::Duration::seconds(1400);
    ExtensionRequest {
        id: id.to_string(),
        booking_id: booking_id.to_string(),
        requested_by: "receiver-1".to_string(),
        requested_at: format_timestamp(requested_at),
        amount_cents: 3000,
        giver_response: None,
        status,
        expires_at: format_timestamp(requested_at + chrono::Duration::seconds(30)),
        resolved_at: None,
    }
}

pub(crate) fn make_slot(id: &str, giver_id: &str) -> AvailabilitySlot {
    AvailabilitySlot {
        id: id.to_string(),
        giver_id: giver_id.to_string(),
        starts_at: format_timestamp(session_start() + chrono::Duration::minutes(20)),
        ends_at: format_timestamp(session_start() + chrono::Duration::minutes(60)),
        booked: false,
    }
}

pub(crate) async fn setup_storage() -> (tempfile::TempDir, Arc<dyn StorageAdapter>) {
    let tmp = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: tmp.path().join("attune-test.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };
    let storage = SqliteStorage::new(config);
    storage.initialize().await.unwrap();
    (tmp, Arc::new(storage))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChargeCall {
    pub(crate) amount_cents: i64,
    pub(crate) net_cents: i64,
    pub(crate) destination_account: String,
    pub(crate) idempotency_key: String,
}

/// Payment gateway double that records charges and fails on demand.
#[derive(Default)]
pub(crate) struct MockPayment {
    pub(crate) charges: Mutex<Vec<ChargeCall>>,
    pub(crate) fail_charges: AtomicBool,
}

impl MockPayment {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn set_fail_charges(&self, fail: bool) {
        self.fail_charges.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ServiceAdapter for MockPayment {
    fn name(&self) -> &str {
        "mock-payment"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Payment
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for MockPayment {
    async fn create_refund(
        &self,
        _payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<RefundReceipt, AttuneError> {
        Ok(RefundReceipt {
            refund_ref: format!("re_mock_{idempotency_key}"),
            amount_cents,
        })
    }

    async fn create_destination_charge(
        &self,
        amount_cents: i64,
        net_cents: i64,
        destination_account: &str,
        idempotency_key: &str,
    ) -> Result<ChargeReceipt, AttuneError> {
        if self.fail_charges.load(Ordering::SeqCst) {
            return Err(AttuneError::Payment {
                message: "simulated charge failure".to_string(),
                source: None,
            });
        }
        self.charges.lock().await.push(ChargeCall {
            amount_cents,
            net_cents,
            destination_account: destination_account.to_string(),
            idempotency_key: idempotency_key.to_string(),
        });
        Ok(ChargeReceipt {
            charge_ref: format!("ch_mock_{idempotency_key}"),
            amount_cents,
        })
    }

    async fn account_status(&self, _account_ref: &str) -> Result<AccountStatus, AttuneError> {
        Ok(AccountStatus::Active)
    }
}
