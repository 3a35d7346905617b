// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock payment gateway for deterministic testing.
//!
//! `MockPaymentGateway` implements [`PaymentGateway`] entirely in memory:
//! every refund and destination charge is recorded for later assertions,
//! and each capability can be switched to fail so tests can exercise the
//! degraded paths (best-effort refunds, `payment_failed` resolutions, the
//! `not_onboarded` fallback).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use attune_core::types::{AccountStatus, AdapterType, ChargeReceipt, HealthStatus, RefundReceipt};
use attune_core::{AttuneError, PaymentGateway, ServiceAdapter};

/// A recorded destination charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeCall {
    pub amount_cents: i64,
    pub net_cents: i64,
    pub destination_account: String,
    pub idempotency_key: String,
}

/// A recorded refund.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundCall {
    pub payment_ref: String,
    pub amount_cents: i64,
    pub idempotency_key: String,
}

/// In-memory payment gateway that records calls and fails on demand.
pub struct MockPaymentGateway {
    charges: Mutex<Vec<ChargeCall>>,
    refunds: Mutex<Vec<RefundCall>>,
    fail_charges: AtomicBool,
    fail_refunds: AtomicBool,
    fail_account_status: AtomicBool,
    account_status: Mutex<AccountStatus>,
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self {
            charges: Mutex::new(Vec::new()),
            refunds: Mutex::new(Vec::new()),
            fail_charges: AtomicBool::new(false),
            fail_refunds: AtomicBool::new(false),
            fail_account_status: AtomicBool::new(false),
            account_status: Mutex::new(AccountStatus::Active),
        }
    }
}

impl MockPaymentGateway {
    /// A fresh gateway with every capability succeeding.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make subsequent destination charges fail.
    pub fn set_fail_charges(&self, fail: bool) {
        self.fail_charges.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent refunds fail.
    pub fn set_fail_refunds(&self, fail: bool) {
        self.fail_refunds.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent account status probes fail.
    pub fn set_fail_account_status(&self, fail: bool) {
        self.fail_account_status.store(fail, Ordering::SeqCst);
    }

    /// Status reported by subsequent account probes.
    pub async fn set_account_status(&self, status: AccountStatus) {
        *self.account_status.lock().await = status;
    }

    /// All destination charges recorded so far, in call order.
    pub async fn charges(&self) -> Vec<ChargeCall> {
        self.charges.lock().await.clone()
    }

    /// All refunds recorded so far, in call order.
    pub async fn refunds(&self) -> Vec<RefundCall> {
        self.refunds.lock().await.clone()
    }
}

#[async_trait]
impl ServiceAdapter for MockPaymentGateway {
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
impl PaymentGateway for MockPaymentGateway {
    async fn create_refund(
        &self,
        payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<RefundReceipt, AttuneError> {
        if self.fail_refunds.load(Ordering::SeqCst) {
            return Err(AttuneError::Payment {
                message: "simulated refund failure".to_string(),
                source: None,
            });
        }
        self.refunds.lock().await.push(RefundCall {
            payment_ref: payment_ref.to_string(),
            amount_cents,
            idempotency_key: idempotency_key.to_string(),
        });
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
        if self.fail_account_status.load(Ordering::SeqCst) {
            return Err(AttuneError::Payment {
                message: "simulated account status failure".to_string(),
                source: None,
            });
        }
        Ok(*self.account_status.lock().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_charges_in_call_order() {
        let gateway = MockPaymentGateway::new();

        gateway
            .create_destination_charge(3000, 2550, "acct_1", "key-1")
            .await
            .unwrap();
        gateway
            .create_destination_charge(1000, 850, "acct_1", "key-2")
            .await
            .unwrap();

        let charges = gateway.charges().await;
        assert_eq!(charges.len(), 2);
        assert_eq!(charges[0].idempotency_key, "key-1");
        assert_eq!(charges[1].net_cents, 850);
    }

    #[tokio::test]
    async fn failing_refunds_do_not_record() {
        let gateway = MockPaymentGateway::new();
        gateway.set_fail_refunds(true);

        let err = gateway.create_refund("pi_1", 5000, "bk-1").await.unwrap_err();
        assert!(matches!(err, AttuneError::Payment { .. }));
        assert!(gateway.refunds().await.is_empty());

        gateway.set_fail_refunds(false);
        gateway.create_refund("pi_1", 5000, "bk-1").await.unwrap();
        assert_eq!(gateway.refunds().await.len(), 1);
    }

    #[tokio::test]
    async fn account_status_is_scriptable() {
        let gateway = MockPaymentGateway::new();
        assert_eq!(
            gateway.account_status("acct_1").await.unwrap(),
            AccountStatus::Active
        );

        gateway.set_account_status(AccountStatus::Pending).await;
        assert_eq!(
            gateway.account_status("acct_1").await.unwrap(),
            AccountStatus::Pending
        );

        gateway.set_fail_account_status(true);
        assert!(gateway.account_status("acct_1").await.is_err());
    }
}
