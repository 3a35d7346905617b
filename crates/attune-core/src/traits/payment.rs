// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment capability trait: refunds, destination charges, account probes.
//!
//! The settlement engine and extension negotiator only touch money through
//! this interface. Processor internals (card handling, ledgers) stay behind it.

use async_trait::async_trait;

use crate::error::AttuneError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{AccountStatus, ChargeReceipt, RefundReceipt};

/// Adapter for the external payment processor.
///
/// Callers supply an idempotency key with every money-moving call so a
/// retried request cannot refund or charge twice.
#[async_trait]
pub trait PaymentGateway: ServiceAdapter {
    /// Refund part or all of a captured payment back to the payer.
    async fn create_refund(
        &self,
        payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<RefundReceipt, AttuneError>;

    /// Charge the receiver and route the net amount to the giver's payout account.
    async fn create_destination_charge(
        &self,
        amount_cents: i64,
        net_cents: i64,
        destination_account: &str,
        idempotency_key: &str,
    ) -> Result<ChargeReceipt, AttuneError>;

    /// Look up onboarding status for a payout account.
    async fn account_status(&self, account_ref: &str) -> Result<AccountStatus, AttuneError>;
}
