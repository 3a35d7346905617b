// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stripe payment gateway adapter for the Attune session service.
//!
//! This crate implements [`PaymentGateway`] against the Stripe API:
//! refunds toward the receiver, destination charges toward the giver's
//! connected account, and onboarding-status probes.

pub mod client;
pub mod types;

use async_trait::async_trait;
use attune_config::model::PaymentsConfig;
use attune_core::error::AttuneError;
use attune_core::traits::{PaymentGateway, ServiceAdapter};
use attune_core::types::{AccountStatus, AdapterType, ChargeReceipt, HealthStatus, RefundReceipt};
use tracing::{debug, info};

use crate::client::StripeClient;
use crate::types::AccountResponse;

/// Stripe payment adapter implementing [`PaymentGateway`].
///
/// Secret key resolution order: config -> `STRIPE_SECRET_KEY` env var -> error.
pub struct StripeGateway {
    client: StripeClient,
}

impl StripeGateway {
    /// Creates a new Stripe gateway from the given configuration.
    ///
    /// # Secret Key Resolution
    /// 1. `config.payments.secret_key` if set
    /// 2. `STRIPE_SECRET_KEY` environment variable
    /// 3. Returns error if neither is available
    pub fn new(config: &PaymentsConfig) -> Result<Self, AttuneError> {
        let secret_key = resolve_secret_key(&config.secret_key)?;
        let client = StripeClient::new(secret_key, config.api_base.clone(), config.timeout_secs)?;

        info!(api_base = %config.api_base, "Stripe gateway initialized");

        Ok(Self { client })
    }

    /// Creates a gateway with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: StripeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceAdapter for StripeGateway {
    fn name(&self) -> &str {
        "stripe"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Payment
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        // Construction already validated the key shape. A live probe would
        // hit /v1/balance; we keep the health path off the network.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        debug!("Stripe gateway shutting down");
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_refund(
        &self,
        payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<RefundReceipt, AttuneError> {
        let refund = self
            .client
            .create_refund(payment_ref, amount_cents, idempotency_key)
            .await?;

        info!(
            refund_ref = refund.id,
            amount_cents = refund.amount,
            status = refund.status,
            "refund created"
        );

        Ok(RefundReceipt {
            refund_ref: refund.id,
            amount_cents: refund.amount,
        })
    }

    async fn create_destination_charge(
        &self,
        amount_cents: i64,
        net_cents: i64,
        destination_account: &str,
        idempotency_key: &str,
    ) -> Result<ChargeReceipt, AttuneError> {
        let charge = self
            .client
            .create_destination_charge(amount_cents, net_cents, destination_account, idempotency_key)
            .await?;

        if charge.status != "succeeded" {
            return Err(AttuneError::Payment {
                message: format!("destination charge {} has status {}", charge.id, charge.status),
                source: None,
            });
        }

        info!(
            charge_ref = charge.id,
            amount_cents = charge.amount,
            net_cents,
            "destination charge created"
        );

        Ok(ChargeReceipt {
            charge_ref: charge.id,
            amount_cents: charge.amount,
        })
    }

    async fn account_status(&self, account_ref: &str) -> Result<AccountStatus, AttuneError> {
        let account = self.client.retrieve_account(account_ref).await?;
        Ok(map_account_status(&account))
    }
}

/// Maps onboarding flags to the coarse status the domain cares about.
fn map_account_status(account: &AccountResponse) -> AccountStatus {
    if account.charges_enabled && account.details_submitted {
        AccountStatus::Active
    } else if account.details_submitted {
        AccountStatus::Pending
    } else {
        AccountStatus::NotOnboarded
    }
}

/// Resolves the secret key from config or environment.
fn resolve_secret_key(config_key: &Option<String>) -> Result<String, AttuneError> {
    if let Some(key) = config_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }

    std::env::var("STRIPE_SECRET_KEY").map_err(|_| {
        AttuneError::Config(
            "Stripe secret key not found. Set payments.secret_key in config or STRIPE_SECRET_KEY environment variable.".into(),
        )
    })
}
