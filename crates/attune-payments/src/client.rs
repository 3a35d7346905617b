// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Stripe API.
//!
//! Provides [`StripeClient`] which handles request construction, bearer
//! authentication, form encoding, idempotency keys, and transient error
//! retry.

use std::time::Duration;

use attune_core::AttuneError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use crate::types::{AccountResponse, ApiErrorResponse, ChargeResponse, RefundResponse};

/// Header carrying the caller-supplied idempotency key on mutating calls.
const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// HTTP client for Stripe API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 502, 503).
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl StripeClient {
    /// Creates a new Stripe API client.
    ///
    /// # Arguments
    /// * `secret_key` - Stripe secret key (`sk_...`) for bearer authentication
    /// * `api_base` - API base URL (e.g., "https://api.stripe.com")
    /// * `timeout_secs` - per-request timeout
    pub fn new(
        secret_key: String,
        api_base: String,
        timeout_secs: u64,
    ) -> Result<Self, AttuneError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {secret_key}")).map_err(|e| {
                AttuneError::Config(format!("invalid secret key header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AttuneError::Payment {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: api_base.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Issues a refund against a captured payment.
    ///
    /// `POST /v1/refunds` with `payment_intent` and `amount`. The caller's
    /// idempotency key makes a retried call return the original refund
    /// instead of creating a second one.
    pub async fn create_refund(
        &self,
        payment_ref: &str,
        amount_cents: i64,
        idempotency_key: &str,
    ) -> Result<RefundResponse, AttuneError> {
        let url = format!("{}/v1/refunds", self.base_url);
        let params = [
            ("payment_intent", payment_ref.to_string()),
            ("amount", amount_cents.to_string()),
        ];

        let body = self
            .execute_with_retry("refund", || {
                self.client
                    .post(&url)
                    .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
                    .form(&params)
            })
            .await?;
        parse_body(&body)
    }

    /// Charges the full amount and routes the net share to a connected account.
    ///
    /// `POST /v1/charges` with `destination[account]` and
    /// `destination[amount]`; the difference stays with the platform.
    pub async fn create_destination_charge(
        &self,
        amount_cents: i64,
        net_cents: i64,
        destination_account: &str,
        idempotency_key: &str,
    ) -> Result<ChargeResponse, AttuneError> {
        let url = format!("{}/v1/charges", self.base_url);
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("destination[account]", destination_account.to_string()),
            ("destination[amount]", net_cents.to_string()),
        ];

        let body = self
            .execute_with_retry("destination charge", || {
                self.client
                    .post(&url)
                    .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
                    .form(&params)
            })
            .await?;
        parse_body(&body)
    }

    /// Retrieves a connected account's onboarding state.
    pub async fn retrieve_account(
        &self,
        account_ref: &str,
    ) -> Result<AccountResponse, AttuneError> {
        let url = format!("{}/v1/accounts/{account_ref}", self.base_url);

        let body = self
            .execute_with_retry("account retrieve", || self.client.get(&url))
            .await?;
        parse_body(&body)
    }

    /// Sends a request, retrying once on transient errors after a 1-second
    /// delay, and returns the success body.
    ///
    /// The builder closure is invoked fresh on every attempt; mutating calls
    /// must set their idempotency key inside it so retries reuse the key.
    async fn execute_with_retry(
        &self,
        context: &'static str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<String, AttuneError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, context, "retrying Stripe request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = build().send().await.map_err(|e| AttuneError::Payment {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, attempt, context, "Stripe response received");

            if status.is_success() {
                return response.text().await.map_err(|e| AttuneError::Payment {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient Stripe error, will retry");
                last_error = Some(AttuneError::Payment {
                    message: format!("Stripe returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "Stripe error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("Stripe returned {status}: {body}")
            };
            return Err(AttuneError::Payment {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| AttuneError::Payment {
            message: format!("{context} request failed after retries"),
            source: None,
        }))
    }
}

/// Parses a success body into the expected response type.
fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, AttuneError> {
    serde_json::from_str(body).map_err(|e| AttuneError::Payment {
        message: format!("failed to parse Stripe response: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
