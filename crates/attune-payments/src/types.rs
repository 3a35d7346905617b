// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stripe API response types.
//!
//! Only the fields the gateway reads are modeled; unknown fields are
//! ignored on deserialization.

use serde::Deserialize;

/// Response from `POST /v1/refunds`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    /// Refund object id (e.g., `re_...`).
    pub id: String,
    /// Refunded amount in the smallest currency unit.
    pub amount: i64,
    /// Refund status (e.g., "succeeded", "pending").
    pub status: String,
}

/// Response from `POST /v1/charges` with a destination.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeResponse {
    /// Charge object id (e.g., `ch_...`).
    pub id: String,
    /// Charged amount in the smallest currency unit.
    pub amount: i64,
    /// Charge status (e.g., "succeeded").
    pub status: String,
}

/// Response from `GET /v1/accounts/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    /// Connected account id (e.g., `acct_...`).
    pub id: String,
    /// Whether the account can receive destination charges.
    #[serde(default)]
    pub charges_enabled: bool,
    /// Whether the account finished submitting onboarding details.
    #[serde(default)]
    pub details_submitted: bool,
}

/// Error envelope returned by Stripe on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error details within a Stripe error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error category (e.g., "invalid_request_error", "card_error").
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    #[serde(default)]
    pub message: String,
    /// Machine-readable error code (e.g., "charge_already_refunded").
    #[serde(default)]
    pub code: Option<String>,
}
