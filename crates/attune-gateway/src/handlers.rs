// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Each handler validates its body, delegates to the owning domain service,
//! and maps [`AttuneError`] onto an HTTP status with a structured
//! `{"error": "..."}` body. The payout status probe is the one deliberate
//! exception: a processor failure degrades to `not_onboarded` instead of
//! failing the caller.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use attune_core::types::{AccountStatus, EndReason, ExtensionReply, ExtensionStatus, PhaseView, Role};
use attune_core::AttuneError;
use attune_session::WindowCheck;

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Wraps [`AttuneError`] so handlers can use `?` and still produce the
/// structured error body.
#[derive(Debug)]
pub struct ApiError(pub AttuneError);

impl From<AttuneError> for ApiError {
    fn from(err: AttuneError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for each error class.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AttuneError::Validation(_) => StatusCode::BAD_REQUEST,
            AttuneError::NotFound { .. } => StatusCode::NOT_FOUND,
            AttuneError::Conflict(_) | AttuneError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            AttuneError::Payment { .. } => StatusCode::BAD_GATEWAY,
            AttuneError::Config(_) | AttuneError::Storage { .. } | AttuneError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Json extractor whose rejection carries the standard error body.
///
/// A missing field, a malformed payload, or an unknown enum value all
/// surface as a 400 with `{"error": "..."}` instead of axum's plain-text
/// rejection.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError(AttuneError::Validation(rejection.body_text()))),
        }
    }
}

/// Request body for POST /v1/session/state.
#[derive(Debug, Deserialize)]
pub struct SessionStateRequest {
    pub booking_id: String,
}

/// Request body for POST /v1/session/finalize.
#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub booking_id: String,
    pub end_reason: EndReason,
}

/// Response body for POST /v1/session/finalize.
#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub success: bool,
    pub payout_net_cents: i64,
    pub refund_gross_cents: i64,
    pub credit_amount_cents: i64,
    pub elapsed_seconds: i64,
}

/// Request body for POST /v1/extension/check.
#[derive(Debug, Deserialize)]
pub struct ExtensionCheckRequest {
    pub booking_id: String,
    pub role: Role,
}

/// Request body for POST /v1/extension/request.
#[derive(Debug, Deserialize)]
pub struct ExtensionOpenRequest {
    pub booking_id: String,
    pub requested_by: String,
    pub amount_cents: i64,
}

/// Response body for POST /v1/extension/request.
#[derive(Debug, Serialize)]
pub struct ExtensionOpenResponse {
    pub request_id: String,
    pub expires_at: String,
}

/// Request body for POST /v1/extension/respond.
///
/// `response` only admits the two answers a giver may actively give;
/// timeouts are assigned server-side and rejected here by serde.
#[derive(Debug, Deserialize)]
pub struct ExtensionRespondRequest {
    pub request_id: String,
    pub responder: String,
    pub response: ExtensionReply,
}

/// Response body for POST /v1/extension/respond.
#[derive(Debug, Serialize)]
pub struct ExtensionRespondResponse {
    pub status: ExtensionStatus,
}

/// Request body for POST /v1/payout/account-status.
#[derive(Debug, Deserialize)]
pub struct AccountStatusRequest {
    pub account_ref: String,
}

/// Response body for POST /v1/payout/account-status.
#[derive(Debug, Serialize)]
pub struct AccountStatusResponse {
    pub status: AccountStatus,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}

/// POST /v1/session/state
///
/// Returns the phase view for a booking at this instant.
pub async fn session_state(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<SessionStateRequest>,
) -> Result<Json<PhaseView>, ApiError> {
    let view = state.clock.query(&body.booking_id).await?;
    Ok(Json(view))
}

/// POST /v1/session/finalize
///
/// Settles the booking for the given end reason, once.
pub async fn session_finalize(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    let outcome = state
        .settlement
        .finalize(&body.booking_id, body.end_reason)
        .await?;
    Ok(Json(FinalizeResponse {
        success: true,
        payout_net_cents: outcome.payout_net_cents,
        refund_gross_cents: outcome.refund_gross_cents,
        credit_amount_cents: outcome.credit_amount_cents,
        elapsed_seconds: outcome.elapsed_seconds,
    }))
}

/// POST /v1/extension/check
///
/// Probes whether the extension offer should be shown to the caller.
pub async fn extension_check(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<ExtensionCheckRequest>,
) -> Result<Json<WindowCheck>, ApiError> {
    let check = state
        .negotiator
        .check_window(&body.booking_id, body.role)
        .await?;
    Ok(Json(check))
}

/// POST /v1/extension/request
///
/// Opens a pending extension request on behalf of the receiver.
pub async fn extension_request(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<ExtensionOpenRequest>,
) -> Result<(StatusCode, Json<ExtensionOpenResponse>), ApiError> {
    let request = state
        .negotiator
        .request_extension(&body.booking_id, &body.requested_by, body.amount_cents)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ExtensionOpenResponse {
            request_id: request.id,
            expires_at: request.expires_at,
        }),
    ))
}

/// POST /v1/extension/respond
///
/// Applies the giver's accept or decline to a pending request.
pub async fn extension_respond(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<ExtensionRespondRequest>,
) -> Result<Json<ExtensionRespondResponse>, ApiError> {
    let status = state
        .negotiator
        .respond(&body.request_id, &body.responder, body.response)
        .await?;
    Ok(Json(ExtensionRespondResponse { status }))
}

/// POST /v1/payout/account-status
///
/// Reports the onboarding status of a payout account. A processor failure
/// degrades to `not_onboarded`; this endpoint never fails the caller.
pub async fn payout_account_status(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<AccountStatusRequest>,
) -> Json<AccountStatusResponse> {
    let status = match state.payments.account_status(&body.account_ref).await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(
                account_ref = %body.account_ref,
                error = %e,
                "account status probe failed, reporting not_onboarded"
            );
            AccountStatus::NotOnboarded
        }
    };
    Json(AccountStatusResponse { status })
}

/// GET /health
///
/// Public liveness endpoint.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Prometheus text exposition. Without an installed recorder the body is
/// empty, which scrapers read as "no samples" rather than a failure.
pub async fn get_metrics(State(state): State<GatewayState>) -> String {
    match &state.health.prometheus_render {
        Some(render) => render(),
        None => String::new(),
    }
}
