// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use attune_bus::EventBus;
use attune_core::{AttuneError, PaymentGateway};
use attune_session::{ExtensionNegotiator, SessionClock};
use attune_settlement::SettlementEngine;
use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::sse;

/// Health state for the unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl HealthState {
    /// A health state anchored at the current instant, without metrics.
    pub fn started_now() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render: None,
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Phase clock over the booking store.
    pub clock: SessionClock,
    /// Extension offer lifecycle driver.
    pub negotiator: Arc<ExtensionNegotiator>,
    /// One-shot settlement engine.
    pub settlement: Arc<SettlementEngine>,
    /// Payment processor, for the payout onboarding probe.
    pub payments: Arc<dyn PaymentGateway>,
    /// Broadcast bus feeding the SSE subscription route.
    pub bus: EventBus,
    /// Health state for the public endpoints.
    pub health: HealthState,
}

/// Gateway server configuration (mirrors GatewayConfig from attune-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the full gateway router.
///
/// Public routes (`/health`, `/metrics`) and the versioned API share one
/// permissive CORS layer, which also answers pre-flight OPTIONS requests.
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/session/state", post(handlers::session_state))
        .route("/v1/session/finalize", post(handlers::session_finalize))
        .route("/v1/extension/check", post(handlers::extension_check))
        .route("/v1/extension/request", post(handlers::extension_request))
        .route("/v1/extension/respond", post(handlers::extension_respond))
        .route(
            "/v1/extension/subscribe/{booking_id}",
            get(sse::subscribe_booking),
        )
        .route(
            "/v1/payout/account-status",
            post(handlers::payout_account_status),
        )
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until the cancellation
/// token fires, then drains in-flight requests.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), AttuneError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AttuneError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| AttuneError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("8080"));
    }

    #[test]
    fn health_state_is_clone_and_render_is_shared() {
        let render: Arc<dyn Fn() -> String + Send + Sync> =
            Arc::new(|| "# TYPE attune_up gauge\n".to_string());
        let health = HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render: Some(render),
        };
        let cloned = health.clone();
        let rendered = cloned.prometheus_render.as_ref().map(|f| f());
        assert_eq!(rendered.as_deref(), Some("# TYPE attune_up gauge\n"));
    }

    #[test]
    fn started_now_has_no_render_handle() {
        let health = HealthState::started_now();
        assert!(health.prometheus_render.is_none());
        assert!(health.start_time.elapsed().as_secs() < 60);
    }
}
