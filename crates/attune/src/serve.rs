// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `attune serve` command implementation.
//!
//! Starts the full Attune service: SQLite storage, the Stripe payment
//! gateway, the session phase clock, extension negotiation with its
//! background expiry sweeper, the settlement engine, and the HTTP gateway.
//! Supports graceful shutdown via signal handlers.

use std::sync::Arc;

use attune_bus::EventBus;
use attune_config::model::AttuneConfig;
use attune_core::error::AttuneError;
use attune_core::{PaymentGateway, StorageAdapter};
use attune_gateway::{start_server, GatewayState, HealthState, ServerConfig};
use attune_payments::StripeGateway;
use attune_session::{ExpirySweeper, ExtensionNegotiator, SessionClock};
use attune_settlement::SettlementEngine;
use attune_storage::SqliteStorage;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `attune serve` command.
///
/// Wires storage, payments, the domain services, and the HTTP gateway, then
/// serves until SIGINT or SIGTERM.
pub async fn run_serve(config: AttuneConfig) -> Result<(), AttuneError> {
    init_tracing(&config.service.log_level);

    info!(service = config.service.name.as_str(), "starting attune serve");

    // Initialize storage.
    let storage: Arc<dyn StorageAdapter> = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };
    info!(
        path = config.storage.database_path.as_str(),
        "storage initialized"
    );

    // Initialize the Stripe payment gateway.
    let payments: Arc<dyn PaymentGateway> = {
        let gateway = StripeGateway::new(&config.payments).map_err(|e| {
            error!(error = %e, "failed to initialize Stripe gateway");
            eprintln!(
                "error: Stripe secret key required. Set payments.secret_key in config or the STRIPE_SECRET_KEY environment variable."
            );
            e
        })?;
        Arc::new(gateway)
    };

    // Initialize Prometheus metrics (if compiled in). Metrics are optional:
    // a recorder that fails to install must not keep the service down.
    #[cfg(feature = "prometheus")]
    let prometheus_adapter = match attune_metrics::PrometheusAdapter::new() {
        Ok(adapter) => {
            info!("prometheus metrics enabled");
            Some(adapter)
        }
        Err(e) => {
            warn!(error = %e, "prometheus initialization failed, continuing without metrics");
            None
        }
    };

    // Build the Prometheus render function for the gateway /metrics endpoint.
    #[cfg(feature = "prometheus")]
    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> =
        prometheus_adapter.as_ref().map(|adapter| {
            let handle = adapter.handle().clone();
            Arc::new(move || handle.render()) as Arc<dyn Fn() -> String + Send + Sync>
        });
    #[cfg(not(feature = "prometheus"))]
    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> = None;

    // Wire the domain services.
    let bus = EventBus::default();
    let clock = SessionClock::new(storage.clone());
    let negotiator = Arc::new(ExtensionNegotiator::new(
        config.extension.clone(),
        storage.clone(),
        payments.clone(),
        bus.clone(),
        clock.clone(),
    ));
    let settlement = Arc::new(SettlementEngine::new(
        storage.clone(),
        payments.clone(),
        bus.clone(),
    ));

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Spawn the extension expiry sweeper.
    let sweeper = ExpirySweeper::new(negotiator.clone(), config.extension.sweep_interval_secs);
    let sweeper_handle = tokio::spawn(sweeper.run(cancel.clone()));
    info!(
        interval_secs = config.extension.sweep_interval_secs,
        "extension expiry sweeper started"
    );

    // Serve HTTP until shutdown.
    let state = GatewayState {
        clock,
        negotiator,
        settlement,
        payments,
        bus,
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    start_server(&server_config, state, cancel.clone()).await?;

    // The token is cancelled by the time the server returns; wait for the
    // sweeper to observe it before closing storage.
    if let Err(e) = sweeper_handle.await {
        warn!(error = %e, "expiry sweeper task exited abnormally");
    }
    storage.close().await?;

    info!("attune serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("attune={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
