// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Attune session platform.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Attune configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttuneConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Payment processor settings.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Extension negotiation settings.
    #[serde(default)]
    pub extension: ExtensionConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "attune".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("attune").join("attune.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("attune.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the server to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Payment processor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Processor secret key. `None` requires environment variable for serve.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Base URL of the processor API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_payments_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            api_base: default_api_base(),
            timeout_secs: default_payments_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_payments_timeout_secs() -> u64 {
    30
}

/// Extension negotiation configuration.
///
/// Controls when the receiver is prompted, how long the giver has to
/// respond, and how aggressively expired requests are swept.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionConfig {
    /// Remaining session seconds at which the receiver may be prompted.
    /// Must be positive so an already-ended session never prompts.
    #[serde(default = "default_trigger_threshold_secs")]
    pub trigger_threshold_secs: i64,

    /// Seconds the giver has to answer a pending request before it times out.
    #[serde(default = "default_response_window_secs")]
    pub response_window_secs: i64,

    /// Length of the extension window probed on the giver's calendar,
    /// starting at the scheduled end of the session.
    #[serde(default = "default_availability_window_minutes")]
    pub availability_window_minutes: i64,

    /// Interval between sweeps for expired pending requests.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            trigger_threshold_secs: default_trigger_threshold_secs(),
            response_window_secs: default_response_window_secs(),
            availability_window_minutes: default_availability_window_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_trigger_threshold_secs() -> i64 {
    180
}

fn default_response_window_secs() -> i64 {
    30
}

fn default_availability_window_minutes() -> i64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    5
}
