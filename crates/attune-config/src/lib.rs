// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Attune session platform.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and Elm-style diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use attune_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Service name: {}", config.service.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::AttuneConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to rich miette diagnostics with typo suggestions
///
/// Returns either a valid `AttuneConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<AttuneConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            // Read TOML source files for error source span information
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<AttuneConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    // Local config
    if let Ok(content) = std::fs::read_to_string("attune.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("attune.toml").display().to_string())
            .unwrap_or_else(|_| "attune.toml".to_string());
        sources.push((path, content));
    }

    // XDG user config
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("attune/attune.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    // System config
    let system_path = std::path::Path::new("/etc/attune/attune.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_empty_string_yields_defaults() {
        let config = load_and_validate_str("").unwrap();
        assert_eq!(config.service.name, "attune");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.extension.trigger_threshold_secs, 180);
        assert_eq!(config.extension.response_window_secs, 30);
        assert!(config.payments.secret_key.is_none());
    }

    #[test]
    fn load_overrides_from_toml() {
        let toml = r#"
[gateway]
host = "0.0.0.0"
port = 9191

[payments]
secret_key = "sk_test_123"
api_base = "http://localhost:12111"

[extension]
trigger_threshold_secs = 240
"#;
        let config = load_and_validate_str(toml).unwrap();
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.gateway.port, 9191);
        assert_eq!(config.payments.secret_key.as_deref(), Some("sk_test_123"));
        assert_eq!(config.extension.trigger_threshold_secs, 240);
        // Untouched sections keep defaults
        assert_eq!(config.extension.response_window_secs, 30);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn unknown_key_produces_suggestion() {
        let toml = r#"
[gateway]
prot = 8080
"#;
        let errors = load_and_validate_str(toml).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "prot" && suggestion.as_deref() == Some("port")
        )));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let toml = r#"
[extension]
response_window_secs = 0
"#;
        let errors = load_and_validate_str(toml).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("response_window_secs"))));
    }
}
