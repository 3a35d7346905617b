// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and positive timing windows.

use crate::diagnostic::ConfigError;
use crate::model::AttuneConfig;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &AttuneConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate log_level is a recognized level
    if !VALID_LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level must be one of trace, debug, info, warn, error, got `{}`",
                config.service.log_level
            ),
        });
    }

    // Validate gateway host is not empty
    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    // Validate gateway host looks like a valid IP or hostname
    if !config.gateway.host.trim().is_empty() {
        let addr = config.gateway.host.trim();
        // Accept valid IPv4, IPv6, or hostname patterns
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{addr}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate payments api_base is an http(s) URL
    if !config.payments.api_base.starts_with("http://")
        && !config.payments.api_base.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "payments.api_base must start with http:// or https://, got `{}`",
                config.payments.api_base
            ),
        });
    }

    if config.payments.timeout_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "payments.timeout_secs must be at least 1, got {}",
                config.payments.timeout_secs
            ),
        });
    }

    // Validate extension timing windows are positive
    if config.extension.trigger_threshold_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "extension.trigger_threshold_secs must be at least 1, got {}",
                config.extension.trigger_threshold_secs
            ),
        });
    }

    if config.extension.response_window_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "extension.response_window_secs must be at least 1, got {}",
                config.extension.response_window_secs
            ),
        });
    }

    if config.extension.availability_window_minutes < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "extension.availability_window_minutes must be at least 1, got {}",
                config.extension.availability_window_minutes
            ),
        });
    }

    if config.extension.sweep_interval_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "extension.sweep_interval_secs must be at least 1, got {}",
                config.extension.sweep_interval_secs
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = AttuneConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = AttuneConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn invalid_log_level_fails_validation() {
        let mut config = AttuneConfig::default();
        config.service.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn zero_trigger_threshold_fails_validation() {
        let mut config = AttuneConfig::default();
        config.extension.trigger_threshold_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("trigger_threshold_secs"))));
    }

    #[test]
    fn negative_response_window_fails_validation() {
        let mut config = AttuneConfig::default();
        config.extension.response_window_secs = -10;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("response_window_secs"))));
    }

    #[test]
    fn non_http_api_base_fails_validation() {
        let mut config = AttuneConfig::default();
        config.payments.api_base = "ftp://api.example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("api_base"))));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = AttuneConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.gateway.port = 9090;
        config.storage.database_path = "/tmp/test.db".to_string();
        config.payments.api_base = "http://localhost:12111".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn multiple_errors_collected_in_one_pass() {
        let mut config = AttuneConfig::default();
        config.storage.database_path = "".to_string();
        config.extension.trigger_threshold_secs = 0;
        config.extension.sweep_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn extension_section_deserializes_with_defaults() {
        let toml_str = r#"
[extension]
trigger_threshold_secs = 240
"#;
        let config: AttuneConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.extension.trigger_threshold_secs, 240);
        assert_eq!(config.extension.response_window_secs, 30);
        assert_eq!(config.extension.availability_window_minutes, 30);
    }

    #[test]
    fn sections_deny_unknown_fields() {
        let toml_str = r#"
[extension]
trigger_threshold_secs = 240
unknown_knob = 5
"#;
        let result = toml::from_str::<AttuneConfig>(toml_str);
        assert!(result.is_err());
    }
}
