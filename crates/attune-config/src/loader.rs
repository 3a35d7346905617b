// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading via Figment.
//!
//! Precedence, lowest to highest: compiled defaults, `/etc/attune/attune.toml`,
//! the XDG user config, `./attune.toml`, then `ATTUNE_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AttuneConfig;

/// Config sections recognized when mapping `ATTUNE_*` environment variables.
const SECTIONS: [&str; 5] = ["service", "storage", "gateway", "payments", "extension"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<AttuneConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used in tests and anywhere config arrives inline.
pub fn load_config_from_str(toml_content: &str) -> Result<AttuneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AttuneConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AttuneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AttuneConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full merge chain, exposed before extraction so diagnostic code can
/// inspect provider metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AttuneConfig::default()))
        .merge(Toml::file("/etc/attune/attune.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("attune/attune.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("attune.toml"))
        .merge(env_provider())
}

/// Environment variable provider mapping `ATTUNE_<SECTION>_<KEY>` to
/// `<section>.<key>`.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `ATTUNE_PAYMENTS_SECRET_KEY`
/// must map to `payments.secret_key`, not `payments.secret.key`. Only the
/// leading section name becomes a dot; the rest of the key is left alone.
fn env_provider() -> Env {
    Env::prefixed("ATTUNE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(rest) = key_str.strip_prefix(section) {
                if let Some(field) = rest.strip_prefix('_') {
                    return format!("{section}.{field}").into();
                }
            }
        }
        key_str.to_string().into()
    })
}
