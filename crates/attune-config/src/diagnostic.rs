// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rich config error reporting.
//!
//! Figment deserialization failures are translated into miette diagnostics
//! carrying a source span into the offending TOML file, the set of keys the
//! section accepts, and a fuzzy-matched "did you mean?" suggestion
//! (Jaro-Winkler via strsim).

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// 0.75 is chosen to catch common typos like `prot` -> `port`,
/// `trigger_treshold_secs` -> `trigger_threshold_secs`, while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error, ready for miette's graphical renderer.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key the config model does not recognize.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(attune::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, when one is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value whose type does not match the config model.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(attune::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key the config model requires but did not receive.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(attune::config::missing_key),
        help("add `{key} = <value>` to your attune.toml")
    )]
    MissingKey { key: String },

    /// A well-formed value that fails a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(attune::config::validation))]
    Validation { message: String },

    /// Anything figment reports that has no dedicated variant.
    #[error("configuration error: {0}")]
    #[diagnostic(code(attune::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Translate a `figment::Error` into one diagnostic per underlying error.
///
/// Figment collects every failure it can find in one `Error`; iterating it
/// yields them individually so a user sees all problems in a single run.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| classify_error(error, toml_sources))
        .collect()
}

fn classify_error(error: figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let valid: Vec<&str> = expected.to_vec();
            let (span, src) = find_source_span(&error, field, toml_sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, &valid),
                valid_keys: valid.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.clone().into_owned(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error
                .path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("."),
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.to_string(),
            span: None,
            src: None,
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Locate the offending key in whichever TOML source the error came from.
///
/// Both halves are optional: env-var errors have no file, and a file error
/// whose content we could not re-read still renders without a span.
fn find_source_span(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    match locate_field(error, field, toml_sources) {
        Some((span, src)) => (Some(span), Some(src)),
        None => (None, None),
    }
}

fn locate_field(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let path = error
        .metadata
        .as_ref()?
        .source
        .as_ref()
        .and_then(|s| match s {
            figment::Source::File(p) => Some(p.display().to_string()),
            _ => None,
        })?;
    let (_, content) = toml_sources.iter().find(|(p, _)| *p == path)?;
    let section: Vec<String> = error.path.iter().map(ToString::to_string).collect();
    let offset = find_key_offset(content, &section, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(path, content.clone()),
    ))
}

/// Byte offset of `field` within `content`, scoped to the `[section]` named
/// by the first element of `path` (or the whole file for top-level keys).
///
/// Matches only keys at the start of a line, so a value containing the same
/// text never produces a span.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
    };

    let mut pos = start;
    for line in content[start..].lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(field) {
            // Require a delimiter after the key so `port` never matches `ports`.
            if rest.starts_with([' ', '\t', '=']) {
                return Some(pos + (line.len() - trimmed.len()));
            }
        }
        pos += line.len() + 1;
    }
    None
}

/// The valid key most similar to `unknown`, if any clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
