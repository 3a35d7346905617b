// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use attune_core::types::{EndReason, ExtensionStatus};
use metrics::{describe_counter, describe_histogram};

/// Register all Attune metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "attune_finalize_total",
        "Total sessions finalized, labeled by end reason"
    );
    describe_counter!(
        "attune_refund_failures_total",
        "Refund attempts that failed and were left for reconciliation"
    );
    describe_counter!(
        "attune_extension_requests_total",
        "Total extension requests created"
    );
    describe_counter!(
        "attune_extension_resolved_total",
        "Extension requests resolved, labeled by terminal status"
    );
    describe_histogram!(
        "attune_session_elapsed_seconds",
        "Elapsed session length at finalize, in seconds"
    );
}

/// Record a finalized session and its elapsed length.
pub fn record_finalize(end_reason: EndReason, elapsed_seconds: i64) {
    metrics::counter!("attune_finalize_total", "end_reason" => end_reason.to_string())
        .increment(1);
    metrics::histogram!("attune_session_elapsed_seconds").record(elapsed_seconds as f64);
}

/// Record a refund that failed during settlement.
pub fn record_refund_failure() {
    metrics::counter!("attune_refund_failures_total").increment(1);
}

/// Record a newly created extension request.
pub fn record_extension_requested() {
    metrics::counter!("attune_extension_requests_total").increment(1);
}

/// Record an extension request reaching a terminal status.
pub fn record_extension_resolved(status: ExtensionStatus) {
    metrics::counter!("attune_extension_resolved_total", "status" => status.to_string())
        .increment(1);
}
