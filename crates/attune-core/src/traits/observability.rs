// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observability adapter trait for metrics and telemetry.

use async_trait::async_trait;

use crate::error::AttuneError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::MetricEvent;

/// Adapter for recording metrics, traces, and telemetry events.
///
/// Observability adapters are explicit collaborators: services receive one
/// by injection instead of mutating hidden global counters.
#[async_trait]
pub trait ObservabilityAdapter: ServiceAdapter {
    /// Records a metric or telemetry event.
    async fn record(&self, event: MetricEvent) -> Result<(), AttuneError>;
}
