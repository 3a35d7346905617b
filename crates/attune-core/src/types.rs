// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Attune platform.
//!
//! Money is always integer cents (i64). Timestamps are RFC 3339 UTC strings
//! as stored in SQLite. Identifiers are UUID v4 strings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Phase of a session, derived purely from elapsed time.
///
/// The schedule is fixed: transmission, reflection, validation, emergence,
/// then ended. Only the transmission phase restricts who may speak.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Transmission,
    Reflection,
    Validation,
    Emergence,
    Ended,
}

/// Why a session ended. Drives the settlement policy table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    ReceiverEndComplete,
    GiverSafetyExit,
    TechnicalFailure,
    ReceiverNoShow,
    GiverNoShow,
}

impl EndReason {
    /// True for reasons that count as a completed session.
    pub fn is_completion(self) -> bool {
        matches!(self, EndReason::Completed | EndReason::ReceiverEndComplete)
    }
}

/// Which side of the pairing a caller is acting as.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Giver,
    Receiver,
}

/// Booking lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Scheduled,
    Active,
    Ended,
}

/// Whether the settlement write has run for a booking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Completed,
}

/// Status of an extension request. `Pending` is the only non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExtensionStatus {
    Pending,
    Accepted,
    Declined,
    Timeout,
    PaymentFailed,
}

impl ExtensionStatus {
    /// True once the request can never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExtensionStatus::Pending)
    }
}

/// How the giver resolved (or failed to resolve) an extension request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GiverResponse {
    Accepted,
    Declined,
    Timeout,
}

/// The two answers a giver may actively give to an extension request.
///
/// Timeouts are server-assigned, never submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionReply {
    Accepted,
    Declined,
}

/// Payout account onboarding status as reported by the payment processor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Pending,
    NotOnboarded,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::ServiceAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Payment,
    Storage,
    Observability,
}

/// A metric or telemetry event for an observability adapter.
#[derive(Debug, Clone)]
pub enum MetricEvent {
    Counter {
        name: String,
        value: u64,
        labels: Vec<(String, String)>,
    },
    Gauge {
        name: String,
        value: f64,
        labels: Vec<(String, String)>,
    },
    Histogram {
        name: String,
        value: f64,
        labels: Vec<(String, String)>,
    },
}

/// Server-computed timing view of a session at a single instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseView {
    pub phase: Phase,
    pub giver_can_speak: bool,
    pub seconds_remaining_in_phase: i64,
    pub total_elapsed_seconds: i64,
}

/// A scheduled giver/receiver pairing. The aggregate root every other
/// entity references by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub giver_id: String,
    pub receiver_id: String,
    pub scheduled_at: String,
    pub duration_minutes: i64,
    pub gross_amount_cents: i64,
    pub platform_fee_cents: i64,
    pub payout_net_cents: i64,
    /// Processor reference for the receiver's captured payment.
    pub payment_ref: Option<String>,
    /// Processor reference for the giver's payout account.
    pub payout_account: Option<String>,
    pub status: BookingStatus,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub end_reason: Option<EndReason>,
    pub elapsed_seconds: Option<i64>,
    pub refund_gross_cents: Option<i64>,
    pub payout_status: PayoutStatus,
    /// Earned mid-session (e.g. the giver joined late); grants an extra
    /// platform-fee credit if the session completes.
    pub seeker_credit_earned: bool,
    /// True while exactly one extension request is pending.
    pub pending_extension: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Cached projection of the phase clock for one booking.
///
/// Recomputed on every clock query, last write wins. Never authoritative;
/// safe to drop and regenerate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub booking_id: String,
    pub phase: Phase,
    pub giver_can_speak: bool,
    pub phase_started_at: String,
    pub seconds_remaining_in_phase: i64,
    pub total_elapsed_seconds: i64,
    pub pending_extension: bool,
    pub extension_request_id: Option<String>,
    pub end_reason: Option<EndReason>,
    pub computed_at: String,
}

/// A receiver's request to extend the session past its scheduled end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRequest {
    pub id: String,
    pub booking_id: String,
    pub requested_by: String,
    pub requested_at: String,
    pub amount_cents: i64,
    pub giver_response: Option<GiverResponse>,
    pub status: ExtensionStatus,
    /// Server-side response deadline. Authoritative over any client countdown.
    pub expires_at: String,
    pub resolved_at: Option<String>,
}

/// Platform credit granted to a user. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credit {
    pub id: String,
    pub user_id: String,
    pub amount_cents: i64,
    pub reason: String,
    pub booking_id: Option<String>,
    pub created_at: String,
}

/// Append-only audit record of a notable event. Writes are best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub event_type: String,
    pub user_id: String,
    pub booking_id: Option<String>,
    /// Optional JSON blob with event-specific detail.
    pub metadata: Option<String>,
    pub created_at: String,
}

/// Milestone event types recorded by the negotiation and settlement flows.
pub mod milestone_events {
    pub const EXTENSION_REQUESTED: &str = "extension_requested";
    pub const EXTENSION_GRANTED: &str = "extension_granted";
    pub const EXTENSION_DECLINED: &str = "extension_declined";
    pub const SESSION_ENDED: &str = "session_ended";
}

/// An open calendar slot on a giver's schedule, seeded by the listing system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: String,
    pub giver_id: String,
    pub starts_at: String,
    pub ends_at: String,
    pub booked: bool,
}

/// Fields written to a booking by the one-shot settlement update.
#[derive(Debug, Clone)]
pub struct BookingSettlement {
    pub ended_at: String,
    pub elapsed_seconds: i64,
    pub end_reason: EndReason,
    pub payout_net_cents: i64,
    pub refund_gross_cents: i64,
}

/// Receipt for a completed refund.
#[derive(Debug, Clone)]
pub struct RefundReceipt {
    pub refund_ref: String,
    pub amount_cents: i64,
}

/// Receipt for a completed destination charge.
#[derive(Debug, Clone)]
pub struct ChargeReceipt {
    pub charge_ref: String,
    pub amount_cents: i64,
}
