// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot settlement of finished sessions.

use std::sync::Arc;

use attune_bus::{EventBus, SessionEvent};
use attune_core::time::{booking_start, format_timestamp, NowFn};
use attune_core::types::{
    milestone_events, Booking, BookingSettlement, Credit, EndReason, Milestone, PayoutStatus,
    Phase, SessionState,
};
use attune_core::{AttuneError, PaymentGateway, StorageAdapter};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::policy::{self, CreditGrant};

/// Money movements recorded by a finalize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub payout_net_cents: i64,
    pub refund_gross_cents: i64,
    pub credit_amount_cents: i64,
    pub elapsed_seconds: i64,
}

/// Applies the settlement table to bookings, exactly once each.
pub struct SettlementEngine {
    storage: Arc<dyn StorageAdapter>,
    payments: Arc<dyn PaymentGateway>,
    bus: EventBus,
    now_fn: NowFn,
}

impl SettlementEngine {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        payments: Arc<dyn PaymentGateway>,
        bus: EventBus,
    ) -> Self {
        Self {
            storage,
            payments,
            bus,
            now_fn: Arc::new(Utc::now),
        }
    }

    /// Builds an engine with a custom time source.
    pub fn with_now_fn(
        storage: Arc<dyn StorageAdapter>,
        payments: Arc<dyn PaymentGateway>,
        bus: EventBus,
        now_fn: NowFn,
    ) -> Self {
        Self {
            storage,
            payments,
            bus,
            now_fn,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.now_fn)()
    }

    /// Settles a booking for the given end reason.
    ///
    /// 1. Load the booking; an already-settled one is a conflict.
    /// 2. Compute elapsed seconds from the session start, floored at zero.
    /// 3. Apply the settlement table.
    /// 4. Issue the refund, best-effort. The computed amount is recorded
    ///    even when the processor call fails.
    /// 5. Insert credit rows, each best-effort.
    /// 6. Write the settlement through the `ended_at IS NULL` guard; losing
    ///    that race is a conflict, a storage failure is fatal.
    /// 7. Refresh the session projection, record the `session_ended`
    ///    milestone, and publish `SessionEnded`, all best-effort.
    pub async fn finalize(
        &self,
        booking_id: &str,
        end_reason: EndReason,
    ) -> Result<FinalizeOutcome, AttuneError> {
        let booking = self
            .storage
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AttuneError::NotFound {
                entity: "booking",
                id: booking_id.to_string(),
            })?;

        if booking.ended_at.is_some() || booking.payout_status == PayoutStatus::Completed {
            return Err(AttuneError::Conflict(format!(
                "booking {} is already settled",
                booking.id
            )));
        }

        let now = self.now();
        let start = booking_start(&booking)?;
        let elapsed_seconds = (now - start).num_seconds().max(0);

        let outcome = policy::outcome_for(&booking, end_reason);

        if outcome.refund_gross_cents > 0 {
            self.issue_refund(&booking, outcome.refund_gross_cents).await;
        }

        let credit_amount_cents = self.grant_credits(&booking, &outcome.credits, now).await;

        let settlement = BookingSettlement {
            ended_at: format_timestamp(now),
            elapsed_seconds,
            end_reason,
            payout_net_cents: outcome.payout_net_cents,
            refund_gross_cents: outcome.refund_gross_cents,
        };
        let settled = self.storage.settle_booking(&booking.id, &settlement).await?;
        if !settled {
            return Err(AttuneError::Conflict(format!(
                "booking {} is already settled",
                booking.id
            )));
        }

        self.project_ended(&booking, end_reason, elapsed_seconds, now).await;
        self.record_session_ended(&booking, end_reason, elapsed_seconds, now).await;

        #[cfg(feature = "prometheus")]
        attune_metrics::record_finalize(end_reason, elapsed_seconds);

        self.bus.publish(SessionEvent::SessionEnded {
            booking_id: booking.id.clone(),
            end_reason,
        });

        info!(
            booking_id = %booking.id,
            end_reason = %end_reason,
            payout_net_cents = outcome.payout_net_cents,
            refund_gross_cents = outcome.refund_gross_cents,
            credit_amount_cents,
            elapsed_seconds,
            "session settled"
        );

        Ok(FinalizeOutcome {
            payout_net_cents: outcome.payout_net_cents,
            refund_gross_cents: outcome.refund_gross_cents,
            credit_amount_cents,
            elapsed_seconds,
        })
    }

    /// Best-effort refund: failures are logged and counted, never fatal.
    async fn issue_refund(&self, booking: &Booking, amount_cents: i64) {
        let payment_ref = match booking.payment_ref.as_deref() {
            Some(payment_ref) => payment_ref,
            None => {
                warn!(booking_id = %booking.id, "no payment reference on file; refund not issued");
                #[cfg(feature = "prometheus")]
                attune_metrics::record_refund_failure();
                return;
            }
        };

        match self
            .payments
            .create_refund(payment_ref, amount_cents, &booking.id)
            .await
        {
            Ok(receipt) => {
                info!(
                    booking_id = %booking.id,
                    refund_ref = %receipt.refund_ref,
                    amount_cents,
                    "refund issued"
                );
            }
            Err(e) => {
                warn!(booking_id = %booking.id, error = %e, amount_cents, "refund failed");
                #[cfg(feature = "prometheus")]
                attune_metrics::record_refund_failure();
            }
        }
    }

    /// Inserts credit rows individually; one failed insert does not stop the
    /// rest. Returns the computed total.
    async fn grant_credits(
        &self,
        booking: &Booking,
        grants: &[CreditGrant],
        now: DateTime<Utc>,
    ) -> i64 {
        let mut total = 0;
        for grant in grants {
            total += grant.amount_cents;
            let credit = Credit {
                id: Uuid::new_v4().to_string(),
                user_id: booking.receiver_id.clone(),
                amount_cents: grant.amount_cents,
                reason: grant.reason.to_string(),
                booking_id: Some(booking.id.clone()),
                created_at: format_timestamp(now),
            };
            if let Err(e) = self.storage.insert_credit(&credit).await {
                warn!(
                    booking_id = %booking.id,
                    reason = grant.reason,
                    error = %e,
                    "credit insert failed"
                );
            }
        }
        total
    }

    async fn project_ended(
        &self,
        booking: &Booking,
        end_reason: EndReason,
        elapsed_seconds: i64,
        now: DateTime<Utc>,
    ) {
        let state = SessionState {
            booking_id: booking.id.clone(),
            phase: Phase::Ended,
            giver_can_speak: true,
            phase_started_at: format_timestamp(now),
            seconds_remaining_in_phase: 0,
            total_elapsed_seconds: elapsed_seconds,
            pending_extension: false,
            extension_request_id: None,
            end_reason: Some(end_reason),
            computed_at: format_timestamp(now),
        };
        if let Err(e) = self.storage.upsert_session_state(&state).await {
            warn!(booking_id = %booking.id, error = %e, "session state projection failed");
        }
    }

    async fn record_session_ended(
        &self,
        booking: &Booking,
        end_reason: EndReason,
        elapsed_seconds: i64,
        now: DateTime<Utc>,
    ) {
        let milestone = Milestone {
            id: Uuid::new_v4().to_string(),
            event_type: milestone_events::SESSION_ENDED.to_string(),
            user_id: booking.receiver_id.clone(),
            booking_id: Some(booking.id.clone()),
            metadata: Some(
                serde_json::json!({
                    "end_reason": end_reason,
                    "elapsed_seconds": elapsed_seconds,
                })
                .to_string(),
            ),
            created_at: format_timestamp(now),
        };
        if let Err(e) = self.storage.record_milestone(&milestone).await {
            warn!(booking_id = %booking.id, error = %e, "milestone write failed");
        }
    }
}
