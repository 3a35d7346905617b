// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-of-session extension negotiation.
//!
//! Near the scheduled end of a session the receiver's client polls
//! [`ExtensionNegotiator::check_window`]. When the remaining time drops under
//! the configured threshold and the giver has an open availability slot right
//! after the session, the receiver is prompted and may open a single pending
//! [`ExtensionRequest`]. The giver then accepts (which charges the receiver
//! and routes the giver's share to their connected account) or declines.
//! Requests the giver never answers are timed out server-side, either lazily
//! on the next respond call or by the background sweep.

use std::sync::Arc;

use attune_bus::{EventBus, SessionEvent};
use attune_config::model::ExtensionConfig;
use attune_core::time::{booking_start, format_timestamp, parse_timestamp};
use attune_core::types::{
    milestone_events, Booking, BookingStatus, ExtensionReply, ExtensionRequest, ExtensionStatus,
    GiverResponse, Milestone, Role,
};
use attune_core::{AttuneError, PaymentGateway, StorageAdapter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{self, SessionClock};

/// What the receiver's client should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    /// Prompt the receiver with the extension offer.
    ReceiverPrompt,
    /// Nothing to show.
    Idle,
}

/// Outcome of an extension window probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCheck {
    pub state: WindowState,
    pub seconds_remaining: i64,
}

/// Drives the extension offer lifecycle for a booking.
pub struct ExtensionNegotiator {
    config: ExtensionConfig,
    storage: Arc<dyn StorageAdapter>,
    payments: Arc<dyn PaymentGateway>,
    bus: EventBus,
    clock: SessionClock,
}

impl ExtensionNegotiator {
    pub fn new(
        config: ExtensionConfig,
        storage: Arc<dyn StorageAdapter>,
        payments: Arc<dyn PaymentGateway>,
        bus: EventBus,
        clock: SessionClock,
    ) -> Self {
        Self {
            config,
            storage,
            payments,
            bus,
            clock,
        }
    }

    /// Decides whether the extension offer should be shown.
    ///
    /// Only the receiver of an active session inside the trigger threshold is
    /// ever prompted, and only when the giver has an unbooked availability
    /// slot covering the window right after the scheduled end. Every other
    /// combination is idle.
    pub async fn check_window(
        &self,
        booking_id: &str,
        role: Role,
    ) -> Result<WindowCheck, AttuneError> {
        let booking = self
            .storage
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AttuneError::NotFound {
                entity: "booking",
                id: booking_id.to_string(),
            })?;

        let now = self.clock.now();
        let start = booking_start(&booking)?;
        let seconds_remaining = clock::session_seconds_remaining((now - start).num_seconds());

        let idle = WindowCheck {
            state: WindowState::Idle,
            seconds_remaining,
        };

        if role != Role::Receiver
            || booking.status != BookingStatus::Active
            || booking.pending_extension
        {
            return Ok(idle);
        }
        if seconds_remaining == 0 || seconds_remaining > self.config.trigger_threshold_secs {
            return Ok(idle);
        }

        // The extension would occupy the giver right after the scheduled end.
        let session_end = start + chrono::Duration::seconds(clock::SESSION_TOTAL_SECS);
        let window_end = session_end + chrono::Duration::minutes(self.config.availability_window_minutes);
        let slot = self
            .storage
            .find_open_slot(
                &booking.giver_id,
                &format_timestamp(session_end),
                &format_timestamp(window_end),
            )
            .await?;

        debug!(
            booking_id = %booking.id,
            seconds_remaining,
            slot_found = slot.is_some(),
            "extension window probe"
        );

        Ok(WindowCheck {
            state: if slot.is_some() {
                WindowState::ReceiverPrompt
            } else {
                WindowState::Idle
            },
            seconds_remaining,
        })
    }

    /// Opens a pending extension request on behalf of the receiver.
    ///
    /// 1. Validate the requester and amount.
    /// 2. Reject with a conflict if a pending request already exists.
    /// 3. Insert the request with a response deadline and flag the booking.
    /// 4. Record the `extension_requested` milestone and publish the event.
    pub async fn request_extension(
        &self,
        booking_id: &str,
        requested_by: &str,
        amount_cents: i64,
    ) -> Result<ExtensionRequest, AttuneError> {
        let booking = self
            .storage
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AttuneError::NotFound {
                entity: "booking",
                id: booking_id.to_string(),
            })?;

        if requested_by != booking.receiver_id {
            return Err(AttuneError::Validation(
                "only the receiver may request an extension".to_string(),
            ));
        }
        if amount_cents <= 0 {
            return Err(AttuneError::Validation(
                "amount_cents must be positive".to_string(),
            ));
        }
        if booking.status != BookingStatus::Active {
            return Err(AttuneError::Conflict(format!(
                "booking {} is not active",
                booking.id
            )));
        }

        if self
            .storage
            .pending_extension_for_booking(&booking.id)
            .await?
            .is_some()
        {
            return Err(AttuneError::Conflict(format!(
                "an extension request is already pending for booking {}",
                booking.id
            )));
        }

        let now = self.clock.now();
        let request = ExtensionRequest {
            id: Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            requested_by: requested_by.to_string(),
            requested_at: format_timestamp(now),
            amount_cents,
            giver_response: None,
            status: ExtensionStatus::Pending,
            expires_at: format_timestamp(
                now + chrono::Duration::seconds(self.config.response_window_secs),
            ),
            resolved_at: None,
        };

        if let Err(e) = self.storage.create_extension_request(&request).await {
            // The unique index is the backstop for a concurrent opener.
            if self
                .storage
                .pending_extension_for_booking(&booking.id)
                .await?
                .is_some()
            {
                return Err(AttuneError::Conflict(format!(
                    "an extension request is already pending for booking {}",
                    booking.id
                )));
            }
            return Err(e);
        }

        self.storage.set_pending_extension(&booking.id, true).await?;

        self.record_milestone_event(
            milestone_events::EXTENSION_REQUESTED,
            requested_by,
            &booking.id,
            serde_json::json!({ "request_id": request.id, "amount_cents": amount_cents }),
        )
        .await;

        #[cfg(feature = "prometheus")]
        attune_metrics::record_extension_requested();

        self.bus.publish(SessionEvent::ExtensionRequested {
            booking_id: booking.id.clone(),
            request_id: request.id.clone(),
            amount_cents,
            expires_at: request.expires_at.clone(),
        });

        info!(
            request_id = %request.id,
            booking_id = %booking.id,
            amount_cents,
            "extension request opened"
        );

        Ok(request)
    }

    /// Applies the giver's answer to a pending request.
    ///
    /// 1. Authorize: only the booking's giver may respond.
    /// 2. A terminal request rejects the reply as an invalid transition.
    /// 3. An overdue request is timed out first, then the reply is rejected.
    /// 4. On accept, charge the receiver with the giver's proportional share
    ///    routed to their connected account, then resolve `pending ->
    ///    accepted`. A failed charge resolves `pending -> payment_failed`
    ///    and surfaces the payment error.
    /// 5. On decline, resolve `pending -> declined`.
    ///
    /// Every resolution clears the booking flag, records its milestone, and
    /// publishes `ExtensionResolved`.
    pub async fn respond(
        &self,
        request_id: &str,
        responder: &str,
        reply: ExtensionReply,
    ) -> Result<ExtensionStatus, AttuneError> {
        let request = self
            .storage
            .get_extension_request(request_id)
            .await?
            .ok_or_else(|| AttuneError::NotFound {
                entity: "extension_request",
                id: request_id.to_string(),
            })?;
        let booking = self
            .storage
            .get_booking(&request.booking_id)
            .await?
            .ok_or_else(|| AttuneError::NotFound {
                entity: "booking",
                id: request.booking_id.clone(),
            })?;

        if responder != booking.giver_id {
            return Err(AttuneError::Validation(
                "only the giver may respond to an extension request".to_string(),
            ));
        }

        if request.status.is_terminal() {
            return Err(AttuneError::InvalidTransition {
                from: request.status.to_string(),
                to: reply_status(reply).to_string(),
            });
        }

        // Server-enforced deadline: an overdue request times out no matter
        // what the reply says.
        if self.clock.now() >= parse_timestamp(&request.expires_at)? {
            self.expire_request(&request).await?;
            return Err(AttuneError::InvalidTransition {
                from: ExtensionStatus::Timeout.to_string(),
                to: reply_status(reply).to_string(),
            });
        }

        match reply {
            ExtensionReply::Accepted => self.accept(&booking, &request).await,
            ExtensionReply::Declined => self.decline(&booking, &request).await,
        }
    }

    async fn accept(
        &self,
        booking: &Booking,
        request: &ExtensionRequest,
    ) -> Result<ExtensionStatus, AttuneError> {
        let charge_result = match booking.payout_account.as_deref() {
            Some(account) => {
                // The giver keeps the same share of the extension as of the
                // original booking.
                let net_cents = if booking.gross_amount_cents > 0 {
                    request.amount_cents * booking.payout_net_cents / booking.gross_amount_cents
                } else {
                    request.amount_cents
                };
                self.payments
                    .create_destination_charge(request.amount_cents, net_cents, account, &request.id)
                    .await
            }
            None => Err(AttuneError::Payment {
                message: format!("booking {} has no payout account on file", booking.id),
                source: None,
            }),
        };

        match charge_result {
            Ok(receipt) => {
                let resolved_at = format_timestamp(self.clock.now());
                let updated = self
                    .storage
                    .resolve_extension_request(
                        &request.id,
                        ExtensionStatus::Accepted,
                        Some(GiverResponse::Accepted),
                        &resolved_at,
                    )
                    .await?;
                if !updated {
                    return Err(self.transition_conflict(&request.id, ExtensionStatus::Accepted).await);
                }

                self.clear_pending_flag(&booking.id).await;
                self.record_milestone_event(
                    milestone_events::EXTENSION_GRANTED,
                    &booking.giver_id,
                    &booking.id,
                    serde_json::json!({
                        "request_id": request.id,
                        "amount_cents": request.amount_cents,
                        "charge_ref": receipt.charge_ref,
                    }),
                )
                .await;

                #[cfg(feature = "prometheus")]
                attune_metrics::record_extension_resolved(ExtensionStatus::Accepted);

                self.bus.publish(SessionEvent::ExtensionResolved {
                    booking_id: booking.id.clone(),
                    request_id: request.id.clone(),
                    status: ExtensionStatus::Accepted,
                });

                info!(
                    request_id = %request.id,
                    booking_id = %booking.id,
                    charge_ref = %receipt.charge_ref,
                    "extension accepted and charged"
                );

                Ok(ExtensionStatus::Accepted)
            }
            Err(charge_err) => {
                warn!(
                    request_id = %request.id,
                    booking_id = %booking.id,
                    error = %charge_err,
                    "extension charge failed"
                );

                let resolved_at = format_timestamp(self.clock.now());
                let updated = self
                    .storage
                    .resolve_extension_request(
                        &request.id,
                        ExtensionStatus::PaymentFailed,
                        Some(GiverResponse::Accepted),
                        &resolved_at,
                    )
                    .await?;
                if updated {
                    self.clear_pending_flag(&booking.id).await;

                    #[cfg(feature = "prometheus")]
                    attune_metrics::record_extension_resolved(ExtensionStatus::PaymentFailed);

                    self.bus.publish(SessionEvent::ExtensionResolved {
                        booking_id: booking.id.clone(),
                        request_id: request.id.clone(),
                        status: ExtensionStatus::PaymentFailed,
                    });
                }

                Err(charge_err)
            }
        }
    }

    async fn decline(
        &self,
        booking: &Booking,
        request: &ExtensionRequest,
    ) -> Result<ExtensionStatus, AttuneError> {
        let resolved_at = format_timestamp(self.clock.now());
        let updated = self
            .storage
            .resolve_extension_request(
                &request.id,
                ExtensionStatus::Declined,
                Some(GiverResponse::Declined),
                &resolved_at,
            )
            .await?;
        if !updated {
            return Err(self.transition_conflict(&request.id, ExtensionStatus::Declined).await);
        }

        self.clear_pending_flag(&booking.id).await;
        self.record_milestone_event(
            milestone_events::EXTENSION_DECLINED,
            &booking.giver_id,
            &booking.id,
            serde_json::json!({ "request_id": request.id }),
        )
        .await;

        #[cfg(feature = "prometheus")]
        attune_metrics::record_extension_resolved(ExtensionStatus::Declined);

        self.bus.publish(SessionEvent::ExtensionResolved {
            booking_id: booking.id.clone(),
            request_id: request.id.clone(),
            status: ExtensionStatus::Declined,
        });

        info!(request_id = %request.id, booking_id = %booking.id, "extension declined");

        Ok(ExtensionStatus::Declined)
    }

    /// Times out every pending request whose deadline has passed. Returns
    /// how many requests this call transitioned.
    pub async fn sweep_expired(&self) -> Result<usize, AttuneError> {
        let now = format_timestamp(self.clock.now());
        let expired = self.storage.expired_pending_extensions(&now).await?;

        let mut count = 0;
        for request in &expired {
            if self.expire_request(request).await? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Applies the timeout transition. Returns false when another writer
    /// resolved the request first.
    async fn expire_request(&self, request: &ExtensionRequest) -> Result<bool, AttuneError> {
        let resolved_at = format_timestamp(self.clock.now());
        let updated = self
            .storage
            .resolve_extension_request(
                &request.id,
                ExtensionStatus::Timeout,
                Some(GiverResponse::Timeout),
                &resolved_at,
            )
            .await?;
        if !updated {
            return Ok(false);
        }

        self.clear_pending_flag(&request.booking_id).await;

        let giver_id = match self.storage.get_booking(&request.booking_id).await {
            Ok(Some(booking)) => booking.giver_id,
            Ok(None) => request.requested_by.clone(),
            Err(e) => {
                warn!(
                    booking_id = %request.booking_id,
                    error = %e,
                    "booking lookup failed during expiry"
                );
                request.requested_by.clone()
            }
        };
        self.record_milestone_event(
            milestone_events::EXTENSION_DECLINED,
            &giver_id,
            &request.booking_id,
            serde_json::json!({ "request_id": request.id, "reason": "timeout" }),
        )
        .await;

        #[cfg(feature = "prometheus")]
        attune_metrics::record_extension_resolved(ExtensionStatus::Timeout);

        self.bus.publish(SessionEvent::ExtensionResolved {
            booking_id: request.booking_id.clone(),
            request_id: request.id.clone(),
            status: ExtensionStatus::Timeout,
        });

        info!(
            request_id = %request.id,
            booking_id = %request.booking_id,
            "extension request timed out"
        );

        Ok(true)
    }

    async fn clear_pending_flag(&self, booking_id: &str) {
        if let Err(e) = self.storage.set_pending_extension(booking_id, false).await {
            warn!(booking_id = %booking_id, error = %e, "failed to clear pending extension flag");
        }
    }

    async fn record_milestone_event(
        &self,
        event_type: &str,
        user_id: &str,
        booking_id: &str,
        metadata: serde_json::Value,
    ) {
        let milestone = Milestone {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.to_string(),
            user_id: user_id.to_string(),
            booking_id: Some(booking_id.to_string()),
            metadata: Some(metadata.to_string()),
            created_at: format_timestamp(self.clock.now()),
        };
        if let Err(e) = self.storage.record_milestone(&milestone).await {
            warn!(booking_id = %booking_id, event_type, error = %e, "milestone write failed");
        }
    }

    /// Builds the invalid-transition error after a guarded update lost the
    /// race, reporting the status that actually won.
    async fn transition_conflict(&self, request_id: &str, to: ExtensionStatus) -> AttuneError {
        let from = match self.storage.get_extension_request(request_id).await {
            Ok(Some(current)) => current.status.to_string(),
            _ => ExtensionStatus::Pending.to_string(),
        };
        AttuneError::InvalidTransition {
            from,
            to: to.to_string(),
        }
    }
}

fn reply_status(reply: ExtensionReply) -> ExtensionStatus {
    match reply {
        ExtensionReply::Accepted => ExtensionStatus::Accepted,
        ExtensionReply::Declined => ExtensionStatus::Declined,
    }
}
