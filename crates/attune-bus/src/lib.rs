// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process typed event bus for extension and session notifications.
//!
//! A thin wrapper over `tokio::sync::broadcast`. Delivery is at-least-once
//! and lossy: a subscriber that lags past the channel capacity observes
//! `Lagged` and must re-read authoritative rows. Publishing never blocks
//! and never fails; with no subscribers the event is dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use attune_core::types::{EndReason, ExtensionStatus};

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 256;

/// Domain events published by the negotiator and the settlement engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A receiver asked for an extension; the giver should be prompted.
    ExtensionRequested {
        booking_id: String,
        request_id: String,
        amount_cents: i64,
        expires_at: String,
    },
    /// A pending extension request reached a terminal state.
    ExtensionResolved {
        booking_id: String,
        request_id: String,
        status: ExtensionStatus,
    },
    /// The session was finalized.
    SessionEnded {
        booking_id: String,
        end_reason: EndReason,
    },
}

impl SessionEvent {
    /// The booking this event belongs to. Used for per-booking SSE filtering.
    pub fn booking_id(&self) -> &str {
        match self {
            SessionEvent::ExtensionRequested { booking_id, .. }
            | SessionEvent::ExtensionResolved { booking_id, .. }
            | SessionEvent::SessionEnded { booking_id, .. } => booking_id,
        }
    }

    /// Stable event name, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::ExtensionRequested { .. } => "extension_requested",
            SessionEvent::ExtensionResolved { .. } => "extension_resolved",
            SessionEvent::SessionEnded { .. } => "session_ended",
        }
    }
}

/// A published event with its delivery metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    /// Unique event id (UUID v4), usable as an SSE event id.
    pub id: String,
    /// RFC 3339 UTC publish timestamp.
    pub occurred_at: String,
    #[serde(flatten)]
    pub event: SessionEvent,
}

impl BusEvent {
    fn now(event: SessionEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            occurred_at: attune_core::time::format_timestamp(chrono::Utc::now()),
            event,
        }
    }
}

/// Broadcast bus shared by the negotiator, settlement engine, and gateway.
///
/// Cloning is cheap; all clones publish into and subscribe to the same
/// channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the stamped event. Events published with no subscribers are
    /// dropped silently.
    pub fn publish(&self, event: SessionEvent) -> BusEvent {
        let stamped = BusEvent::now(event);
        let receivers = self.sender.receiver_count();
        debug!(
            event_id = %stamped.id,
            kind = stamped.event.kind(),
            booking_id = %stamped.event.booking_id(),
            receivers,
            "bus publish"
        );
        // send only errors when there are no receivers; that is fine here.
        let _ = self.sender.send(stamped.clone());
        stamped
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requested_event(booking_id: &str) -> SessionEvent {
        SessionEvent::ExtensionRequested {
            booking_id: booking_id.to_string(),
            request_id: "req-1".to_string(),
            amount_cents: 3000,
            expires_at: "2026-03-01T10:22:30.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let published = bus.publish(requested_event("bk-1"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, published.id);
        assert_eq!(received.event.booking_id(), "bk-1");
        assert_eq!(received.event.kind(), "extension_requested");
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        let stamped = bus.publish(SessionEvent::SessionEnded {
            booking_id: "bk-none".to_string(),
            end_reason: EndReason::Completed,
        });
        assert!(!stamped.id.is_empty());
    }

    #[tokio::test]
    async fn multiple_subscribers_all_receive() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        bus.publish(SessionEvent::ExtensionResolved {
            booking_id: "bk-multi".to_string(),
            request_id: "req-m".to_string(),
            status: ExtensionStatus::Accepted,
        });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.id, e2.id);
    }

    #[tokio::test]
    async fn lagged_subscriber_observes_lag_then_continues() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for i in 0..5 {
            bus.publish(requested_event(&format!("bk-{i}")));
        }

        // Capacity 2: the oldest three were overwritten.
        let err = rx.recv().await.unwrap_err();
        assert!(matches!(err, broadcast::error::RecvError::Lagged(3)));

        // After the lag the newest retained events still arrive.
        let next = rx.recv().await.unwrap();
        assert_eq!(next.event.booking_id(), "bk-3");
    }

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let event = SessionEvent::SessionEnded {
            booking_id: "bk-json".to_string(),
            end_reason: EndReason::GiverSafetyExit,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "session_ended");
        assert_eq!(value["end_reason"], "giver_safety_exit");
    }

    #[test]
    fn bus_event_flattens_payload() {
        let stamped = BusEvent::now(requested_event("bk-flat"));
        let value = serde_json::to_value(&stamped).unwrap();
        assert_eq!(value["type"], "extension_requested");
        assert_eq!(value["booking_id"], "bk-flat");
        assert!(value["id"].is_string());
        assert!(value["occurred_at"].is_string());
    }
}
