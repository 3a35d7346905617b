// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events subscription for live extension activity.
//!
//! `GET /v1/extension/subscribe/{booking_id}` attaches the caller to the
//! broadcast bus and relays the booking's events as they happen:
//!
//! ```text
//! event: extension_requested
//! data: {"id":"...","occurred_at":"...","type":"extension_requested",...}
//! ```
//!
//! Delivery is best-effort. A subscriber that falls behind the channel
//! capacity receives a `lagged` event naming how many events it missed and
//! must re-read the authoritative rows before trusting the stream again.

use std::convert::Infallible;

use attune_bus::BusEvent;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::server::GatewayState;

/// GET /v1/extension/subscribe/{booking_id}
///
/// Streams the booking's bus events until the client disconnects.
pub async fn subscribe_booking(
    State(state): State<GatewayState>,
    Path(booking_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(booking_id = %booking_id, "sse subscriber attached");
    let stream = booking_stream(state.bus.subscribe(), booking_id);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Filters a bus subscription down to one booking's events.
fn booking_stream(
    receiver: broadcast::Receiver<BusEvent>,
    booking_id: String,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(receiver).filter_map(move |item| {
        let mapped = match item {
            Ok(event) if event.event.booking_id() == booking_id => Some(Ok(bus_event(&event))),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => Some(Ok(lagged_event(skipped))),
        };
        futures::future::ready(mapped)
    })
}

/// Renders a bus event as an SSE event named after its kind.
fn bus_event(event: &BusEvent) -> Event {
    let data = serde_json::to_string(event)
        .unwrap_or_else(|_| format!(r#"{{"id":"{}"}}"#, event.id));
    Event::default()
        .id(event.id.clone())
        .event(event.event.kind())
        .data(data)
}

/// Tells a slow subscriber it missed `skipped` events and must resync.
fn lagged_event(skipped: u64) -> Event {
    Event::default()
        .event("lagged")
        .data(format!(r#"{{"skipped":{skipped}}}"#))
}
