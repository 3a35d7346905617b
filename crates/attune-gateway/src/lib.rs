// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Attune session platform.
//!
//! A thin axum layer over the domain services: the phase clock, the
//! extension negotiator, and the settlement engine. Handlers validate,
//! delegate, and translate [`attune_core::AttuneError`] into JSON error
//! responses. Live extension activity streams out per booking over SSE.
//!
//! Routes:
//! - `POST /v1/session/state`: current phase view for a booking
//! - `POST /v1/session/finalize`: settle a booking once
//! - `POST /v1/extension/check`: should the receiver be prompted?
//! - `POST /v1/extension/request`: open a pending extension request
//! - `POST /v1/extension/respond`: giver accepts or declines
//! - `GET /v1/extension/subscribe/{booking_id}`: SSE event stream
//! - `POST /v1/payout/account-status`: payout onboarding probe
//! - `GET /health`, `GET /metrics`: public liveness and Prometheus text

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, start_server, GatewayState, HealthState, ServerConfig};
