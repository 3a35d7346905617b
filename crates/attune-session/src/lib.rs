// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live session mechanics for Attune.
//!
//! Two pieces live here. [`SessionClock`] derives the current phase of a
//! running session purely from wall-clock time and keeps the
//! `session_states` read model fresh as a side effect. [`ExtensionNegotiator`]
//! drives the end-of-session extension offer: probing the giver's
//! availability, opening a single pending request, and resolving it through
//! acceptance (with payment), decline, or the server-enforced timeout that
//! [`ExpirySweeper`] applies in the background.

pub mod clock;
pub mod negotiator;
pub mod sweeper;

#[cfg(test)]
mod testing;

pub use clock::{phase_at, session_seconds_remaining, NowFn, SessionClock, SESSION_TOTAL_SECS};
pub use negotiator::{ExtensionNegotiator, WindowCheck, WindowState};
pub use sweeper::ExpirySweeper;
