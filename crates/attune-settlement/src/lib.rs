// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Money movements for finished sessions.
//!
//! [`policy`] holds the pure settlement table: given a booking and the reason
//! the session ended, it decides the giver payout, the receiver refund, and
//! any platform-fee credits. [`SettlementEngine::finalize`] applies that
//! decision exactly once per booking, issuing the refund and credits
//! best-effort and recording the result through a guarded write.

pub mod engine;
pub mod policy;

#[cfg(test)]
mod testing;

pub use engine::{FinalizeOutcome, SettlementEngine};
pub use policy::{outcome_for, CreditGrant, SettlementOutcome};
