// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The settlement table.
//!
//! Every end reason maps to exactly one money outcome. Completed sessions
//! (including a receiver-initiated complete) pay the giver their full net.
//! A giver safety exit still pays the giver, and the receiver is made whole
//! for the platform fee as a credit. Technical failures are resolved
//! all-or-nothing in the giver's favor; nothing is pro-rated. No-shows on
//! either side refund the receiver's gross payment and pay the giver
//! nothing. On top of the table, a receiver who earned the late-join credit
//! gets the platform fee back whenever the session counts as completed.

use attune_core::types::{Booking, EndReason};

/// Ledger reasons for credits granted at settlement.
pub mod credit_reasons {
    /// Platform fee returned to the receiver after a giver safety exit.
    pub const SAFETY_COMPENSATION: &str = "safety_compensation";
    /// Platform fee returned to a receiver who joined late but whose
    /// session still completed.
    pub const LATE_JOIN: &str = "late_join";
}

/// A single credit owed to the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditGrant {
    pub reason: &'static str,
    pub amount_cents: i64,
}

/// What settlement owes each party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub payout_net_cents: i64,
    pub refund_gross_cents: i64,
    pub credits: Vec<CreditGrant>,
}

impl SettlementOutcome {
    /// Total credit amount across all grants.
    pub fn credit_amount_cents(&self) -> i64 {
        self.credits.iter().map(|c| c.amount_cents).sum()
    }
}

/// Applies the settlement table to a booking.
pub fn outcome_for(booking: &Booking, end_reason: EndReason) -> SettlementOutcome {
    let (payout_net_cents, refund_gross_cents, mut credits) = match end_reason {
        EndReason::Completed | EndReason::ReceiverEndComplete => {
            (booking.payout_net_cents, 0, Vec::new())
        }
        EndReason::GiverSafetyExit => (
            booking.payout_net_cents,
            0,
            vec![CreditGrant {
                reason: credit_reasons::SAFETY_COMPENSATION,
                amount_cents: booking.platform_fee_cents,
            }],
        ),
        EndReason::TechnicalFailure => (booking.payout_net_cents, 0, Vec::new()),
        EndReason::ReceiverNoShow | EndReason::GiverNoShow => {
            (0, booking.gross_amount_cents, Vec::new())
        }
    };

    if booking.seeker_credit_earned && end_reason.is_completion() {
        credits.push(CreditGrant {
            reason: credit_reasons::LATE_JOIN,
            amount_cents: booking.platform_fee_cents,
        });
    }

    SettlementOutcome {
        payout_net_cents,
        refund_gross_cents,
        credits,
    }
}
