// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `attune-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use attune_core::types::{
    AvailabilitySlot, Booking, BookingSettlement, Credit, ExtensionRequest, Milestone,
    SessionState,
};
