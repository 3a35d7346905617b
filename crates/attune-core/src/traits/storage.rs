// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::AttuneError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{
    AvailabilitySlot, Booking, BookingSettlement, Credit, ExtensionRequest, ExtensionStatus,
    GiverResponse, Milestone, SessionState,
};

/// Adapter for storage and persistence backends.
///
/// Storage adapters manage the database connection lifecycle and expose
/// typed operations for bookings, session state projections, extension
/// requests, credits, milestones, and availability slots.
///
/// The two "guarded" operations return `bool`: `true` means the conditional
/// update matched a row, `false` means another writer got there first. They
/// are the only mutation paths for settled bookings and resolved extension
/// requests.
#[async_trait]
pub trait StorageAdapter: ServiceAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), AttuneError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), AttuneError>;

    // --- Booking operations ---

    async fn create_booking(&self, booking: &Booking) -> Result<(), AttuneError>;

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AttuneError>;

    /// Set or clear the booking's pending-extension flag.
    async fn set_pending_extension(
        &self,
        booking_id: &str,
        pending: bool,
    ) -> Result<(), AttuneError>;

    /// One-shot settlement write, guarded by `ended_at IS NULL`.
    ///
    /// Returns `false` without touching the row when the booking was already
    /// settled by a concurrent caller.
    async fn settle_booking(
        &self,
        booking_id: &str,
        settlement: &BookingSettlement,
    ) -> Result<bool, AttuneError>;

    // --- Session state projection ---

    /// Upsert the phase clock projection for a booking (last write wins).
    async fn upsert_session_state(&self, state: &SessionState) -> Result<(), AttuneError>;

    async fn get_session_state(
        &self,
        booking_id: &str,
    ) -> Result<Option<SessionState>, AttuneError>;

    // --- Extension requests ---

    async fn create_extension_request(
        &self,
        request: &ExtensionRequest,
    ) -> Result<(), AttuneError>;

    async fn get_extension_request(
        &self,
        id: &str,
    ) -> Result<Option<ExtensionRequest>, AttuneError>;

    /// The booking's single pending request, if one exists.
    async fn pending_extension_for_booking(
        &self,
        booking_id: &str,
    ) -> Result<Option<ExtensionRequest>, AttuneError>;

    /// Transition a request out of `pending`, guarded by `status = 'pending'`.
    ///
    /// Returns `false` without touching the row when the request already
    /// reached a terminal state.
    async fn resolve_extension_request(
        &self,
        id: &str,
        status: ExtensionStatus,
        giver_response: Option<GiverResponse>,
        resolved_at: &str,
    ) -> Result<bool, AttuneError>;

    /// Pending requests whose `expires_at` deadline has passed.
    async fn expired_pending_extensions(
        &self,
        now: &str,
    ) -> Result<Vec<ExtensionRequest>, AttuneError>;

    // --- Credits ---

    async fn insert_credit(&self, credit: &Credit) -> Result<(), AttuneError>;

    async fn credits_for_user(&self, user_id: &str) -> Result<Vec<Credit>, AttuneError>;

    // --- Milestones ---

    async fn record_milestone(&self, milestone: &Milestone) -> Result<(), AttuneError>;

    async fn milestones_for_booking(
        &self,
        booking_id: &str,
    ) -> Result<Vec<Milestone>, AttuneError>;

    // --- Availability ---

    async fn insert_availability_slot(&self, slot: &AvailabilitySlot) -> Result<(), AttuneError>;

    /// First open unbooked slot for the giver fully covering `[from, until)`.
    async fn find_open_slot(
        &self,
        giver_id: &str,
        from: &str,
        until: &str,
    ) -> Result<Option<AvailabilitySlot>, AttuneError>;
}
