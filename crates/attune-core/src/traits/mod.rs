// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Attune's external collaborators.
//!
//! All adapters extend the [`ServiceAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod observability;
pub mod payment;
pub mod storage;

// Re-export all traits at the traits module level for convenience.
pub use adapter::ServiceAdapter;
pub use observability::ObservabilityAdapter;
pub use payment::PaymentGateway;
pub use storage::StorageAdapter;
