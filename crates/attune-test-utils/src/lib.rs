// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Attune integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`TestHarness`] - Full domain stack over a temp SQLite database
//! - [`MockPaymentGateway`] - Payment double that records calls and fails on demand
//! - [`ManualClock`] - Shared time source tests advance by hand
//! - [`fixtures`] - Canonical booking, slot, and request builders

pub mod clock;
pub mod fixtures;
pub mod harness;
pub mod mock_payment;

pub use clock::ManualClock;
pub use harness::TestHarness;
pub use mock_payment::MockPaymentGateway;
