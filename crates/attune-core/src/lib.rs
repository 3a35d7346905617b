// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Attune session platform.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Attune workspace. Collaborator adapters
//! (storage, payments, observability) implement traits defined here.

pub mod error;
pub mod time;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AttuneError;
pub use types::{
    AccountStatus, AdapterType, AvailabilitySlot, Booking, BookingSettlement, BookingStatus,
    ChargeReceipt, Credit, EndReason, ExtensionReply, ExtensionRequest, ExtensionStatus,
    GiverResponse, HealthStatus, MetricEvent, Milestone, PayoutStatus, Phase, PhaseView,
    RefundReceipt, Role, SessionState,
};

// Re-export all adapter traits at crate root.
pub use traits::{ObservabilityAdapter, PaymentGateway, ServiceAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn attune_error_has_all_variants() {
        // Verify all 8 error variants exist and can be constructed.
        let _config = AttuneError::Config("test".into());
        let _validation = AttuneError::Validation("test".into());
        let _not_found = AttuneError::NotFound {
            entity: "booking",
            id: "b-1".into(),
        };
        let _conflict = AttuneError::Conflict("test".into());
        let _transition = AttuneError::InvalidTransition {
            from: "accepted".into(),
            to: "declined".into(),
        };
        let _storage = AttuneError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _payment = AttuneError::Payment {
            message: "test".into(),
            source: None,
        };
        let _internal = AttuneError::Internal("test".into());
    }

    #[test]
    fn end_reason_round_trips_through_display_and_from_str() {
        let variants = [
            EndReason::Completed,
            EndReason::ReceiverEndComplete,
            EndReason::GiverSafetyExit,
            EndReason::TechnicalFailure,
            EndReason::ReceiverNoShow,
            EndReason::GiverNoShow,
        ];
        for variant in &variants {
            let s = variant.to_string();
            let parsed = EndReason::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
        assert_eq!(EndReason::GiverSafetyExit.to_string(), "giver_safety_exit");
    }

    #[test]
    fn end_reason_completion_classification() {
        assert!(EndReason::Completed.is_completion());
        assert!(EndReason::ReceiverEndComplete.is_completion());
        assert!(!EndReason::GiverSafetyExit.is_completion());
        assert!(!EndReason::TechnicalFailure.is_completion());
        assert!(!EndReason::ReceiverNoShow.is_completion());
        assert!(!EndReason::GiverNoShow.is_completion());
    }

    #[test]
    fn end_reason_serde_uses_snake_case() {
        let json = serde_json::to_string(&EndReason::ReceiverNoShow).expect("should serialize");
        assert_eq!(json, "\"receiver_no_show\"");
        let parsed: EndReason =
            serde_json::from_str("\"giver_safety_exit\"").expect("should deserialize");
        assert_eq!(parsed, EndReason::GiverSafetyExit);
    }

    #[test]
    fn extension_status_terminal_classification() {
        assert!(!ExtensionStatus::Pending.is_terminal());
        assert!(ExtensionStatus::Accepted.is_terminal());
        assert!(ExtensionStatus::Declined.is_terminal());
        assert!(ExtensionStatus::Timeout.is_terminal());
        assert!(ExtensionStatus::PaymentFailed.is_terminal());
    }

    #[test]
    fn phase_serde_uses_lowercase() {
        let json = serde_json::to_string(&Phase::Transmission).expect("should serialize");
        assert_eq!(json, "\"transmission\"");
        let parsed: Phase = serde_json::from_str("\"emergence\"").expect("should deserialize");
        assert_eq!(parsed, Phase::Emergence);
    }

    #[test]
    fn extension_reply_rejects_timeout() {
        // Timeouts are server-assigned; a client may only accept or decline.
        assert!(serde_json::from_str::<ExtensionReply>("\"accepted\"").is_ok());
        assert!(serde_json::from_str::<ExtensionReply>("\"declined\"").is_ok());
        assert!(serde_json::from_str::<ExtensionReply>("\"timeout\"").is_err());
    }

    #[test]
    fn adapter_type_round_trips() {
        let variants = [
            AdapterType::Payment,
            AdapterType::Storage,
            AdapterType::Observability,
        ];
        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // This test verifies that all adapter trait modules compile and are
        // accessible through the public API. If any module is missing or has
        // a compile error, this test won't compile.
        fn _assert_service_adapter<T: ServiceAdapter>() {}
        fn _assert_payment_gateway<T: PaymentGateway>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_observability_adapter<T: ObservabilityAdapter>() {}
    }
}
