// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations, one module per entity.
//!
//! All functions accept `&Database` and run on the single writer thread.
//! Status-like columns are stored as their string form and parsed back into
//! the core enums on read.

pub mod availability;
pub mod bookings;
pub mod credits;
pub mod extensions;
pub mod milestones;
pub mod session_states;

/// Parse a TEXT column into one of the core string-backed enums.
///
/// Maps parse failures onto `FromSqlConversionFailure` so a corrupted row
/// surfaces as a normal rusqlite error with the offending column index.
pub(crate) fn parse_enum<T>(idx: usize, value: String) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::parse_enum;
    use attune_core::types::{EndReason, ExtensionStatus};

    #[test]
    fn parse_enum_accepts_known_values() {
        let reason: EndReason = parse_enum(0, "giver_safety_exit".to_string()).unwrap();
        assert_eq!(reason, EndReason::GiverSafetyExit);

        let status: ExtensionStatus = parse_enum(0, "payment_failed".to_string()).unwrap();
        assert_eq!(status, ExtensionStatus::PaymentFailed);
    }

    #[test]
    fn parse_enum_rejects_garbage() {
        let result: Result<EndReason, _> = parse_enum(3, "abducted".to_string());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(3, _, _)
        ));
    }
}
