//! Error types for policy evaluation, booking decisions and scheduler projection.
//!
//! Booking outcomes (`booked`, `waitlisted`, `not_found`, ...) are values, not
//! errors. The types here only cover malformed inputs.

use crate::types::{RentalId, ReservationId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by the capacity policy evaluators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Configuration or input outside the evaluator's domain
    #[error("invalid policy: {reason}")]
    InvalidPolicy {
        /// What was wrong
        reason: String,
    },
}

impl PolicyError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            reason: reason.into(),
        }
    }
}

/// Errors raised by the reservation usecase
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// The session cannot be evaluated (zero capacity, broken invariants)
    #[error("invalid session state: {reason}")]
    InvalidState {
        /// What was wrong
        reason: String,
        /// Underlying evaluator failure, if any
        #[source]
        source: Option<PolicyError>,
    },
}

impl ReservationError {
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
            source: None,
        }
    }
}

impl From<PolicyError> for ReservationError {
    fn from(error: PolicyError) -> Self {
        Self::InvalidState {
            reason: error.to_string(),
            source: Some(error),
        }
    }
}

/// Errors raised while projecting records into scheduler events
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// A reservation has no end time and no default window is configured
    #[error("reservation {reservation_id} has no end time")]
    MissingEndTime {
        /// Offending reservation
        reservation_id: ReservationId,
    },

    /// A rental ends before it starts
    #[error("rental {rental_id} ends at {ends_at} before it starts at {starts_at}")]
    InvalidTimeRange {
        /// Offending rental
        rental_id: RentalId,
        /// Declared start
        starts_at: DateTime<Utc>,
        /// Declared end
        ends_at: DateTime<Utc>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn policy_error_becomes_invalid_state_with_source() {
        let error: ReservationError = PolicyError::invalid("capacity must be positive").into();

        let ReservationError::InvalidState { reason, source } = &error;
        assert!(reason.contains("capacity must be positive"));
        assert!(source.is_some());
        assert!(error.source().is_some());
    }

    #[test]
    fn invalid_state_display() {
        let error = ReservationError::invalid_state("duplicate participant");
        assert_eq!(error.to_string(), "invalid session state: duplicate participant");
    }
}
