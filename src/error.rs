//! Contract-violation errors raised by the flows.
//!
//! A closed gate is never an error: it surfaces as [`crate::flow::Advance::Blocked`].
//! The variants here signal host-side misuse, so callers are expected to fail fast.

use thiserror::Error;

/// Result alias for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// `go_to` was called with a name that is not a step of the flow
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// Exercise index outside the session plan
    #[error("Exercise index {index} out of range (plan has {len} exercises)")]
    ExerciseOutOfRange { index: usize, len: usize },

    /// Checklist or follow-up index outside the list
    #[error("{list} index {index} out of range (list has {len} items)")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },

    /// A draft field was edited from a step that does not own it
    #[error("Operation belongs to step '{expected}' but flow is at '{actual}'")]
    StepMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Client id not present in the catalog
    #[error("Unknown client: {0}")]
    UnknownClient(u32),

    /// Service id not present in the catalog
    #[error("Unknown service: {0}")]
    UnknownService(u32),

    /// A service was chosen before any client
    #[error("A client must be selected before choosing a service")]
    ClientRequired,

    /// Date outside the bookable window
    #[error("Date {0} is outside the booking window")]
    DateOutsideWindow(chrono::NaiveDate),

    /// Rating outside its scale
    #[error("{scale} rating {value} out of range ({min}..={max})")]
    RatingOutOfRange {
        scale: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },
}

impl FlowError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::UnknownStep(_) => "UNKNOWN_STEP",
            FlowError::ExerciseOutOfRange { .. } => "EXERCISE_OUT_OF_RANGE",
            FlowError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            FlowError::StepMismatch { .. } => "STEP_MISMATCH",
            FlowError::UnknownClient(_) => "UNKNOWN_CLIENT",
            FlowError::UnknownService(_) => "UNKNOWN_SERVICE",
            FlowError::ClientRequired => "CLIENT_REQUIRED",
            FlowError::DateOutsideWindow(_) => "DATE_OUTSIDE_WINDOW",
            FlowError::RatingOutOfRange { .. } => "RATING_OUT_OF_RANGE",
        }
    }

    /// Helper for range-checked ratings
    pub(crate) fn check_rating(scale: &'static str, value: u8, min: u8, max: u8) -> Result<u8> {
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(FlowError::RatingOutOfRange {
                scale,
                value,
                min,
                max,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FlowError::UnknownStep("x".into()).code(), "UNKNOWN_STEP");
        assert_eq!(
            FlowError::ExerciseOutOfRange { index: 3, len: 2 }.code(),
            "EXERCISE_OUT_OF_RANGE"
        );
        assert_eq!(FlowError::ClientRequired.code(), "CLIENT_REQUIRED");
        assert_eq!(FlowError::UnknownClient(9).code(), "UNKNOWN_CLIENT");
    }

    #[test]
    fn test_error_messages() {
        let err = FlowError::ExerciseOutOfRange { index: 4, len: 3 };
        assert_eq!(
            err.to_string(),
            "Exercise index 4 out of range (plan has 3 exercises)"
        );

        let err = FlowError::StepMismatch {
            expected: "details",
            actual: "confirmation",
        };
        assert!(err.to_string().contains("'details'"));
        assert!(err.to_string().contains("'confirmation'"));
    }

    #[test]
    fn test_check_rating() {
        assert_eq!(FlowError::check_rating("feedback", 5, 1, 5), Ok(5));
        assert_eq!(
            FlowError::check_rating("feedback", 0, 1, 5),
            Err(FlowError::RatingOutOfRange {
                scale: "feedback",
                value: 0,
                min: 1,
                max: 5
            })
        );
    }
}
