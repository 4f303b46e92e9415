//! Validation error types

use std::fmt;

/// Validation error for catalog input
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Number outside the accepted range
    OutOfRange { field: &'static str, reason: &'static str },

    /// Identifier is not a positive integer
    InvalidId { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::OutOfRange { field, reason } => write!(f, "{}: {}", field, reason),
            Self::InvalidId { field, value } => {
                write!(f, "invalid {}: '{}' is not a positive integer", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
