//! Validation error types

use std::fmt;

/// Request input that does not fit the expected shape
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Body failed to deserialize into the model
    Body { reason: String },

    /// Required query parameter is absent
    Missing { field: &'static str },

    /// Value doesn't match the required format
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body { reason } => write!(f, "invalid request body: {}", reason),
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
        }
    }
}

impl std::error::Error for ValidationError {}
