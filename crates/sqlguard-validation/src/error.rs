//! Validation error types and handling

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::injection::InjectionClass;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Classified validation failure.
///
/// Payloads never carry the raw offending input. Identifiers and email
/// addresses are stored as their [`sanitize_for_logging`](crate::sanitize_for_logging)
/// rendering so the error can be logged as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("Value {value} is out of range (expected {min}..={max})")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("Value is too long ({length} characters, max {max_length})")]
    TooLong { length: usize, max_length: usize },

    #[error("Malformed email address '{email}': {reason}")]
    MalformedEmail { email: String, reason: String },

    #[error("Potential SQL injection detected ({class})")]
    InjectionDetected { class: InjectionClass },
}

impl ValidationError {
    /// Error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidIdentifier { .. } => "invalid_identifier",
            ValidationError::OutOfRange { .. } => "out_of_range",
            ValidationError::TooLong { .. } => "too_long",
            ValidationError::MalformedEmail { .. } => "malformed_email",
            ValidationError::InjectionDetected { .. } => "injection_detected",
        }
    }

    /// Whether this failure indicates malicious input rather than malformed input
    pub fn is_security_violation(&self) -> bool {
        matches!(self, ValidationError::InjectionDetected { .. })
    }
}
