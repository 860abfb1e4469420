//! Error types for query generation
//!
//! Failures fall into two disjoint families: validation (malformed but
//! non-malicious input) and security (injection patterns, rate limiting).
//! Both are terminal for the call; no partial statement is ever returned.

use sqlguard_security::SecurityError;
use sqlguard_validation::ValidationError;
use thiserror::Error;

/// Result type alias for query generation
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query generation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A structural input failed a validator
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// The statement is structurally incomplete or inconsistent
    #[error("Malformed query: {0}")]
    Malformed(String),

    /// Input looked malicious or the caller exceeded its rate limit
    #[error("Security violation: {0}")]
    Security(SecurityError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl QueryError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        QueryError::Malformed(message.into())
    }

    /// Whether this error belongs to the security family
    pub fn is_security(&self) -> bool {
        matches!(self, QueryError::Security(_))
    }

    /// Whether this error belongs to the validation family
    pub fn is_validation(&self) -> bool {
        matches!(self, QueryError::Validation(_) | QueryError::Malformed(_))
    }

    /// Error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Validation(err) => err.code(),
            QueryError::Malformed(_) => "malformed_query",
            QueryError::Security(err) => err.code(),
            QueryError::Config(_) => "invalid_config",
        }
    }
}

impl From<ValidationError> for QueryError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InjectionDetected { class } => {
                QueryError::Security(SecurityError::InjectionDetected { class })
            }
            other => QueryError::Validation(other),
        }
    }
}

impl From<SecurityError> for QueryError {
    fn from(err: SecurityError) -> Self {
        QueryError::Security(err)
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}' (expected {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}
