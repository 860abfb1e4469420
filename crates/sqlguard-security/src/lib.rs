//! # sqlguard-security
//!
//! Abuse protection for the sqlguard query generator: an in-memory,
//! per-caller sliding-window rate limiter and the security error family
//! shared by the generator.

pub mod config;
pub mod rate_limit;

// Re-export main types
pub use config::RateLimitConfig;
pub use rate_limit::{RateLimitInfo, RateLimiter, RateWindow};

use sqlguard_validation::InjectionClass;

/// Common result type for security operations
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Failures caused by input that looks malicious or abusive
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    #[error("Potential SQL injection detected ({class})")]
    InjectionDetected { class: InjectionClass },

    #[error("Rate limit exceeded for '{identity}': {limit} requests per {window_seconds} seconds")]
    RateLimitExceeded {
        identity: String,
        limit: u32,
        window_seconds: u64,
    },
}

impl SecurityError {
    /// Error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            SecurityError::InjectionDetected { .. } => "injection_detected",
            SecurityError::RateLimitExceeded { .. } => "rate_limit_exceeded",
        }
    }
}
