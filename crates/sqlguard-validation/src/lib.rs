//! # sqlguard-validation
//!
//! Input validation for the sqlguard query generator: identifier, integer,
//! string and email rules, heuristic injection pattern detection, and
//! log-safe redaction of caller-supplied text.
//!
//! Every validator is a pure function that either returns its input unchanged
//! or fails with a classified [`ValidationError`].

pub mod error;
pub mod injection;
pub mod level;
pub mod sanitize;
pub mod validators;

// Re-exports for easy access
pub use error::{ValidationError, ValidationResult};
pub use injection::{
    detect_injection_attempt, detect_injection_class, matched_injection_classes, InjectionClass,
    InjectionPattern, INJECTION_PATTERNS,
};
pub use level::{ParseSecurityLevelError, SecurityLevel};
pub use sanitize::sanitize_for_logging;
pub use validators::{
    is_reserved_keyword, validate_email, validate_identifier, validate_integer,
    validate_qualified_identifier, validate_string, MAX_IDENTIFIER_LENGTH,
};
