//! Free-text validation with length limits and optional injection screening

use crate::error::{ValidationError, ValidationResult};
use crate::injection::detect_injection_class;

/// Validate a caller-supplied string.
///
/// With `check_injection` set, injection screening runs first, so an
/// oversized malicious value reports `InjectionDetected` rather than
/// `TooLong`. Length is counted in characters.
pub fn validate_string(
    value: &str,
    max_length: usize,
    check_injection: bool,
) -> ValidationResult<&str> {
    if check_injection {
        if let Some(class) = detect_injection_class(value) {
            return Err(ValidationError::InjectionDetected { class });
        }
    }

    let length = value.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong { length, max_length });
    }

    Ok(value)
}
