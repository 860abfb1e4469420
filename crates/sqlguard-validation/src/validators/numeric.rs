//! Integer range validation

use crate::error::{ValidationError, ValidationResult};

/// Validate that `value` lies within `min_val..=max_val` and return it unchanged
pub fn validate_integer(value: i64, min_val: i64, max_val: i64) -> ValidationResult<i64> {
    if value < min_val || value > max_val {
        return Err(ValidationError::OutOfRange {
            value,
            min: min_val,
            max: max_val,
        });
    }
    Ok(value)
}
