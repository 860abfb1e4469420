//! Email format validator

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ValidationError, ValidationResult};
use crate::sanitize::sanitize_for_logging;

/// RFC 5321 limit for the local part
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_DOMAIN_LENGTH: usize = 255;

/// Non-empty local part, then at least two non-empty dot-separated labels
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("valid email regex"));

/// Validate an email address and return it unchanged.
///
/// Requires exactly one `@`, a non-empty local part of at most 64 characters,
/// and a domain of at least two non-empty labels. Whitespace is rejected
/// anywhere.
pub fn validate_email(value: &str) -> ValidationResult<&str> {
    if value.chars().any(char::is_whitespace) {
        return Err(malformed(value, "must not contain whitespace"));
    }

    let (local_part, domain_part) = match value.split_once('@') {
        Some(parts) => parts,
        None => return Err(malformed(value, "missing '@'")),
    };

    if value.matches('@').count() != 1 {
        return Err(malformed(value, "must contain exactly one '@'"));
    }

    if local_part.len() > MAX_LOCAL_PART_LENGTH {
        return Err(malformed(value, "local part is too long"));
    }

    if domain_part.len() > MAX_DOMAIN_LENGTH {
        return Err(malformed(value, "domain is too long"));
    }

    if !EMAIL_PATTERN.is_match(value) {
        return Err(malformed(value, "invalid email format"));
    }

    Ok(value)
}

fn malformed(value: &str, reason: &str) -> ValidationError {
    ValidationError::MalformedEmail {
        email: sanitize_for_logging(value, 100),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        for email in ["user@example.com", "test.user@domain.co.uk", "a+tag@x.io"] {
            assert_eq!(validate_email(email).unwrap(), email);
        }
    }

    #[test]
    fn test_invalid_emails() {
        let invalid = [
            "invalid",
            "user@",
            "@domain.com",
            "user@domain",
            "user@@domain.com",
            "a@b@c.com",
            "user@.com",
            "user@domain.",
            "user@domain..com",
            "us er@domain.com",
            "",
        ];

        for email in invalid {
            assert!(
                matches!(validate_email(email), Err(ValidationError::MalformedEmail { .. })),
                "accepted {:?}",
                email
            );
        }
    }

    #[test]
    fn test_rejection_reasons() {
        let reason = |email: &str| match validate_email(email) {
            Err(ValidationError::MalformedEmail { reason, .. }) => reason,
            other => panic!("expected malformed email, got {:?}", other),
        };

        assert_eq!(reason("invalid"), "missing '@'");
        assert_eq!(reason("a@b@c.com"), "must contain exactly one '@'");
        assert_eq!(reason("@domain.com"), "invalid email format");
        assert_eq!(reason("user@domain..com"), "invalid email format");
    }

    #[test]
    fn test_local_part_length_limit() {
        let email = format!("{}@example.com", "a".repeat(65));
        assert!(validate_email(&email).is_err());
    }
}
