//! Identifier validation for table, column and alias names

use crate::error::{ValidationError, ValidationResult};
use crate::level::SecurityLevel;
use crate::sanitize::sanitize_for_logging;

/// Longest accepted identifier (per segment for qualified names)
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// `schema.table.column` is the deepest qualified reference accepted
pub const MAX_QUALIFIED_SEGMENTS: usize = 3;

/// Keywords rejected as identifiers at [`SecurityLevel::Strict`]
static RESERVED_KEYWORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK",
    "COLUMN", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_USER", "DECLARE", "DEFAULT", "DELETE",
    "DESC", "DISTINCT", "DROP", "ELSE", "END", "EXCEPT", "EXEC", "EXECUTE", "EXISTS", "FETCH",
    "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IN", "INDEX", "INNER", "INSERT",
    "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "MERGE", "NOT", "NULL",
    "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RETURNING", "REVOKE",
    "RIGHT", "SELECT", "SESSION_USER", "SET", "SYSTEM", "TABLE", "THEN", "TOP", "TRUNCATE",
    "UNION", "UNIQUE", "UPDATE", "USER", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Whether `word` collides with a reserved SQL keyword (case insensitive)
pub fn is_reserved_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    RESERVED_KEYWORDS.contains(&upper.as_str())
}

/// Validate a single identifier.
///
/// Accepts `^[A-Za-z_][A-Za-z0-9_]*$` up to [`MAX_IDENTIFIER_LENGTH`]
/// characters and returns it unchanged. [`SecurityLevel::Strict`] also rejects
/// reserved keywords; [`SecurityLevel::Permissive`] accepts dotted names whose
/// segments each follow the same shape.
///
/// # Examples
/// ```
/// use sqlguard_validation::{validate_identifier, SecurityLevel};
///
/// assert_eq!(validate_identifier("user_id", SecurityLevel::Normal).unwrap(), "user_id");
/// assert!(validate_identifier("users; --", SecurityLevel::Normal).is_err());
/// assert!(validate_identifier("public.users", SecurityLevel::Permissive).is_ok());
/// ```
pub fn validate_identifier(name: &str, level: SecurityLevel) -> ValidationResult<&str> {
    if name.is_empty() {
        return Err(invalid(name, "identifier cannot be empty"));
    }

    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(invalid(
            name,
            format!("identifier is too long (max {} characters)", MAX_IDENTIFIER_LENGTH),
        ));
    }

    if level.allows_qualified_names() {
        for segment in name.split('.') {
            check_segment(name, segment)?;
        }
    } else {
        check_segment(name, name)?;
    }

    if level.rejects_reserved_keywords() {
        if let Some(keyword) = name.split('.').find(|segment| is_reserved_keyword(segment)) {
            return Err(invalid(
                name,
                format!("'{}' is a reserved SQL keyword", keyword),
            ));
        }
    }

    Ok(name)
}

/// Validate a possibly qualified reference such as `c.customer_id`.
///
/// Up to [`MAX_QUALIFIED_SEGMENTS`] dot-separated segments are accepted at
/// every level; each one is checked with [`validate_identifier`].
pub fn validate_qualified_identifier(name: &str, level: SecurityLevel) -> ValidationResult<&str> {
    if name.is_empty() {
        return Err(invalid(name, "identifier cannot be empty"));
    }

    let segments = name.split('.').count();
    if segments > MAX_QUALIFIED_SEGMENTS {
        return Err(invalid(
            name,
            format!(
                "qualified name has {} segments (max {})",
                segments, MAX_QUALIFIED_SEGMENTS
            ),
        ));
    }

    let segment_level = match level {
        SecurityLevel::Permissive => SecurityLevel::Normal,
        other => other,
    };
    for segment in name.split('.') {
        validate_identifier(segment, segment_level).map_err(|err| match err {
            ValidationError::InvalidIdentifier { reason, .. } => invalid(name, reason),
            other => other,
        })?;
    }

    Ok(name)
}

fn check_segment(name: &str, segment: &str) -> ValidationResult<()> {
    let mut chars = segment.chars();
    match chars.next() {
        None => Err(invalid(name, "identifier contains an empty segment")),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => Err(invalid(
            name,
            "identifier must start with a letter or underscore",
        )),
        Some(_) => {
            if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
                Err(invalid(
                    name,
                    "identifier may only contain letters, digits and underscores",
                ))
            } else {
                Ok(())
            }
        }
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidIdentifier {
        identifier: sanitize_for_logging(name, MAX_IDENTIFIER_LENGTH),
        reason: reason.into(),
    }
}
