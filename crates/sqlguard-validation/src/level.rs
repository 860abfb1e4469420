//! Security levels scaling how strictly identifier and wildcard rules apply

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How strictly structural inputs are checked for a single call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// Reject reserved keywords as identifiers, screen bound string values for
    /// injection patterns, warn on bare wildcards
    Strict,
    #[default]
    Normal,
    /// Allow dotted (qualified) names wherever a plain identifier is expected
    Permissive,
}

impl SecurityLevel {
    pub fn rejects_reserved_keywords(&self) -> bool {
        matches!(self, SecurityLevel::Strict)
    }

    pub fn allows_qualified_names(&self) -> bool {
        matches!(self, SecurityLevel::Permissive)
    }

    pub fn screens_parameters(&self) -> bool {
        matches!(self, SecurityLevel::Strict)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Strict => "strict",
            SecurityLevel::Normal => "normal",
            SecurityLevel::Permissive => "permissive",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a security level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown security level '{0}' (expected strict, normal, or permissive)")]
pub struct ParseSecurityLevelError(pub String);

impl FromStr for SecurityLevel {
    type Err = ParseSecurityLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(SecurityLevel::Strict),
            "normal" | "default" => Ok(SecurityLevel::Normal),
            "permissive" | "relaxed" => Ok(SecurityLevel::Permissive),
            _ => Err(ParseSecurityLevelError(s.to_string())),
        }
    }
}
