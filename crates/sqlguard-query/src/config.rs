//! Generator configuration
//!
//! Loaded from code, from serde sources, or from `SQLGUARD_*` environment
//! variables. Environment values override the defaults one field at a time.

use serde::{Deserialize, Serialize};
use sqlguard_security::RateLimitConfig;
use sqlguard_validation::SecurityLevel;
use std::env;
use std::str::FromStr;

use crate::dialect::Dialect;
use crate::error::ConfigError;

/// Default upper bound for `LIMIT`
pub const DEFAULT_MAX_LIMIT: i64 = 10_000;

/// Default upper bound, in characters, for one string parameter
pub const DEFAULT_MAX_PARAMETER_LENGTH: usize = 65_536;

/// Query generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub dialect: Dialect,
    pub security_level: SecurityLevel,
    /// Consult the rate limiter for calls that carry a caller identity
    pub enable_rate_limit: bool,
    /// Emit audit events on the `sqlguard::audit` target
    pub enable_audit_log: bool,
    pub rate_limit: RateLimitConfig,
    pub max_limit: i64,
    pub max_parameter_length: usize,
    /// Wrap every identifier segment in the dialect's quote characters
    pub quote_identifiers: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            security_level: SecurityLevel::default(),
            enable_rate_limit: true,
            enable_audit_log: true,
            rate_limit: RateLimitConfig::default(),
            max_limit: DEFAULT_MAX_LIMIT,
            max_parameter_length: DEFAULT_MAX_PARAMETER_LENGTH,
            quote_identifiers: false,
        }
    }
}

impl GeneratorConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Strict identifiers, screened parameters, quoted identifiers, 10 requests per minute
    pub fn strict(dialect: Dialect) -> Self {
        Self {
            dialect,
            security_level: SecurityLevel::Strict,
            rate_limit: RateLimitConfig::strict(),
            quote_identifiers: true,
            ..Self::default()
        }
    }

    /// Qualified names allowed, 1000 requests per minute
    pub fn permissive(dialect: Dialect) -> Self {
        Self {
            dialect,
            security_level: SecurityLevel::Permissive,
            rate_limit: RateLimitConfig::permissive(),
            ..Self::default()
        }
    }

    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = level;
        self
    }

    pub fn with_rate_limit(mut self, max_requests: u32, window_seconds: u64) -> Self {
        self.enable_rate_limit = true;
        self.rate_limit.max_requests = max_requests;
        self.rate_limit.window_seconds = window_seconds;
        self
    }

    pub fn without_rate_limit(mut self) -> Self {
        self.enable_rate_limit = false;
        self
    }

    pub fn with_audit_log(mut self, enabled: bool) -> Self {
        self.enable_audit_log = enabled;
        self
    }

    pub fn with_max_limit(mut self, max_limit: i64) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn with_quoted_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    /// Load configuration from `SQLGUARD_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dialect) = lookup("SQLGUARD_DIALECT") {
            config.dialect = dialect.parse()?;
        }

        if let Some(level) = lookup("SQLGUARD_SECURITY_LEVEL") {
            config.security_level = level.parse().map_err(|_| ConfigError::InvalidValue {
                field: "security_level".to_string(),
                value: level.clone(),
                expected: "strict, normal, or permissive".to_string(),
            })?;
        }

        if let Some(value) = lookup("SQLGUARD_RATE_LIMIT") {
            config.enable_rate_limit = parse_bool("enable_rate_limit", &value)?;
        }

        if let Some(value) = lookup("SQLGUARD_RATE_LIMIT_MAX_REQUESTS") {
            config.rate_limit.max_requests =
                parse_number("rate_limit.max_requests", &value, "non-negative integer")?;
        }

        if let Some(value) = lookup("SQLGUARD_RATE_LIMIT_WINDOW_SECONDS") {
            config.rate_limit.window_seconds =
                parse_number("rate_limit.window_seconds", &value, "positive integer")?;
        }

        if let Some(value) = lookup("SQLGUARD_AUDIT_LOG") {
            config.enable_audit_log = parse_bool("enable_audit_log", &value)?;
        }

        if let Some(value) = lookup("SQLGUARD_QUOTE_IDENTIFIERS") {
            config.quote_identifiers = parse_bool("quote_identifiers", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit < 1 {
            return Err(ConfigError::InvalidValue {
                field: "max_limit".to_string(),
                value: self.max_limit.to_string(),
                expected: "at least 1".to_string(),
            });
        }

        if self.max_parameter_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_parameter_length".to_string(),
                value: "0".to_string(),
                expected: "at least 1".to_string(),
            });
        }

        if self.enable_rate_limit && self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.window_seconds".to_string(),
                value: "0".to_string(),
                expected: "positive integer".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "true or false".to_string(),
        }),
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str, expected: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    })
}
