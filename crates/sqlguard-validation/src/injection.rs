//! Heuristic SQL injection pattern detection
//!
//! Patterns are grouped into classes, each targeting one known injection
//! technique. Classes are evaluated in a fixed order and a text is flagged if
//! any class matches; there is no scoring. This is a defense-in-depth layer
//! and never a substitute for binding values as parameters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Injection technique targeted by a pattern class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionClass {
    /// A closing quote followed by a comment marker or statement terminator
    QuoteEscape,
    /// Always-true boolean comparisons such as `OR 1=1`
    Tautology,
    /// A terminator followed by another DML/DDL statement
    StackedStatement,
    /// `UNION [ALL] SELECT` exfiltration
    UnionSelect,
    /// Time-based blind injection attempts
    TimingAttack,
    /// Calls into extended or system stored procedures
    PrivilegedProcedure,
}

impl InjectionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjectionClass::QuoteEscape => "quote_escape",
            InjectionClass::Tautology => "tautology",
            InjectionClass::StackedStatement => "stacked_statement",
            InjectionClass::UnionSelect => "union_select",
            InjectionClass::TimingAttack => "timing_attack",
            InjectionClass::PrivilegedProcedure => "privileged_procedure",
        }
    }
}

impl fmt::Display for InjectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compiled pattern class
#[derive(Debug)]
pub struct InjectionPattern {
    pub class: InjectionClass,
    pattern: Regex,
}

impl InjectionPattern {
    fn new(class: InjectionClass, pattern: &str) -> Self {
        Self {
            class,
            pattern: Regex::new(pattern).expect("built-in injection pattern must compile"),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn pattern_string(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Pattern classes in evaluation order
pub static INJECTION_PATTERNS: Lazy<Vec<InjectionPattern>> = Lazy::new(|| {
    vec![
        InjectionPattern::new(InjectionClass::QuoteEscape, r"(?i)'\s*(--|/\*|#|;)"),
        InjectionPattern::new(
            InjectionClass::Tautology,
            r"(?i)\b(or|and)\s+\d+\s*=\s*\d+\b|\bor\s+'[^']*'\s*=\s*'[^']*'?|'\s*(or|and)\s+'",
        ),
        InjectionPattern::new(
            InjectionClass::StackedStatement,
            r"(?i);\s*(select|insert|update|delete|drop|create|alter|truncate|exec|execute|grant|revoke|merge)\b",
        ),
        InjectionPattern::new(
            InjectionClass::UnionSelect,
            r"(?i)\bunion(\s+all)?(\s|/\*.*?\*/)+select\b",
        ),
        InjectionPattern::new(
            InjectionClass::TimingAttack,
            r"(?i)\b(pg_)?sleep\s*\(|\bwaitfor\s+delay\b|\bbenchmark\s*\(",
        ),
        InjectionPattern::new(
            InjectionClass::PrivilegedProcedure,
            r"(?i)\bexec(ute)?\s+(master\.\.|dbo\.)?(xp|sp)_\w+|\b(xp|sp)_\w+\s*\(",
        ),
    ]
});

/// Check whether `text` matches any injection pattern class
pub fn detect_injection_attempt(text: &str) -> bool {
    detect_injection_class(text).is_some()
}

/// First matching pattern class, in evaluation order
pub fn detect_injection_class(text: &str) -> Option<InjectionClass> {
    INJECTION_PATTERNS
        .iter()
        .find(|pattern| pattern.is_match(text))
        .map(|pattern| pattern.class)
}

/// Every pattern class matching `text`, in evaluation order
pub fn matched_injection_classes(text: &str) -> Vec<InjectionClass> {
    INJECTION_PATTERNS
        .iter()
        .filter(|pattern| pattern.is_match(text))
        .map(|pattern| pattern.class)
        .collect()
}
