//! Dialect profiles
//!
//! Every supported database family is described by one static
//! [`DialectProfile`]. Statement rendering reads placeholder, quoting and
//! limit rules from the profile instead of branching on the dialect.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Supported database families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
    MsSql,
    Oracle,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::MsSql,
        Dialect::Oracle,
    ];

    pub fn profile(&self) -> &'static DialectProfile {
        match self {
            Dialect::Postgres => &POSTGRES,
            Dialect::MySql => &MYSQL,
            Dialect::Sqlite => &SQLITE,
            Dialect::MsSql => &MSSQL,
            Dialect::Oracle => &ORACLE,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "mssql" | "sqlserver" | "sql_server" => Ok(Dialect::MsSql),
            "oracle" => Ok(Dialect::Oracle),
            _ => Err(ConfigError::InvalidValue {
                field: "dialect".to_string(),
                value: s.to_string(),
                expected: "postgresql, mysql, sqlite, mssql, or oracle".to_string(),
            }),
        }
    }
}

/// How bound values are referenced in statement text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1, $2, ...`
    Numbered,
    /// `?, ?, ...`
    QuestionMark,
    /// `@param1, @param2, ...`
    AtNamed,
    /// `:param1, :param2, ...`
    ColonNamed,
}

/// Quoted literals and identifiers come first in each alternation so a
/// token-shaped run inside quotes is consumed whole and never counted
const QUOTED: &str = r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|`[^`]*`|\[[^\]]*\]"#;

fn token_pattern(token: &str) -> Regex {
    Regex::new(&format!("{}|{}", QUOTED, token)).expect("valid regex")
}

static NUMBERED_TOKEN: Lazy<Regex> = Lazy::new(|| token_pattern(r"\$\d+"));
static QUESTION_MARK_TOKEN: Lazy<Regex> = Lazy::new(|| token_pattern(r"\?"));
static AT_NAMED_TOKEN: Lazy<Regex> = Lazy::new(|| token_pattern(r"@param\d+\b"));
static COLON_NAMED_TOKEN: Lazy<Regex> = Lazy::new(|| token_pattern(r":param\d+\b"));

impl PlaceholderStyle {
    /// Token for the 1-based `position`
    pub fn render(&self, position: usize) -> String {
        match self {
            PlaceholderStyle::Numbered => format!("${}", position),
            PlaceholderStyle::QuestionMark => "?".to_string(),
            PlaceholderStyle::AtNamed => format!("@param{}", position),
            PlaceholderStyle::ColonNamed => format!(":param{}", position),
        }
    }

    /// Placeholder tokens in `sql`, left to right, ignoring anything inside
    /// string literals or quoted identifiers
    pub fn tokens<'a>(&self, sql: &'a str) -> Vec<&'a str> {
        let pattern = match self {
            PlaceholderStyle::Numbered => &NUMBERED_TOKEN,
            PlaceholderStyle::QuestionMark => &QUESTION_MARK_TOKEN,
            PlaceholderStyle::AtNamed => &AT_NAMED_TOKEN,
            PlaceholderStyle::ColonNamed => &COLON_NAMED_TOKEN,
        };
        pattern
            .find_iter(sql)
            .map(|m| m.as_str())
            .filter(|token| !token.starts_with(|c| matches!(c, '\'' | '"' | '`' | '[')))
            .collect()
    }
}

/// Where the row limit goes and how it is spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSyntax {
    /// Trailing `LIMIT n [OFFSET m]`
    LimitOffset,
    /// `SELECT TOP n`, or `OFFSET m ROWS FETCH NEXT n ROWS ONLY` with an offset
    Top,
    /// Trailing `[OFFSET m ROWS] FETCH FIRST n ROWS ONLY`
    FetchFirst,
}

/// Static description of one database family
#[derive(Debug, PartialEq, Eq)]
pub struct DialectProfile {
    pub name: &'static str,
    pub placeholder_style: PlaceholderStyle,
    /// Opening and closing identifier quote
    pub identifier_quote: (char, char),
    pub limit_syntax: LimitSyntax,
    pub supports_returning: bool,
    pub supports_if_not_exists: bool,
    pub supports_boolean_literals: bool,
}

static POSTGRES: DialectProfile = DialectProfile {
    name: "postgresql",
    placeholder_style: PlaceholderStyle::Numbered,
    identifier_quote: ('"', '"'),
    limit_syntax: LimitSyntax::LimitOffset,
    supports_returning: true,
    supports_if_not_exists: true,
    supports_boolean_literals: true,
};

static MYSQL: DialectProfile = DialectProfile {
    name: "mysql",
    placeholder_style: PlaceholderStyle::QuestionMark,
    identifier_quote: ('`', '`'),
    limit_syntax: LimitSyntax::LimitOffset,
    supports_returning: false,
    supports_if_not_exists: true,
    supports_boolean_literals: true,
};

static SQLITE: DialectProfile = DialectProfile {
    name: "sqlite",
    placeholder_style: PlaceholderStyle::QuestionMark,
    identifier_quote: ('"', '"'),
    limit_syntax: LimitSyntax::LimitOffset,
    supports_returning: true,
    supports_if_not_exists: true,
    supports_boolean_literals: true,
};

static MSSQL: DialectProfile = DialectProfile {
    name: "mssql",
    placeholder_style: PlaceholderStyle::AtNamed,
    identifier_quote: ('[', ']'),
    limit_syntax: LimitSyntax::Top,
    supports_returning: false,
    supports_if_not_exists: false,
    supports_boolean_literals: false,
};

static ORACLE: DialectProfile = DialectProfile {
    name: "oracle",
    placeholder_style: PlaceholderStyle::ColonNamed,
    identifier_quote: ('"', '"'),
    limit_syntax: LimitSyntax::FetchFirst,
    supports_returning: false,
    supports_if_not_exists: false,
    supports_boolean_literals: false,
};

impl DialectProfile {
    pub fn placeholder(&self, position: usize) -> String {
        self.placeholder_style.render(position)
    }

    /// Quote every dot-separated segment of `identifier`.
    ///
    /// A closing quote character inside a segment is doubled, so the result
    /// is safe even for identifiers that skipped validation.
    pub fn quote_identifier(&self, identifier: &str) -> String {
        let (open, close) = self.identifier_quote;
        let escaped_close = format!("{}{}", close, close);
        identifier
            .split('.')
            .map(|segment| {
                format!(
                    "{}{}{}",
                    open,
                    segment.replace(close, &escaped_close),
                    close
                )
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn placeholder_count(&self, sql: &str) -> usize {
        self.placeholder_style.tokens(sql).len()
    }
}

/// Per-statement placeholder allocator.
///
/// Positions start at 1 for every new statement and follow the order in
/// which values are bound, so tokens and parameters always line up.
#[derive(Debug)]
pub struct Placeholders {
    style: PlaceholderStyle,
    parameters: Vec<Value>,
}

impl Placeholders {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            parameters: Vec::new(),
        }
    }

    /// Record `value` and return the token standing in for it
    pub fn bind(&mut self, value: Value) -> String {
        self.parameters.push(value);
        self.style.render(self.parameters.len())
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn into_parameters(self) -> Vec<Value> {
        self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder_styles() {
        let expected = [
            (Dialect::Postgres, ["$1", "$2", "$3"]),
            (Dialect::MySql, ["?", "?", "?"]),
            (Dialect::Sqlite, ["?", "?", "?"]),
            (Dialect::MsSql, ["@param1", "@param2", "@param3"]),
            (Dialect::Oracle, [":param1", ":param2", ":param3"]),
        ];

        for (dialect, tokens) in expected {
            let rendered: Vec<String> = (1..=3).map(|i| dialect.profile().placeholder(i)).collect();
            assert_eq!(rendered, tokens, "{}", dialect);
        }
    }

    #[test]
    fn test_placeholders_number_per_statement() {
        let mut first = Placeholders::new(PlaceholderStyle::Numbered);
        assert_eq!(first.bind(json!("a")), "$1");
        assert_eq!(first.bind(json!(2)), "$2");
        assert_eq!(first.into_parameters(), vec![json!("a"), json!(2)]);

        let mut second = Placeholders::new(PlaceholderStyle::Numbered);
        assert_eq!(second.bind(json!(true)), "$1");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::Postgres.profile().quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::MySql.profile().quote_identifier("c.name"), "`c`.`name`");
        assert_eq!(Dialect::MsSql.profile().quote_identifier("users"), "[users]");
        assert_eq!(
            Dialect::Postgres.profile().quote_identifier("table\"name"),
            "\"table\"\"name\""
        );
        assert_eq!(Dialect::MsSql.profile().quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn test_placeholder_tokens() {
        let profile = Dialect::MsSql.profile();
        assert_eq!(
            profile.placeholder_style.tokens("a = @param1 AND b IN (@param2, @param10)"),
            vec!["@param1", "@param2", "@param10"]
        );
        assert_eq!(Dialect::Postgres.profile().placeholder_count("x = $1 OR y = $12"), 2);
    }

    #[test]
    fn test_placeholder_tokens_skip_quoted_text() {
        assert_eq!(
            Dialect::MySql
                .profile()
                .placeholder_count("SELECT 'why?', `a?b` FROM t WHERE x = ? AND y = 'it''s ?'"),
            1
        );
        assert_eq!(
            Dialect::Postgres
                .profile()
                .placeholder_count(r#"SELECT "$1" FROM t WHERE note = 'cost $5' AND id = $1"#),
            1
        );
        assert_eq!(
            Dialect::MsSql
                .profile()
                .placeholder_count("SELECT [@param9] FROM t WHERE a = '@param2' AND b = @param1"),
            1
        );
        assert_eq!(
            Dialect::Oracle
                .profile()
                .placeholder_count("SELECT ':param1' FROM dual WHERE x = :param1"),
            1
        );
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("sqlserver".parse::<Dialect>().unwrap(), Dialect::MsSql);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert!(matches!(
            "db2".parse::<Dialect>(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_profiles() {
        assert!(Dialect::Postgres.profile().supports_returning);
        assert!(!Dialect::MySql.profile().supports_returning);
        assert_eq!(Dialect::MsSql.profile().limit_syntax, LimitSyntax::Top);
        assert_eq!(Dialect::Oracle.profile().limit_syntax, LimitSyntax::FetchFirst);
        assert_eq!(Dialect::Oracle.to_string(), "oracle");
    }
}
