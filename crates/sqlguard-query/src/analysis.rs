//! Heuristic analysis of raw SQL text
//!
//! Both checks are advisory. They scan text with regular expressions and never
//! fail; an empty result means nothing matched, not that the statement is
//! safe or fast.

use once_cell::sync::Lazy;
use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// Any of the five placeholder styles
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| regex(r"\$\d+|\?|@[A-Za-z_]\w*|(^|[^:\w]):[A-Za-z_]\w*"));

/// String literals and quoted identifiers
static QUOTED: Lazy<Regex> =
    Lazy::new(|| regex(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|`[^`]*`|\[[^\]]*\]"#));

/// Text after the first WHERE keyword
static WHERE_TAIL: Lazy<Regex> = Lazy::new(|| regex(r"(?is)\bwhere\b(.*)"));

static WHERE_KEYWORD: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bwhere\b"));

static LITERAL_COMPARISON: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)(=|<>|!=|<|>|\blike\b|\bin\s*\()\s*('|-?\d)"));

static STRING_CONCAT: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)'[^']*'\s*(\+|\|\|)|(\+|\|\|)\s*'|\bconcat\s*\([^)]*'")
});

static DESTRUCTIVE_DDL: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\b(drop|truncate)\b"));

static UNION: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bunion\b"));

static TRAILING_COMMENT: Lazy<Regex> = Lazy::new(|| regex(r"(--|#|/\*)[^\n]*\s*\z"));

static STACKED_STATEMENT: Lazy<Regex> = Lazy::new(|| regex(r";\s*\S"));

static UPDATE_OR_DELETE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)^\s*(update|delete)\b"));

/// Advisory security warnings for `sql`.
///
/// ```
/// use sqlguard_query::validate_query_security;
///
/// assert!(!validate_query_security("SELECT * FROM users WHERE status = 'active'").is_empty());
/// assert!(validate_query_security("SELECT id FROM users WHERE id = $1").is_empty());
/// ```
pub fn validate_query_security(sql: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    if STRING_CONCAT.is_match(sql) {
        warnings.push(
            "String concatenation with literals detected; bind values as parameters instead"
                .to_string(),
        );
    }

    if let Some(tail) = where_clause(sql) {
        let has_placeholder = PLACEHOLDER.is_match(&QUOTED.replace_all(tail, ""));
        if !has_placeholder && LITERAL_COMPARISON.is_match(tail) {
            warnings.push(
                "WHERE clause compares against literals without placeholders; use parameterized values"
                    .to_string(),
            );
        }
    }

    if DESTRUCTIVE_DDL.is_match(sql) {
        warnings.push("Destructive operation (DROP/TRUNCATE) detected".to_string());
    }

    if UNION.is_match(sql) {
        warnings.push("UNION detected; verify it is not built from untrusted input".to_string());
    }

    if TRAILING_COMMENT.is_match(sql) {
        warnings.push("Trailing SQL comment detected; possible truncation attack".to_string());
    }

    if STACKED_STATEMENT.is_match(sql) {
        warnings.push("Multiple statements detected; execute one statement per call".to_string());
    }

    if UPDATE_OR_DELETE.is_match(sql) && !WHERE_KEYWORD.is_match(sql) {
        warnings.push("UPDATE/DELETE without WHERE affects every row in the table".to_string());
    }

    warnings
}

static SELECT_STAR: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bselect\s+(distinct\s+)?\*"));
static SELECT_DISTINCT: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bselect\s+distinct\b"));
static SELECT_LEADING: Lazy<Regex> = Lazy::new(|| regex(r"(?i)^\s*select\b"));
static GROUP_BY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bgroup\s+by\b"));
static ORDER_BY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\border\s+by\b"));
static ROW_BOUND: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\b(limit|fetch|top)\b"));
static LEADING_WILDCARD_LIKE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\blike\s+'%"));
static OR_KEYWORD: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bor\b"));
static IN_SUBQUERY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bin\s*\(\s*select\b"));
static FUNCTION_ON_COLUMN: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(lower|upper|date|year|month|trim|substr|substring|coalesce|cast)\s*\(\s*[A-Za-z_]")
});
static JOIN: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bjoin\b"));

/// Return `sql` unchanged with heuristic performance suggestions.
///
/// No rewriting or cost estimation is attempted.
pub fn optimize_query(sql: &str) -> (String, Vec<String>) {
    let mut suggestions = Vec::new();
    let where_tail = where_clause(sql);

    if SELECT_STAR.is_match(sql) {
        suggestions.push("Avoid SELECT *; list only the columns you need".to_string());
    }

    if GROUP_BY.is_match(sql) {
        suggestions.push("Ensure GROUP BY columns are indexed".to_string());
    }

    if ORDER_BY.is_match(sql) {
        suggestions.push("Ensure ORDER BY columns are indexed".to_string());
        if SELECT_LEADING.is_match(sql) && !ROW_BOUND.is_match(sql) {
            suggestions.push("Add LIMIT to bound the size of sorted results".to_string());
        }
    }

    if LEADING_WILDCARD_LIKE.is_match(sql) {
        suggestions.push("LIKE patterns starting with % cannot use an index".to_string());
    }

    if where_tail.is_some_and(|tail| OR_KEYWORD.is_match(tail)) {
        suggestions.push(
            "OR conditions in WHERE may prevent index use; consider IN or UNION".to_string(),
        );
    }

    if SELECT_DISTINCT.is_match(sql) && GROUP_BY.is_match(sql) {
        suggestions.push("DISTINCT is redundant with GROUP BY".to_string());
    }

    if IN_SUBQUERY.is_match(sql) {
        suggestions.push("IN (SELECT ...) may perform better as a JOIN or EXISTS".to_string());
    }

    if where_tail.is_some_and(|tail| FUNCTION_ON_COLUMN.is_match(tail)) {
        suggestions.push("Functions applied to columns in WHERE prevent index use".to_string());
    }

    if JOIN.is_match(sql) {
        suggestions.push("Ensure JOIN columns are indexed".to_string());
    }

    (sql.to_string(), suggestions)
}

fn where_clause(sql: &str) -> Option<&str> {
    WHERE_TAIL
        .captures(sql)
        .and_then(|captures| captures.get(1))
        .map(|tail| tail.as_str())
}
