//! Query Builder Types - Core types and enums for statement building

use serde_json::Value;
use std::fmt;

use crate::dialect::Dialect;

/// Query operator types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
}

impl QueryOperator {
    /// Number of bound values the operator takes; `None` means one or more
    pub fn arity(&self) -> Option<usize> {
        match self {
            QueryOperator::IsNull | QueryOperator::IsNotNull => Some(0),
            QueryOperator::In | QueryOperator::NotIn => None,
            QueryOperator::Between => Some(2),
            _ => Some(1),
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
            QueryOperator::Like => write!(f, "LIKE"),
            QueryOperator::NotLike => write!(f, "NOT LIKE"),
            QueryOperator::In => write!(f, "IN"),
            QueryOperator::NotIn => write!(f, "NOT IN"),
            QueryOperator::IsNull => write!(f, "IS NULL"),
            QueryOperator::IsNotNull => write!(f, "IS NOT NULL"),
            QueryOperator::Between => write!(f, "BETWEEN"),
        }
    }
}

/// Aggregate functions allowed in select lists and HAVING clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Count => write!(f, "COUNT"),
            Aggregate::Sum => write!(f, "SUM"),
            Aggregate::Avg => write!(f, "AVG"),
            Aggregate::Min => write!(f, "MIN"),
            Aggregate::Max => write!(f, "MAX"),
        }
    }
}

/// A column reference or an aggregate over one
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnExpr {
    Column(String),
    Aggregate {
        function: Aggregate,
        distinct: bool,
        /// `None` renders as `*` (only valid for `COUNT`)
        column: Option<String>,
    },
}

impl ColumnExpr {
    pub fn column(name: &str) -> Self {
        ColumnExpr::Column(name.to_string())
    }

    pub fn aggregate(function: Aggregate, column: &str) -> Self {
        ColumnExpr::Aggregate {
            function,
            distinct: false,
            column: Some(column.to_string()),
        }
    }

    pub fn count_all() -> Self {
        ColumnExpr::Aggregate {
            function: Aggregate::Count,
            distinct: false,
            column: None,
        }
    }

    pub fn count(column: &str) -> Self {
        Self::aggregate(Aggregate::Count, column)
    }

    pub fn count_distinct(column: &str) -> Self {
        ColumnExpr::Aggregate {
            function: Aggregate::Count,
            distinct: true,
            column: Some(column.to_string()),
        }
    }

    pub fn sum(column: &str) -> Self {
        Self::aggregate(Aggregate::Sum, column)
    }

    pub fn avg(column: &str) -> Self {
        Self::aggregate(Aggregate::Avg, column)
    }

    pub fn min(column: &str) -> Self {
        Self::aggregate(Aggregate::Min, column)
    }

    pub fn max(column: &str) -> Self {
        Self::aggregate(Aggregate::Max, column)
    }
}

impl From<&str> for ColumnExpr {
    fn from(name: &str) -> Self {
        ColumnExpr::column(name)
    }
}

/// One entry of a select list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*` or `qualifier.*`
    Wildcard { qualifier: Option<String> },
    Expr {
        expr: ColumnExpr,
        alias: Option<String>,
    },
}

impl From<&str> for SelectItem {
    fn from(name: &str) -> Self {
        match name.strip_suffix('*') {
            Some("") => SelectItem::Wildcard { qualifier: None },
            Some(prefix) if prefix.ends_with('.') => SelectItem::Wildcard {
                qualifier: Some(prefix.trim_end_matches('.').to_string()),
            },
            _ => SelectItem::Expr {
                expr: ColumnExpr::column(name),
                alias: None,
            },
        }
    }
}

/// Where clause condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: ColumnExpr,
    pub operator: QueryOperator,
    /// Bound values, in the order their placeholders are emitted
    pub values: Vec<Value>,
}

impl Condition {
    pub fn new(column: impl Into<ColumnExpr>, operator: QueryOperator, values: Vec<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            values,
        }
    }
}

/// Table reference with optional alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn aliased(name: &str, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }
}

impl From<&str> for TableRef {
    /// Accepts `table`, `table alias` and `table AS alias`; anything else is
    /// kept whole and rejected later by identifier validation
    fn from(text: &str) -> Self {
        let parts: Vec<&str> = text.split_whitespace().collect();
        match parts.as_slice() {
            [name] => TableRef::new(name),
            [name, alias] => TableRef::aliased(name, alias),
            [name, keyword, alias] if keyword.eq_ignore_ascii_case("as") => {
                TableRef::aliased(name, alias)
            }
            _ => TableRef::new(text),
        }
    }
}

/// Join types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
        }
    }
}

/// Join clause
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on_conditions: Vec<(String, String)>, // (left_column, right_column)
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Statement kinds produced by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Select => write!(f, "SELECT"),
            QueryType::Insert => write!(f, "INSERT"),
            QueryType::Update => write!(f, "UPDATE"),
            QueryType::Delete => write!(f, "DELETE"),
            QueryType::CreateTable => write!(f, "CREATE TABLE"),
        }
    }
}

/// Statement text plus its bound values.
///
/// The text never contains a caller-supplied value: each one is a placeholder
/// token, and `parameters` lists the values in token order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuery {
    sql: String,
    parameters: Vec<Value>,
    dialect: Dialect,
}

impl GeneratedQuery {
    pub(crate) fn new(sql: String, parameters: Vec<Value>, dialect: Dialect) -> Self {
        Self {
            sql,
            parameters,
            dialect,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Placeholder tokens present in the text
    pub fn placeholder_count(&self) -> usize {
        self.dialect.profile().placeholder_count(&self.sql)
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.parameters)
    }
}

impl fmt::Display for GeneratedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ref_parsing() {
        assert_eq!(TableRef::from("users"), TableRef::new("users"));
        assert_eq!(TableRef::from("customers c"), TableRef::aliased("customers", "c"));
        assert_eq!(TableRef::from("orders AS o"), TableRef::aliased("orders", "o"));
        assert_eq!(
            TableRef::from("users; DROP TABLE x"),
            TableRef::new("users; DROP TABLE x")
        );
    }

    #[test]
    fn test_select_item_parsing() {
        assert_eq!(SelectItem::from("*"), SelectItem::Wildcard { qualifier: None });
        assert_eq!(
            SelectItem::from("c.*"),
            SelectItem::Wildcard {
                qualifier: Some("c".to_string())
            }
        );
        assert_eq!(
            SelectItem::from("id"),
            SelectItem::Expr {
                expr: ColumnExpr::column("id"),
                alias: None
            }
        );
    }

    #[test]
    fn test_operator_arity() {
        assert_eq!(QueryOperator::IsNull.arity(), Some(0));
        assert_eq!(QueryOperator::Between.arity(), Some(2));
        assert_eq!(QueryOperator::In.arity(), None);
        assert_eq!(QueryOperator::Like.arity(), Some(1));
    }
}
