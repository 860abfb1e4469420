//! DML statement builders (INSERT, UPDATE, DELETE)

use serde_json::Value;

use super::types::Condition;
use super::where_clause::WhereClause;

/// Structured INSERT request, one or more rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertQuery {
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
    pub(crate) returning: Vec<String>,
}

impl InsertQuery {
    /// Start an INSERT query
    pub fn into_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    /// Set a column value on the first row
    pub fn set<T: Into<Value>>(mut self, column: &str, value: T) -> Self {
        self.columns.push(column.to_string());
        match self.rows.first_mut() {
            Some(row) => row.push(value.into()),
            None => self.rows.push(vec![value.into()]),
        }
        self
    }

    /// Declare the column list for [`values`](Self::values) rows
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append a row; it must carry one value per declared column
    pub fn values<T: Into<Value>>(mut self, row: Vec<T>) -> Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Columns to return (Postgres and SQLite only)
    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Structured UPDATE request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateQuery {
    pub(crate) table: String,
    pub(crate) set_clauses: Vec<(String, Value)>,
    pub(crate) where_conditions: Vec<Condition>,
    pub(crate) returning: Vec<String>,
}

impl UpdateQuery {
    /// Start an UPDATE query
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    /// Set a column value. SET values are bound before any WHERE value.
    pub fn set<T: Into<Value>>(mut self, column: &str, value: T) -> Self {
        self.set_clauses.push((column.to_string(), value.into()));
        self
    }

    /// Set a column to NULL; still bound as a parameter
    pub fn set_null(self, column: &str) -> Self {
        self.set(column, Value::Null)
    }

    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

impl WhereClause for UpdateQuery {
    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.where_conditions
    }
}

/// Structured DELETE request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteQuery {
    pub(crate) table: String,
    pub(crate) where_conditions: Vec<Condition>,
    pub(crate) returning: Vec<String>,
}

impl DeleteQuery {
    /// Start a DELETE query
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Whether the statement would touch every row
    pub fn is_unbounded(&self) -> bool {
        self.where_conditions.is_empty()
    }
}

impl WhereClause for DeleteQuery {
    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.where_conditions
    }
}
