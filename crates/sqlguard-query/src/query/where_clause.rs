//! WHERE clause operations shared by SELECT, UPDATE and DELETE builders

use serde_json::Value;

use super::types::{Condition, QueryOperator};

/// Fluent WHERE methods for any builder that owns a condition list.
///
/// Conditions are ANDed in the order they were added, and their values are
/// bound in that same order.
pub trait WhereClause: Sized {
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;

    /// Add an arbitrary condition
    fn where_condition(mut self, condition: Condition) -> Self {
        self.conditions_mut().push(condition);
        self
    }

    /// Add WHERE condition with equality
    fn where_eq<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.where_condition(Condition::new(column, QueryOperator::Equal, vec![value.into()]))
    }

    /// Add WHERE condition with not equal
    fn where_ne<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.where_condition(Condition::new(column, QueryOperator::NotEqual, vec![value.into()]))
    }

    /// Add WHERE condition with greater than
    fn where_gt<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::GreaterThan,
            vec![value.into()],
        ))
    }

    /// Add WHERE condition with greater than or equal
    fn where_gte<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::GreaterThanOrEqual,
            vec![value.into()],
        ))
    }

    /// Add WHERE condition with less than
    fn where_lt<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.where_condition(Condition::new(column, QueryOperator::LessThan, vec![value.into()]))
    }

    /// Add WHERE condition with less than or equal
    fn where_lte<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::LessThanOrEqual,
            vec![value.into()],
        ))
    }

    /// Add WHERE condition with LIKE. The pattern is bound like any other value.
    fn where_like(self, column: &str, pattern: &str) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::Like,
            vec![Value::String(pattern.to_string())],
        ))
    }

    /// Add WHERE condition with NOT LIKE
    fn where_not_like(self, column: &str, pattern: &str) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::NotLike,
            vec![Value::String(pattern.to_string())],
        ))
    }

    /// Add WHERE condition with IN
    fn where_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::In,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Add WHERE condition with NOT IN
    fn where_not_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::NotIn,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Add WHERE condition with BETWEEN
    fn where_between<T: Into<Value>>(self, column: &str, start: T, end: T) -> Self {
        self.where_condition(Condition::new(
            column,
            QueryOperator::Between,
            vec![start.into(), end.into()],
        ))
    }

    /// Add WHERE condition with IS NULL
    fn where_null(self, column: &str) -> Self {
        self.where_condition(Condition::new(column, QueryOperator::IsNull, Vec::new()))
    }

    /// Add WHERE condition with IS NOT NULL
    fn where_not_null(self, column: &str) -> Self {
        self.where_condition(Condition::new(column, QueryOperator::IsNotNull, Vec::new()))
    }
}
