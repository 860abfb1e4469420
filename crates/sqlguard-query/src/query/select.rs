//! SELECT statement builder

use serde_json::Value;

use super::types::*;
use super::where_clause::WhereClause;

/// Structured SELECT request.
///
/// ```
/// use sqlguard_query::{SelectQuery, WhereClause, JoinType, OrderDirection};
///
/// let query = SelectQuery::new()
///     .select("c.name")
///     .select_sum_as("o.total", "spent")
///     .from("customers c")
///     .join(JoinType::Inner, "orders o", &[("o.customer_id", "c.id")])
///     .where_eq("c.status", "active")
///     .group_by("c.name")
///     .order_by("spent", OrderDirection::Desc)
///     .limit(10);
/// assert_eq!(query.from_tables().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub(crate) distinct: bool,
    pub(crate) items: Vec<SelectItem>,
    pub(crate) from_tables: Vec<TableRef>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) where_conditions: Vec<Condition>,
    pub(crate) group_by: Vec<String>,
    pub(crate) having_conditions: Vec<Condition>,
    pub(crate) order_by: Vec<(String, OrderDirection)>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add comma-separated select items. `*` and `t.*` become wildcards.
    pub fn select(mut self, fields: &str) -> Self {
        self.items.extend(
            fields
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(SelectItem::from),
        );
        self
    }

    /// Add SELECT DISTINCT to the query
    pub fn select_distinct(mut self, fields: &str) -> Self {
        self.distinct = true;
        self.select(fields)
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a column with an alias
    pub fn select_as(mut self, column: &str, alias: &str) -> Self {
        self.items.push(SelectItem::Expr {
            expr: ColumnExpr::column(column),
            alias: Some(alias.to_string()),
        });
        self
    }

    /// Add any expression, optionally aliased
    pub fn select_expr(mut self, expr: ColumnExpr, alias: Option<&str>) -> Self {
        self.items.push(SelectItem::Expr {
            expr,
            alias: alias.map(str::to_string),
        });
        self
    }

    /// `COUNT(*)`
    pub fn select_count_all(self, alias: Option<&str>) -> Self {
        self.select_expr(ColumnExpr::count_all(), alias)
    }

    pub fn select_count(self, column: &str, alias: Option<&str>) -> Self {
        self.select_expr(ColumnExpr::count(column), alias)
    }

    pub fn select_sum_as(self, column: &str, alias: &str) -> Self {
        self.select_expr(ColumnExpr::sum(column), Some(alias))
    }

    pub fn select_avg_as(self, column: &str, alias: &str) -> Self {
        self.select_expr(ColumnExpr::avg(column), Some(alias))
    }

    pub fn select_min_as(self, column: &str, alias: &str) -> Self {
        self.select_expr(ColumnExpr::min(column), Some(alias))
    }

    pub fn select_max_as(self, column: &str, alias: &str) -> Self {
        self.select_expr(ColumnExpr::max(column), Some(alias))
    }

    /// Set the FROM table, replacing any previous one. Accepts `t`, `t a` or `t AS a`.
    pub fn from(mut self, table: &str) -> Self {
        self.from_tables = vec![TableRef::from(table)];
        self
    }

    /// Add another FROM table (cross join)
    pub fn also_from(mut self, table: &str) -> Self {
        self.from_tables.push(TableRef::from(table));
        self
    }

    /// Add a join. Each `(left, right)` pair renders as `left = right`.
    pub fn join(mut self, join_type: JoinType, table: &str, on: &[(&str, &str)]) -> Self {
        self.joins.push(JoinClause {
            join_type,
            table: TableRef::from(table),
            on_conditions: on
                .iter()
                .map(|(left, right)| (left.to_string(), right.to_string()))
                .collect(),
        });
        self
    }

    pub fn inner_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.join(JoinType::Inner, table, &[(left_col, right_col)])
    }

    pub fn left_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.join(JoinType::Left, table, &[(left_col, right_col)])
    }

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }

    /// Add a HAVING condition on an aggregate or grouped column
    pub fn having(mut self, expr: ColumnExpr, operator: QueryOperator, values: Vec<Value>) -> Self {
        self.having_conditions.push(Condition::new(expr, operator, values));
        self
    }

    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.order_by.push((column.to_string(), direction));
        self
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, OrderDirection::Desc)
    }

    pub fn limit(mut self, count: i64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn offset(mut self, count: i64) -> Self {
        self.offset = Some(count);
        self
    }

    /// Limit and offset for a 1-based page number
    pub fn paginate(self, per_page: i64, page: i64) -> Self {
        let offset = page.saturating_sub(1).max(0).saturating_mul(per_page);
        self.limit(per_page).offset(offset)
    }

    pub fn from_tables(&self) -> &[TableRef] {
        &self.from_tables
    }

    pub fn items(&self) -> &[SelectItem] {
        &self.items
    }
}

impl WhereClause for SelectQuery {
    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.where_conditions
    }
}
