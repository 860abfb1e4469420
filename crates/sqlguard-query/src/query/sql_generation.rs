//! SQL generation
//!
//! Generation is split in two passes. [`Statement::validate`] checks every
//! structural input and fails on the first violation; [`Statement::render`]
//! then writes dialect text and cannot fail. Callers run the admission check
//! between the two.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sqlguard_validation::{
    sanitize_for_logging, validate_identifier, validate_integer, validate_qualified_identifier,
    validate_string, SecurityLevel,
};

use super::ddl::{ColumnDefault, CreateTableQuery};
use super::dml::{DeleteQuery, InsertQuery, UpdateQuery};
use super::select::SelectQuery;
use super::types::*;
use crate::dialect::{Dialect, DialectProfile, LimitSyntax, Placeholders};
use crate::error::{QueryError, QueryResult};

/// Maximum length of a text column default
pub const MAX_TEXT_DEFAULT_LENGTH: usize = 255;

static COLUMN_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*( [A-Za-z][A-Za-z0-9_]*)*(\(\d+(\s*,\s*\d+)?\))?$")
        .expect("valid regex")
});

/// Limits and level applied to one generation call
#[derive(Debug, Clone, Copy)]
pub struct InputRules {
    pub level: SecurityLevel,
    pub max_limit: i64,
    pub max_parameter_length: usize,
    pub profile: &'static DialectProfile,
}

impl InputRules {
    pub fn table(&self, name: &str) -> QueryResult<()> {
        validate_identifier(name, self.level)?;
        Ok(())
    }

    pub fn table_ref(&self, table: &TableRef) -> QueryResult<()> {
        self.table(&table.name)?;
        if let Some(alias) = &table.alias {
            self.alias(alias)?;
        }
        Ok(())
    }

    /// Column references may be qualified (`t.col`) at every level
    pub fn column(&self, name: &str) -> QueryResult<()> {
        validate_qualified_identifier(name, self.level)?;
        Ok(())
    }

    /// Aliases are always plain identifiers
    pub fn alias(&self, name: &str) -> QueryResult<()> {
        let level = match self.level {
            SecurityLevel::Permissive => SecurityLevel::Normal,
            level => level,
        };
        validate_identifier(name, level)?;
        Ok(())
    }

    pub fn column_expr(&self, expr: &ColumnExpr) -> QueryResult<()> {
        match expr {
            ColumnExpr::Column(name) => self.column(name),
            ColumnExpr::Aggregate {
                function,
                distinct,
                column,
            } => match column {
                Some(name) => self.column(name),
                None if *function == Aggregate::Count && !distinct => Ok(()),
                None => Err(QueryError::malformed(format!(
                    "{}{}(*) is not a valid aggregate",
                    function,
                    if *distinct { " DISTINCT" } else { "" }
                ))),
            },
        }
    }

    /// Bound values: strings are length-checked, and screened for injection
    /// patterns under `Strict`
    pub fn value(&self, value: &Value) -> QueryResult<()> {
        match value {
            Value::String(text) => {
                validate_string(
                    text,
                    self.max_parameter_length,
                    self.level.screens_parameters(),
                )?;
                Ok(())
            }
            Value::Array(items) => items.iter().try_for_each(|item| self.value(item)),
            Value::Object(map) => map.values().try_for_each(|item| self.value(item)),
            _ => Ok(()),
        }
    }

    pub fn condition(&self, condition: &Condition) -> QueryResult<()> {
        self.column_expr(&condition.column)?;
        let count = condition.values.len();
        match condition.operator.arity() {
            Some(expected) if expected != count => {
                return Err(QueryError::malformed(format!(
                    "{} takes {} value(s), got {}",
                    condition.operator, expected, count
                )));
            }
            None if count == 0 => {
                return Err(QueryError::malformed(format!(
                    "{} requires at least one value",
                    condition.operator
                )));
            }
            _ => {}
        }
        condition.values.iter().try_for_each(|value| self.value(value))
    }

    pub fn limit(&self, limit: i64) -> QueryResult<()> {
        validate_integer(limit, 1, self.max_limit)?;
        Ok(())
    }

    pub fn offset(&self, offset: i64) -> QueryResult<()> {
        validate_integer(offset, 0, i64::MAX)?;
        Ok(())
    }

    fn columns(&self, columns: &[String]) -> QueryResult<()> {
        columns.iter().try_for_each(|column| self.column(column))
    }
}

/// Statement text writer with its own placeholder sequence
#[derive(Debug)]
pub struct SqlWriter {
    dialect: Dialect,
    profile: &'static DialectProfile,
    quote_identifiers: bool,
    sql: String,
    placeholders: Placeholders,
}

impl SqlWriter {
    pub fn new(dialect: Dialect, quote_identifiers: bool) -> Self {
        let profile = dialect.profile();
        Self {
            dialect,
            profile,
            quote_identifiers,
            sql: String::new(),
            placeholders: Placeholders::new(profile.placeholder_style),
        }
    }

    pub fn profile(&self) -> &'static DialectProfile {
        self.profile
    }

    pub fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub fn ident(&mut self, name: &str) {
        if self.quote_identifiers {
            let quoted = self.profile.quote_identifier(name);
            self.sql.push_str(&quoted);
        } else {
            self.sql.push_str(name);
        }
    }

    /// Write `items` separated by `", "`
    fn list<T>(&mut self, items: &[T], mut write: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            write(self, item);
        }
    }

    fn idents(&mut self, names: &[String]) {
        self.list(names, |w, name| w.ident(name));
    }

    /// Write a placeholder and record the value behind it
    pub fn bind(&mut self, value: &Value) {
        let token = self.placeholders.bind(value.clone());
        self.sql.push_str(&token);
    }

    fn table_ref(&mut self, table: &TableRef) {
        self.ident(&table.name);
        if let Some(alias) = &table.alias {
            self.sql.push(' ');
            self.ident(alias);
        }
    }

    fn column_expr(&mut self, expr: &ColumnExpr) {
        match expr {
            ColumnExpr::Column(name) => self.ident(name),
            ColumnExpr::Aggregate {
                function,
                distinct,
                column,
            } => {
                self.sql.push_str(&function.to_string());
                self.sql.push('(');
                if *distinct {
                    self.sql.push_str("DISTINCT ");
                }
                match column {
                    Some(name) => self.ident(name),
                    None => self.sql.push('*'),
                }
                self.sql.push(')');
            }
        }
    }

    fn conditions(&mut self, keyword: &str, conditions: &[Condition]) {
        if conditions.is_empty() {
            return;
        }
        self.sql.push(' ');
        self.sql.push_str(keyword);
        self.sql.push(' ');
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(" AND ");
            }
            self.condition(condition);
        }
    }

    fn condition(&mut self, condition: &Condition) {
        self.column_expr(&condition.column);
        self.sql.push(' ');
        self.sql.push_str(&condition.operator.to_string());
        match condition.operator {
            QueryOperator::IsNull | QueryOperator::IsNotNull => {}
            QueryOperator::In | QueryOperator::NotIn => {
                self.sql.push_str(" (");
                self.list(&condition.values, |w, value| w.bind(value));
                self.sql.push(')');
            }
            QueryOperator::Between => {
                self.sql.push(' ');
                self.bind(&condition.values[0]);
                self.sql.push_str(" AND ");
                self.bind(&condition.values[1]);
            }
            _ => {
                self.sql.push(' ');
                self.bind(&condition.values[0]);
            }
        }
    }

    fn returning(&mut self, columns: &[String]) {
        if columns.is_empty() {
            return;
        }
        if self.profile.supports_returning {
            self.sql.push_str(" RETURNING ");
            self.idents(columns);
        } else {
            tracing::debug!(dialect = %self.dialect, "RETURNING not supported, clause dropped");
        }
    }

    pub fn finish(self) -> GeneratedQuery {
        GeneratedQuery::new(self.sql, self.placeholders.into_parameters(), self.dialect)
    }
}

/// A statement the generator can check and render
pub trait Statement {
    fn kind(&self) -> QueryType;

    /// Target table, for audit records
    fn table_name(&self) -> &str;

    fn validate(&self, rules: &InputRules) -> QueryResult<()>;

    fn render(&self, writer: &mut SqlWriter);
}

impl Statement for SelectQuery {
    fn kind(&self) -> QueryType {
        QueryType::Select
    }

    fn table_name(&self) -> &str {
        self.from_tables.first().map(|t| t.name.as_str()).unwrap_or("")
    }

    fn validate(&self, rules: &InputRules) -> QueryResult<()> {
        if self.from_tables.is_empty() {
            return Err(QueryError::malformed("SELECT requires at least one table"));
        }
        for item in &self.items {
            match item {
                SelectItem::Wildcard {
                    qualifier: Some(qualifier),
                } => rules.column(qualifier)?,
                SelectItem::Wildcard { qualifier: None } => {}
                SelectItem::Expr { expr, alias } => {
                    rules.column_expr(expr)?;
                    if let Some(alias) = alias {
                        rules.alias(alias)?;
                    }
                }
            }
        }
        let bare_wildcard = self.items.is_empty()
            || self
                .items
                .contains(&SelectItem::Wildcard { qualifier: None });
        if bare_wildcard && rules.level == SecurityLevel::Strict {
            tracing::warn!(
                table = %sanitize_for_logging(self.table_name(), 64),
                "SELECT * under strict security level"
            );
        }

        self.from_tables.iter().try_for_each(|t| rules.table_ref(t))?;
        for join in &self.joins {
            rules.table_ref(&join.table)?;
            if join.on_conditions.is_empty() {
                return Err(QueryError::malformed(format!(
                    "{} on '{}' needs at least one ON column pair",
                    join.join_type,
                    sanitize_for_logging(&join.table.name, 64)
                )));
            }
            for (left, right) in &join.on_conditions {
                rules.column(left)?;
                rules.column(right)?;
            }
        }
        self.where_conditions
            .iter()
            .try_for_each(|c| rules.condition(c))?;
        rules.columns(&self.group_by)?;
        self.having_conditions
            .iter()
            .try_for_each(|c| rules.condition(c))?;
        for (column, _) in &self.order_by {
            rules.column(column)?;
        }

        if let Some(limit) = self.limit {
            rules.limit(limit)?;
        }
        match (self.limit, self.offset) {
            (_, None) => Ok(()),
            (Some(_), Some(offset)) => rules.offset(offset),
            (None, Some(_)) => Err(QueryError::malformed("OFFSET requires a LIMIT")),
        }
    }

    fn render(&self, w: &mut SqlWriter) {
        let limit_syntax = w.profile().limit_syntax;

        w.push("SELECT ");
        if self.distinct {
            w.push("DISTINCT ");
        }
        if let (LimitSyntax::Top, Some(limit), None) = (limit_syntax, self.limit, self.offset) {
            w.push(&format!("TOP {} ", limit));
        }

        if self.items.is_empty() {
            w.push("*");
        } else {
            w.list(&self.items, |w, item| match item {
                SelectItem::Wildcard { qualifier: None } => w.push("*"),
                SelectItem::Wildcard {
                    qualifier: Some(qualifier),
                } => {
                    w.ident(qualifier);
                    w.push(".*");
                }
                SelectItem::Expr { expr, alias } => {
                    w.column_expr(expr);
                    if let Some(alias) = alias {
                        w.push(" AS ");
                        w.ident(alias);
                    }
                }
            });
        }

        w.push(" FROM ");
        w.list(&self.from_tables, |w, table| w.table_ref(table));

        for join in &self.joins {
            w.push(" ");
            w.push(&join.join_type.to_string());
            w.push(" ");
            w.table_ref(&join.table);
            w.push(" ON ");
            for (i, (left, right)) in join.on_conditions.iter().enumerate() {
                if i > 0 {
                    w.push(" AND ");
                }
                w.ident(left);
                w.push(" = ");
                w.ident(right);
            }
        }

        w.conditions("WHERE", &self.where_conditions);

        if !self.group_by.is_empty() {
            w.push(" GROUP BY ");
            w.idents(&self.group_by);
        }

        w.conditions("HAVING", &self.having_conditions);

        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            w.list(&self.order_by, |w, (column, direction)| {
                w.ident(column);
                w.push(" ");
                w.push(&direction.to_string());
            });
        }

        let Some(limit) = self.limit else {
            return;
        };
        match (limit_syntax, self.offset) {
            (LimitSyntax::LimitOffset, None) => w.push(&format!(" LIMIT {}", limit)),
            (LimitSyntax::LimitOffset, Some(offset)) => {
                w.push(&format!(" LIMIT {} OFFSET {}", limit, offset))
            }
            (LimitSyntax::Top, None) => {}
            (LimitSyntax::Top, Some(offset)) => {
                // OFFSET/FETCH is only valid after ORDER BY
                if self.order_by.is_empty() {
                    w.push(" ORDER BY (SELECT NULL)");
                }
                w.push(&format!(
                    " OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                    offset, limit
                ));
            }
            (LimitSyntax::FetchFirst, offset) => {
                if let Some(offset) = offset {
                    w.push(&format!(" OFFSET {} ROWS", offset));
                }
                w.push(&format!(" FETCH FIRST {} ROWS ONLY", limit));
            }
        }
    }
}

impl Statement for InsertQuery {
    fn kind(&self) -> QueryType {
        QueryType::Insert
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn validate(&self, rules: &InputRules) -> QueryResult<()> {
        if self.table.is_empty() {
            return Err(QueryError::malformed("INSERT requires a table"));
        }
        rules.table(&self.table)?;
        if self.columns.is_empty() {
            return Err(QueryError::malformed("INSERT requires at least one column"));
        }
        rules.columns(&self.columns)?;
        if self.rows.is_empty() {
            return Err(QueryError::malformed("INSERT requires at least one row of values"));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(QueryError::malformed(format!(
                    "row {} has {} value(s) for {} column(s)",
                    i + 1,
                    row.len(),
                    self.columns.len()
                )));
            }
            row.iter().try_for_each(|value| rules.value(value))?;
        }
        rules.columns(&self.returning)
    }

    fn render(&self, w: &mut SqlWriter) {
        w.push("INSERT INTO ");
        w.ident(&self.table);
        w.push(" (");
        w.idents(&self.columns);
        w.push(") VALUES ");
        w.list(&self.rows, |w, row| {
            w.push("(");
            w.list(row, |w, value| w.bind(value));
            w.push(")");
        });
        w.returning(&self.returning);
    }
}

impl Statement for UpdateQuery {
    fn kind(&self) -> QueryType {
        QueryType::Update
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn validate(&self, rules: &InputRules) -> QueryResult<()> {
        if self.table.is_empty() {
            return Err(QueryError::malformed("UPDATE requires a table"));
        }
        rules.table(&self.table)?;
        if self.set_clauses.is_empty() {
            return Err(QueryError::malformed("UPDATE requires at least one SET column"));
        }
        for (column, value) in &self.set_clauses {
            rules.column(column)?;
            rules.value(value)?;
        }
        self.where_conditions
            .iter()
            .try_for_each(|c| rules.condition(c))?;
        rules.columns(&self.returning)
    }

    fn render(&self, w: &mut SqlWriter) {
        if self.where_conditions.is_empty() {
            tracing::warn!(table = %self.table, "UPDATE without WHERE affects every row");
        }
        w.push("UPDATE ");
        w.ident(&self.table);
        w.push(" SET ");
        w.list(&self.set_clauses, |w, (column, value)| {
            w.ident(column);
            w.push(" = ");
            w.bind(value);
        });
        w.conditions("WHERE", &self.where_conditions);
        w.returning(&self.returning);
    }
}

impl Statement for DeleteQuery {
    fn kind(&self) -> QueryType {
        QueryType::Delete
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn validate(&self, rules: &InputRules) -> QueryResult<()> {
        if self.table.is_empty() {
            return Err(QueryError::malformed("DELETE requires a table"));
        }
        rules.table(&self.table)?;
        self.where_conditions
            .iter()
            .try_for_each(|c| rules.condition(c))?;
        rules.columns(&self.returning)
    }

    fn render(&self, w: &mut SqlWriter) {
        if self.is_unbounded() {
            tracing::warn!(table = %self.table, "DELETE without WHERE affects every row");
        }
        w.push("DELETE FROM ");
        w.ident(&self.table);
        w.conditions("WHERE", &self.where_conditions);
        w.returning(&self.returning);
    }
}

impl Statement for CreateTableQuery {
    fn kind(&self) -> QueryType {
        QueryType::CreateTable
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn validate(&self, rules: &InputRules) -> QueryResult<()> {
        if self.table.is_empty() {
            return Err(QueryError::malformed("CREATE TABLE requires a table"));
        }
        rules.table(&self.table)?;
        if self.if_not_exists && !rules.profile.supports_if_not_exists {
            return Err(QueryError::malformed(format!(
                "{} does not support CREATE TABLE IF NOT EXISTS",
                rules.profile.name
            )));
        }
        if self.columns.is_empty() {
            return Err(QueryError::malformed("CREATE TABLE requires at least one column"));
        }
        for column in &self.columns {
            rules.alias(&column.name)?;
            if !COLUMN_TYPE.is_match(&column.data_type) {
                return Err(QueryError::malformed(format!(
                    "invalid type for column '{}': {}",
                    column.name,
                    sanitize_for_logging(&column.data_type, 64)
                )));
            }
            if let Some(ColumnDefault::Text(text)) = &column.default {
                validate_string(text, MAX_TEXT_DEFAULT_LENGTH, true)?;
            }
        }
        for key in &self.primary_key {
            if !self.declares(key) {
                return Err(QueryError::malformed(format!(
                    "primary key column '{}' is not declared",
                    sanitize_for_logging(key, 64)
                )));
            }
        }
        for fk in &self.foreign_keys {
            if !self.declares(&fk.column) {
                return Err(QueryError::malformed(format!(
                    "foreign key column '{}' is not declared",
                    sanitize_for_logging(&fk.column, 64)
                )));
            }
            rules.table(&fk.references_table)?;
            rules.alias(&fk.references_column)?;
        }
        Ok(())
    }

    fn render(&self, w: &mut SqlWriter) {
        let boolean_literals = w.profile().supports_boolean_literals;

        w.push("CREATE TABLE ");
        if self.if_not_exists {
            w.push("IF NOT EXISTS ");
        }
        w.ident(&self.table);
        w.push(" (");
        w.list(&self.columns, |w, column| {
            w.ident(&column.name);
            w.push(" ");
            w.push(&column.data_type);
            if column.not_null {
                w.push(" NOT NULL");
            }
            if let Some(default) = &column.default {
                w.push(" DEFAULT ");
                w.push(&render_default(default, boolean_literals));
            }
        });
        if !self.primary_key.is_empty() {
            w.push(", PRIMARY KEY (");
            w.idents(&self.primary_key);
            w.push(")");
        }
        for fk in &self.foreign_keys {
            w.push(", FOREIGN KEY (");
            w.ident(&fk.column);
            w.push(") REFERENCES ");
            w.ident(&fk.references_table);
            w.push("(");
            w.ident(&fk.references_column);
            w.push(")");
        }
        w.push(")");
    }
}

fn render_default(default: &ColumnDefault, boolean_literals: bool) -> String {
    match default {
        ColumnDefault::Null => "NULL".to_string(),
        ColumnDefault::Integer(value) => value.to_string(),
        ColumnDefault::Boolean(value) => match (boolean_literals, value) {
            (true, true) => "TRUE".to_string(),
            (true, false) => "FALSE".to_string(),
            (false, true) => "1".to_string(),
            (false, false) => "0".to_string(),
        },
        ColumnDefault::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        ColumnDefault::CurrentDate => "CURRENT_DATE".to_string(),
        ColumnDefault::Text(text) => format!("'{}'", text.replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ddl::ColumnDefinition;
    use crate::query::where_clause::WhereClause;
    use serde_json::json;

    fn rules(dialect: Dialect, level: SecurityLevel) -> InputRules {
        InputRules {
            level,
            max_limit: 10_000,
            max_parameter_length: 65_536,
            profile: dialect.profile(),
        }
    }

    fn generate<S: Statement>(statement: &S, dialect: Dialect) -> QueryResult<GeneratedQuery> {
        statement.validate(&rules(dialect, SecurityLevel::Normal))?;
        let mut writer = SqlWriter::new(dialect, false);
        statement.render(&mut writer);
        Ok(writer.finish())
    }

    #[test]
    fn test_select_with_where_and_limit() {
        let query = SelectQuery::new()
            .select("id, username")
            .from("users")
            .where_eq("status", "active")
            .where_gt("age", 18)
            .order_by("id", OrderDirection::Asc)
            .limit(10);

        let generated = generate(&query, Dialect::Postgres).unwrap();
        assert_eq!(
            generated.sql(),
            "SELECT id, username FROM users WHERE status = $1 AND age > $2 ORDER BY id ASC LIMIT 10"
        );
        assert_eq!(generated.parameters(), &[json!("active"), json!(18)]);
    }

    #[test]
    fn test_select_join_group_having() {
        let query = SelectQuery::new()
            .select("c.name")
            .select_count_all(Some("order_count"))
            .from("customers c")
            .join(JoinType::Left, "orders o", &[("o.customer_id", "c.id")])
            .group_by("c.name")
            .having(ColumnExpr::count_all(), QueryOperator::GreaterThan, vec![json!(5)]);

        let generated = generate(&query, Dialect::MySql).unwrap();
        assert_eq!(
            generated.sql(),
            "SELECT c.name, COUNT(*) AS order_count FROM customers c \
             LEFT JOIN orders o ON o.customer_id = c.id GROUP BY c.name HAVING COUNT(*) > ?"
        );
        assert_eq!(generated.parameters(), &[json!(5)]);
    }

    #[test]
    fn test_in_and_between_bind_in_order() {
        let query = SelectQuery::new()
            .from("events")
            .where_in("kind", vec!["a", "b", "c"])
            .where_between("day", 1, 7);

        let generated = generate(&query, Dialect::Oracle).unwrap();
        assert_eq!(
            generated.sql(),
            "SELECT * FROM events WHERE kind IN (:param1, :param2, :param3) \
             AND day BETWEEN :param4 AND :param5"
        );
        assert_eq!(generated.placeholder_count(), generated.parameters().len());
    }

    #[test]
    fn test_mssql_top_and_offset_fetch() {
        let top = SelectQuery::new().select_distinct("name").from("users").limit(5);
        assert_eq!(
            generate(&top, Dialect::MsSql).unwrap().sql(),
            "SELECT DISTINCT TOP 5 name FROM users"
        );

        let paged = SelectQuery::new().select("name").from("users").limit(5).offset(10);
        assert_eq!(
            generate(&paged, Dialect::MsSql).unwrap().sql(),
            "SELECT name FROM users ORDER BY (SELECT NULL) OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_oracle_fetch_first() {
        let query = SelectQuery::new()
            .select("name")
            .from("users")
            .order_by("name", OrderDirection::Asc)
            .limit(5)
            .offset(10);
        assert_eq!(
            generate(&query, Dialect::Oracle).unwrap().sql(),
            "SELECT name FROM users ORDER BY name ASC OFFSET 10 ROWS FETCH FIRST 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_limit_bounds() {
        let zero = SelectQuery::new().from("users").limit(0);
        assert_eq!(generate(&zero, Dialect::Postgres).unwrap_err().code(), "out_of_range");

        let huge = SelectQuery::new().from("users").limit(10_001);
        assert!(generate(&huge, Dialect::Postgres).is_err());

        let negative_offset = SelectQuery::new().from("users").limit(1).offset(-1);
        assert!(generate(&negative_offset, Dialect::Postgres).is_err());

        let offset_only = SelectQuery::new().from("users").offset(5);
        assert!(matches!(
            generate(&offset_only, Dialect::Postgres),
            Err(QueryError::Malformed(_))
        ));
    }

    #[test]
    fn test_structural_errors_are_malformed() {
        let no_table = SelectQuery::new().select("id");
        assert!(matches!(generate(&no_table, Dialect::Postgres), Err(QueryError::Malformed(_))));

        let bad_join = SelectQuery::new().from("a").join(JoinType::Inner, "b", &[]);
        assert!(matches!(generate(&bad_join, Dialect::Postgres), Err(QueryError::Malformed(_))));

        let empty_in = SelectQuery::new().from("a").where_in::<i64>("id", vec![]);
        assert!(matches!(generate(&empty_in, Dialect::Postgres), Err(QueryError::Malformed(_))));

        let sum_star = SelectQuery::new().from("a").select_expr(
            ColumnExpr::Aggregate {
                function: Aggregate::Sum,
                distinct: false,
                column: None,
            },
            None,
        );
        assert!(matches!(generate(&sum_star, Dialect::Postgres), Err(QueryError::Malformed(_))));
    }

    #[test]
    fn test_insert_multi_row_and_returning() {
        let insert = InsertQuery::into_table("users")
            .columns(&["name", "age"])
            .values(vec![json!("a"), json!(1)])
            .values(vec![json!("b"), json!(2)])
            .returning(&["id"]);

        let pg = generate(&insert, Dialect::Postgres).unwrap();
        assert_eq!(
            pg.sql(),
            "INSERT INTO users (name, age) VALUES ($1, $2), ($3, $4) RETURNING id"
        );

        let mysql = generate(&insert, Dialect::MySql).unwrap();
        assert_eq!(mysql.sql(), "INSERT INTO users (name, age) VALUES (?, ?), (?, ?)");
        assert_eq!(mysql.parameters().len(), 4);
    }

    #[test]
    fn test_insert_row_width_mismatch() {
        let insert = InsertQuery::into_table("users")
            .columns(&["name", "age"])
            .values(vec![json!("a")]);
        assert!(matches!(generate(&insert, Dialect::Postgres), Err(QueryError::Malformed(_))));
    }

    #[test]
    fn test_update_binds_set_before_where() {
        let update = UpdateQuery::table("users")
            .set("name", "new")
            .set_null("nickname")
            .where_eq("id", 7);

        let generated = generate(&update, Dialect::MsSql).unwrap();
        assert_eq!(
            generated.sql(),
            "UPDATE users SET name = @param1, nickname = @param2 WHERE id = @param3"
        );
        assert_eq!(generated.parameters(), &[json!("new"), Value::Null, json!(7)]);

        assert!(matches!(
            generate(&UpdateQuery::table("users"), Dialect::MsSql),
            Err(QueryError::Malformed(_))
        ));
    }

    #[test]
    fn test_delete_renders_where() {
        let delete = DeleteQuery::from("sessions").where_lt("expires_at", 100);
        assert_eq!(
            generate(&delete, Dialect::Sqlite).unwrap().sql(),
            "DELETE FROM sessions WHERE expires_at < ?"
        );
        assert_eq!(
            generate(&DeleteQuery::from("sessions"), Dialect::Sqlite).unwrap().sql(),
            "DELETE FROM sessions"
        );
    }

    #[test]
    fn test_create_table() {
        let table = CreateTableQuery::new("posts")
            .if_not_exists()
            .column(ColumnDefinition::new("id", "INTEGER").not_null())
            .column(
                ColumnDefinition::new("title", "VARCHAR(255)")
                    .default_value(ColumnDefault::Text("it's new".to_string())),
            )
            .column(
                ColumnDefinition::new("published", "BOOLEAN")
                    .default_value(ColumnDefault::Boolean(false)),
            )
            .column(ColumnDefinition::new("user_id", "INTEGER"))
            .primary_key(&["id"])
            .foreign_key("user_id", "users", "id");

        assert_eq!(
            generate(&table, Dialect::Postgres).unwrap().sql(),
            "CREATE TABLE IF NOT EXISTS posts (id INTEGER NOT NULL, \
             title VARCHAR(255) DEFAULT 'it''s new', published BOOLEAN DEFAULT FALSE, \
             user_id INTEGER, PRIMARY KEY (id), FOREIGN KEY (user_id) REFERENCES users(id))"
        );

        assert!(matches!(generate(&table, Dialect::MsSql), Err(QueryError::Malformed(_))));
    }

    #[test]
    fn test_create_table_rejects_bad_definitions() {
        let bad_type = CreateTableQuery::new("t")
            .column(ColumnDefinition::new("id", "INTEGER; DROP TABLE users"));
        assert!(matches!(generate(&bad_type, Dialect::Postgres), Err(QueryError::Malformed(_))));

        let undeclared_key = CreateTableQuery::new("t")
            .column(ColumnDefinition::new("id", "INTEGER"))
            .primary_key(&["uuid"]);
        assert!(matches!(
            generate(&undeclared_key, Dialect::Postgres),
            Err(QueryError::Malformed(_))
        ));

        let injected_default = CreateTableQuery::new("t").column(
            ColumnDefinition::new("note", "TEXT")
                .default_value(ColumnDefault::Text("x'; DROP TABLE users--".to_string())),
        );
        assert!(generate(&injected_default, Dialect::Postgres).unwrap_err().is_security());

        let no_columns = CreateTableQuery::new("t");
        assert!(matches!(generate(&no_columns, Dialect::Postgres), Err(QueryError::Malformed(_))));
    }

    #[test]
    fn test_quoted_identifiers() {
        let query = SelectQuery::new()
            .select("c.*")
            .select_as("o.total", "amount")
            .from("customers c")
            .inner_join("orders o", "o.customer_id", "c.id");

        query.validate(&rules(Dialect::MsSql, SecurityLevel::Normal)).unwrap();
        let mut writer = SqlWriter::new(Dialect::MsSql, true);
        query.render(&mut writer);
        assert_eq!(
            writer.finish().sql(),
            "SELECT [c].*, [o].[total] AS [amount] FROM [customers] [c] \
             INNER JOIN [orders] [o] ON [o].[customer_id] = [c].[id]"
        );
    }

    #[test]
    fn test_strict_screens_parameters() {
        let query = SelectQuery::new()
            .from("users")
            .where_eq("name", "' OR '1'='1");

        assert!(query.validate(&rules(Dialect::Postgres, SecurityLevel::Normal)).is_ok());
        let err = query
            .validate(&rules(Dialect::Postgres, SecurityLevel::Strict))
            .unwrap_err();
        assert!(err.is_security());
    }

    #[test]
    fn test_parameter_length_guard() {
        let mut strict_rules = rules(Dialect::Postgres, SecurityLevel::Normal);
        strict_rules.max_parameter_length = 8;
        let query = SelectQuery::new().from("users").where_eq("name", "123456789");
        assert_eq!(query.validate(&strict_rules).unwrap_err().code(), "too_long");
    }
}
