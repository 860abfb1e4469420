//! Statement builders and the dialect-aware SQL renderer

pub mod ddl;
pub mod dml;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use ddl::{ColumnDefault, ColumnDefinition, CreateTableQuery, ForeignKey};
pub use dml::{DeleteQuery, InsertQuery, UpdateQuery};
pub use select::SelectQuery;
pub use sql_generation::{InputRules, SqlWriter, Statement};
pub use types::{
    Aggregate, ColumnExpr, Condition, GeneratedQuery, JoinClause, JoinType, OrderDirection,
    QueryOperator, QueryType, SelectItem, TableRef,
};
pub use where_clause::WhereClause;
