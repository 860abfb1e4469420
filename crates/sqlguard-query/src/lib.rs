//! # sqlguard-query
//!
//! Dialect-aware, parameterized SQL statement generation.
//!
//! Statements are described with typed builders ([`SelectQuery`],
//! [`InsertQuery`], [`UpdateQuery`], [`DeleteQuery`], [`CreateTableQuery`])
//! and turned into text by a [`QueryGenerator`]. Every caller-supplied value
//! becomes a placeholder in the dialect's style and is returned separately in
//! [`GeneratedQuery::parameters`], in placeholder order.
//!
//! ```
//! use sqlguard_query::{Dialect, GeneratorConfig, QueryGenerator, SelectQuery, WhereClause};
//!
//! let generator = QueryGenerator::new(GeneratorConfig::new(Dialect::Postgres));
//! let query = SelectQuery::new()
//!     .select("id, username")
//!     .from("users")
//!     .where_eq("status", "active")
//!     .limit(10);
//!
//! let generated = generator.generate_select_query(&query, Some("user-42")).unwrap();
//! assert_eq!(
//!     generated.sql(),
//!     "SELECT id, username FROM users WHERE status = $1 LIMIT 10"
//! );
//! ```

pub mod analysis;
pub mod config;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod query;

pub use analysis::{optimize_query, validate_query_security};
pub use config::GeneratorConfig;
pub use dialect::{Dialect, DialectProfile, LimitSyntax, PlaceholderStyle, Placeholders};
pub use error::{ConfigError, QueryError, QueryResult};
pub use generator::{QueryGenerator, AUDIT_TARGET};
pub use query::{
    Aggregate, ColumnDefault, ColumnDefinition, ColumnExpr, Condition, CreateTableQuery,
    DeleteQuery, ForeignKey, GeneratedQuery, InsertQuery, JoinClause, JoinType, OrderDirection,
    QueryOperator, QueryType, SelectItem, SelectQuery, TableRef, UpdateQuery, WhereClause,
};

// Validation and security types that appear in this crate's API
pub use sqlguard_security::{RateLimitConfig, RateLimiter, SecurityError};
pub use sqlguard_validation::{sanitize_for_logging, SecurityLevel, ValidationError};
