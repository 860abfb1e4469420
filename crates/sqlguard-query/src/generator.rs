//! Query generator
//!
//! Every `generate_*` call runs the same three steps: validate all structural
//! input, consult the rate limiter when a caller identity is given, then
//! render. A failure in any step ends the call; no partial statement is
//! returned.

use sqlguard_security::RateLimiter;
use sqlguard_validation::sanitize_for_logging;
use std::sync::Arc;

use crate::analysis;
use crate::config::GeneratorConfig;
use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::query::{
    CreateTableQuery, DeleteQuery, GeneratedQuery, InputRules, InsertQuery, SelectQuery,
    SqlWriter, Statement, UpdateQuery,
};

/// Log target for audit events
pub const AUDIT_TARGET: &str = "sqlguard::audit";

/// Dialect-aware, rate-limited statement generator.
///
/// ```
/// use sqlguard_query::{Dialect, GeneratorConfig, InsertQuery, QueryGenerator};
///
/// let generator = QueryGenerator::new(GeneratorConfig::new(Dialect::MsSql));
/// let insert = InsertQuery::into_table("users")
///     .set("username", "alice")
///     .set("email", "alice@example.com");
///
/// let query = generator.generate_insert_query(&insert, Some("api-key-1")).unwrap();
/// assert_eq!(query.sql(), "INSERT INTO users (username, email) VALUES (@param1, @param2)");
/// assert_eq!(query.parameters().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct QueryGenerator {
    config: GeneratorConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl QueryGenerator {
    /// Create a generator with its own rate limiter
    pub fn new(config: GeneratorConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        Self {
            config,
            rate_limiter,
        }
    }

    /// Like [`new`](Self::new), but rejects an invalid configuration
    pub fn try_new(config: GeneratorConfig) -> QueryResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a generator sharing an existing rate limiter
    pub fn with_rate_limiter(config: GeneratorConfig, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            config,
            rate_limiter,
        }
    }

    /// Default configuration for `dialect`
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new(GeneratorConfig::new(dialect))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn generate_select_query(
        &self,
        query: &SelectQuery,
        caller: Option<&str>,
    ) -> QueryResult<GeneratedQuery> {
        self.generate(query, caller)
    }

    pub fn generate_insert_query(
        &self,
        query: &InsertQuery,
        caller: Option<&str>,
    ) -> QueryResult<GeneratedQuery> {
        self.generate(query, caller)
    }

    pub fn generate_update_query(
        &self,
        query: &UpdateQuery,
        caller: Option<&str>,
    ) -> QueryResult<GeneratedQuery> {
        self.generate(query, caller)
    }

    pub fn generate_delete_query(
        &self,
        query: &DeleteQuery,
        caller: Option<&str>,
    ) -> QueryResult<GeneratedQuery> {
        self.generate(query, caller)
    }

    pub fn generate_create_table_query(
        &self,
        query: &CreateTableQuery,
        caller: Option<&str>,
    ) -> QueryResult<GeneratedQuery> {
        self.generate(query, caller)
    }

    /// Advisory warnings for raw SQL text; see [`analysis::validate_query_security`]
    pub fn validate_query_security(&self, sql: &str) -> Vec<String> {
        analysis::validate_query_security(sql)
    }

    /// Optimization hints for raw SQL text; see [`analysis::optimize_query`]
    pub fn optimize_query(&self, sql: &str) -> (String, Vec<String>) {
        analysis::optimize_query(sql)
    }

    fn rules(&self) -> InputRules {
        InputRules {
            level: self.config.security_level,
            max_limit: self.config.max_limit,
            max_parameter_length: self.config.max_parameter_length,
            profile: self.config.dialect.profile(),
        }
    }

    fn generate<S: Statement>(
        &self,
        statement: &S,
        caller: Option<&str>,
    ) -> QueryResult<GeneratedQuery> {
        if let Err(err) = statement.validate(&self.rules()) {
            self.reject(statement, caller, &err);
            return Err(err);
        }

        if let Err(err) = self.admit(caller) {
            self.reject(statement, caller, &err);
            return Err(err);
        }

        let mut writer = SqlWriter::new(self.config.dialect, self.config.quote_identifiers);
        statement.render(&mut writer);
        let generated = writer.finish();

        if self.config.enable_audit_log {
            tracing::info!(
                target: AUDIT_TARGET,
                kind = %statement.kind(),
                table = %statement.table_name(),
                dialect = %self.config.dialect,
                caller = %caller.map(|c| sanitize_for_logging(c, 64)).unwrap_or_default(),
                parameters = generated.parameters().len(),
                sql = %generated.sql(),
                "query generated"
            );
        }

        Ok(generated)
    }

    fn admit(&self, caller: Option<&str>) -> QueryResult<()> {
        let Some(identity) = caller else {
            return Ok(());
        };
        if !self.config.enable_rate_limit {
            return Ok(());
        }

        let limits = &self.config.rate_limit;
        self.rate_limiter
            .check_with(identity, limits.max_requests, limits.window_seconds)?;
        Ok(())
    }

    fn reject<S: Statement>(&self, statement: &S, caller: Option<&str>, err: &QueryError) {
        let table = sanitize_for_logging(statement.table_name(), 64);
        let caller = caller.map(|c| sanitize_for_logging(c, 64)).unwrap_or_default();
        let reason = sanitize_for_logging(&err.to_string(), 256);

        if err.is_security() {
            tracing::warn!(
                kind = %statement.kind(),
                %table,
                %caller,
                code = err.code(),
                "{}",
                reason
            );
        } else {
            tracing::debug!(
                kind = %statement.kind(),
                %table,
                code = err.code(),
                "{}",
                reason
            );
        }

        if self.config.enable_audit_log {
            tracing::info!(
                target: AUDIT_TARGET,
                kind = %statement.kind(),
                %table,
                dialect = %self.config.dialect,
                %caller,
                code = err.code(),
                "query rejected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::WhereClause;
    use serde_json::json;
    use sqlguard_security::SecurityError;

    #[test]
    fn test_validation_runs_before_admission() {
        let generator =
            QueryGenerator::new(GeneratorConfig::new(Dialect::Postgres).with_rate_limit(1, 60));
        let bad = SelectQuery::new().from("users; DROP TABLE users");

        for _ in 0..3 {
            assert!(generator.generate_select_query(&bad, Some("caller")).is_err());
        }
        // Rejected inputs did not consume the caller's budget
        assert_eq!(generator.rate_limiter().current_count("caller"), 0);

        let good = SelectQuery::new().from("users").where_eq("id", 1);
        assert!(generator.generate_select_query(&good, Some("caller")).is_ok());
        let err = generator
            .generate_select_query(&good, Some("caller"))
            .unwrap_err();
        assert_eq!(err.code(), "rate_limit_exceeded");
    }

    #[test]
    fn test_rejection_with_unbounded_window() {
        let generator = QueryGenerator::new(
            GeneratorConfig::new(Dialect::Postgres).with_rate_limit(1, u64::MAX),
        );
        let query = SelectQuery::new().from("users");

        assert!(generator.generate_select_query(&query, Some("caller")).is_ok());
        match generator.generate_select_query(&query, Some("caller")) {
            Err(QueryError::Security(SecurityError::RateLimitExceeded {
                limit,
                window_seconds,
                ..
            })) => {
                assert_eq!(limit, 1);
                assert_eq!(window_seconds, u64::MAX);
            }
            other => panic!("expected rate limit rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_anonymous_calls_skip_rate_limit() {
        let generator =
            QueryGenerator::new(GeneratorConfig::new(Dialect::Sqlite).with_rate_limit(1, 60));
        let query = DeleteQuery::from("sessions").where_eq("id", json!(3));

        for _ in 0..5 {
            assert!(generator.generate_delete_query(&query, None).is_ok());
        }
        assert_eq!(generator.rate_limiter().tracked_identities(), 0);
    }

    #[test]
    fn test_disabled_rate_limit() {
        let generator = QueryGenerator::new(
            GeneratorConfig::new(Dialect::MySql)
                .with_rate_limit(1, 60)
                .without_rate_limit(),
        );
        let query = SelectQuery::new().from("users");

        for _ in 0..5 {
            assert!(generator.generate_select_query(&query, Some("caller")).is_ok());
        }
    }

    #[test]
    fn test_shared_rate_limiter() {
        let limiter = Arc::new(RateLimiter::default());
        let config = GeneratorConfig::new(Dialect::Postgres).with_rate_limit(2, 60);
        let first = QueryGenerator::with_rate_limiter(config.clone(), Arc::clone(&limiter));
        let second = QueryGenerator::with_rate_limiter(
            config.with_security_level(sqlguard_validation::SecurityLevel::Strict),
            Arc::clone(&limiter),
        );
        let query = SelectQuery::new().from("users");

        assert!(first.generate_select_query(&query, Some("shared")).is_ok());
        assert!(second.generate_select_query(&query, Some("shared")).is_ok());
        assert!(first.generate_select_query(&query, Some("shared")).is_err());
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let err =
            QueryGenerator::try_new(GeneratorConfig::default().with_max_limit(0)).unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn test_quote_identifiers_config() {
        let generator = QueryGenerator::new(
            GeneratorConfig::new(Dialect::MySql).with_quoted_identifiers(true),
        );
        let query = SelectQuery::new().select("id").from("users").where_eq("id", 1);
        let generated = generator.generate_select_query(&query, None).unwrap();
        assert_eq!(generated.sql(), "SELECT `id` FROM `users` WHERE `id` = ?");
    }
}
