//! SQL logging via `tracing`.
//!
//! [`TracingClient`] wraps any [`GenericClient`] and emits one event per
//! statement on the `jobly.sql` target: statement kind, SQL text, parameter
//! count, row count and elapsed time. Failed statements are logged at `WARN`
//! regardless of the configured level. Parameter values are never logged.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// The kind of statement being executed, detected from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl StatementKind {
    pub fn from_sql(sql: &str) -> Self {
        let s = sql.trim_start().trim_start_matches('(');
        let starts_with = |keyword: &str| {
            s.get(0..keyword.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
        };

        if starts_with("SELECT") || starts_with("WITH") {
            Self::Select
        } else if starts_with("INSERT") {
            Self::Insert
        } else if starts_with("UPDATE") {
            Self::Update
        } else if starts_with("DELETE") {
            Self::Delete
        } else {
            Self::Other
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Settings for [`TracingClient`].
#[derive(Debug, Clone)]
pub struct SqlLogConfig {
    /// Tracing event level for successful statements.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLogConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

/// A `GenericClient` wrapper that logs every statement.
pub struct TracingClient<C> {
    client: C,
    config: SqlLogConfig,
}

impl<C: GenericClient> TracingClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: SqlLogConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SqlLogConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.config.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    fn emit<T>(
        &self,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        result: &JoblyResult<T>,
        rows: impl FnOnce(&T) -> u64,
    ) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let kind = StatementKind::from_sql(sql);
        let sql = self.display_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match result {
            Ok(value) => emit_at_level!(
                self.config.level,
                target: "jobly.sql",
                kind = ?kind,
                param_count,
                rows = rows(value),
                elapsed_ms,
                sql = %sql,
            ),
            Err(err) => tracing::warn!(
                target: "jobly.sql",
                kind = ?kind,
                param_count,
                elapsed_ms,
                sql = %sql,
                error = %err,
                "statement failed"
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.client.query(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        let start = Instant::now();
        let result = self.client.execute(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), &result, |n| *n);
        result
    }
}
