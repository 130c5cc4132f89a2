//! Runtime configuration.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://${PGUSER}@localhost/jobly"
//! max_connections = 16
//!
//! [logging]
//! sql_level = "debug"
//! max_sql_length = 200
//! ```
//!
//! `${VAR}` references are expanded from the environment. Without a file,
//! [`JoblyConfig::from_env`] reads `DATABASE_URL` (a `.env` file is honored).

use crate::error::{JoblyError, JoblyResult};
use crate::logging::SqlLogConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::Level;

#[derive(Debug, Clone, Deserialize)]
pub struct JoblyConfig {
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    16
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_sql_level")]
    pub sql_level: String,
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: Option<usize>,
}

fn default_sql_level() -> String {
    "debug".to_string()
}

fn default_max_sql_length() -> Option<usize> {
    Some(200)
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sql_level: default_sql_level(),
            max_sql_length: default_max_sql_length(),
        }
    }
}

impl JoblyConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw, |key| std::env::var(key).ok())
    }

    /// Parse a TOML document, expanding `${VAR}` through `lookup`.
    pub fn from_toml_str(
        raw: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> JoblyResult<Self> {
        let mut config: JoblyConfig = toml::from_str(raw)?;
        config.database.url = expand_env_vars(&config.database.url, &lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config from `DATABASE_URL`, loading `.env` first if present.
    pub fn from_env() -> JoblyResult<Self> {
        let _ = dotenvy::dotenv();
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| JoblyError::Config("DATABASE_URL is not set".to_string()))?;

        let config = Self {
            database: DatabaseConfig {
                url,
                max_connections: default_max_connections(),
            },
            logging: LoggingConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(JoblyError::Config("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(JoblyError::Config(
                "database.max_connections must be at least 1".into(),
            ));
        }
        self.logging.level()?;
        Ok(())
    }
}

impl LoggingConfig {
    pub fn level(&self) -> JoblyResult<Level> {
        self.sql_level
            .parse()
            .map_err(|_| JoblyError::Config(format!("invalid logging.sql_level: {}", self.sql_level)))
    }

    /// Settings for [`TracingClient`](crate::TracingClient).
    pub fn sql_log_config(&self) -> JoblyResult<SqlLogConfig> {
        Ok(SqlLogConfig {
            level: self.level()?,
            max_sql_length: self.max_sql_length,
        })
    }
}

fn expand_env_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JoblyError::Config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::Config("invalid env var reference: ${}".into()));
            }

            let v = lookup(&key).ok_or_else(|| {
                JoblyError::Config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(key: &str) -> Option<String> {
        match key {
            "PGUSER" => Some("jobly".to_string()),
            _ => None,
        }
    }

    #[test]
    fn parses_with_defaults() {
        let config = JoblyConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://localhost/jobly"
            "#,
            vars,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 16);
        assert_eq!(config.logging.level().unwrap(), Level::DEBUG);
        assert_eq!(config.logging.max_sql_length, Some(200));
    }

    #[test]
    fn expands_env_references() {
        let config = JoblyConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://${PGUSER}@localhost/jobly"
            max_connections = 4

            [logging]
            sql_level = "info"
            max_sql_length = 80
            "#,
            vars,
        )
        .unwrap();

        assert_eq!(config.database.url, "postgres://jobly@localhost/jobly");
        assert_eq!(config.database.max_connections, 4);
        let log = config.logging.sql_log_config().unwrap();
        assert_eq!(log.level, Level::INFO);
        assert_eq!(log.max_sql_length, Some(80));
    }

    #[test]
    fn rejects_missing_env_var() {
        let err = JoblyConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://${NOPE}@localhost/jobly"
            "#,
            vars,
        )
        .unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));
    }

    #[test]
    fn rejects_bad_values() {
        let zero_pool = r#"
            [database]
            url = "postgres://localhost/jobly"
            max_connections = 0
        "#;
        assert!(JoblyConfig::from_toml_str(zero_pool, vars).is_err());

        let bad_level = r#"
            [database]
            url = "postgres://localhost/jobly"
            [logging]
            sql_level = "loud"
        "#;
        assert!(JoblyConfig::from_toml_str(bad_level, vars).is_err());

        assert!(JoblyConfig::from_toml_str("[database]\nurl = \"\"", vars).is_err());
        assert!(JoblyConfig::from_toml_str("not toml", vars).is_err());
    }

    #[test]
    fn unterminated_reference_is_an_error() {
        assert!(expand_env_vars("${PGUSER", &vars).is_err());
        assert!(expand_env_vars("${}", &vars).is_err());
        assert_eq!(expand_env_vars("$PGUSER", &vars).unwrap(), "$PGUSER");
    }
}
