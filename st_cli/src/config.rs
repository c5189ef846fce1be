//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::time::Duration;
use swiss_tournament::db::{
    DatabaseConfig,
    config::parse_env_or,
    timeouts::{DEFAULT_QUERY_TIMEOUT, DEFAULT_TRANSACTION_TIMEOUT},
};

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Per-statement timeout in seconds
    pub query_timeout_secs: u64,
    /// Whole-transaction timeout in seconds
    pub transaction_timeout_secs: u64,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `DATABASE_URL` is set but empty
    pub fn from_env(database_url_override: Option<String>) -> Result<Self, ConfigError> {
        if database_url_override.is_none()
            && std::env::var("DATABASE_URL").is_ok_and(|url| url.trim().is_empty())
        {
            return Err(ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "Set it to a PostgreSQL URL, e.g. postgres://postgres@localhost/tournament"
                    .to_string(),
            });
        }

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database = database.with_url(url);
        }

        Ok(CliConfig {
            database,
            query_timeout_secs: parse_env_or(
                "DB_QUERY_TIMEOUT_SECS",
                DEFAULT_QUERY_TIMEOUT.as_secs(),
            ),
            transaction_timeout_secs: parse_env_or(
                "DB_TRANSACTION_TIMEOUT_SECS",
                DEFAULT_TRANSACTION_TIMEOUT.as_secs(),
            ),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.database.database_url.starts_with("postgres://")
            && !self.database.database_url.starts_with("postgresql://")
        {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason: "Must start with postgres:// or postgresql://".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        if self.query_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_QUERY_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.transaction_timeout_secs < self.query_timeout_secs {
            return Err(ConfigError::Invalid {
                var: "DB_TRANSACTION_TIMEOUT_SECS".to_string(),
                reason: format!(
                    "Must be at least the query timeout ({}s)",
                    self.query_timeout_secs
                ),
            });
        }

        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
