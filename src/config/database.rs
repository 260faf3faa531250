//! PostgreSQL store settings.
//!
//! The whole `database` section is optional; leaving it out keeps every
//! store in memory.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::error::ValidationError;

/// Hard ceiling on pool size regardless of configuration.
pub const MAX_POOL_SIZE: u32 = 100;

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` connection URL.
    pub url: String,

    #[serde(default)]
    pub pool: PoolConfig,

    /// Apply the bundled `migrations/` before serving.
    #[serde(default)]
    pub run_migrations: bool,
}

/// Connection pool sizing and lifetimes, in whole seconds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    pub min: u32,
    pub max: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min: 2,
            max: 10,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        }
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: PoolConfig::default(),
            run_migrations: false,
        }
    }

    /// The connection URL with any password replaced, safe for logs.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((credentials, host)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };
        match credentials.split_once(':') {
            Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
            None => self.url.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        let scheme = self.url.split_once("://").map(|(scheme, _)| scheme);
        if !matches!(scheme, Some("postgres") | Some("postgresql")) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.pool.max == 0 || self.pool.min > self.pool.max {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.pool.max > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge(MAX_POOL_SIZE));
        }
        Ok(())
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.redacted_url())
            .field("pool", &self.pool)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_defaults_are_modest() {
        let config = DatabaseConfig::new("postgres://localhost/canvas");
        assert_eq!(config.pool.min, 2);
        assert_eq!(config.pool.max, 10);
        assert_eq!(config.pool.acquire_timeout(), Duration::from_secs(5));
        assert!(!config.run_migrations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_blank_url() {
        assert!(matches!(
            DatabaseConfig::new("  ").validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            DatabaseConfig::new("mysql://localhost/canvas").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
        assert!(matches!(
            DatabaseConfig::new("localhost/canvas").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn rejects_inverted_or_oversized_pool() {
        let mut config = DatabaseConfig::new("postgresql://localhost/canvas");
        config.pool.min = 8;
        config.pool.max = 4;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPoolSize)));

        config.pool.min = 1;
        config.pool.max = 150;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::PoolSizeTooLarge(100))
        ));
    }

    #[test]
    fn password_never_reaches_debug_output() {
        let config = DatabaseConfig::new("postgres://canvas:hunter2@db:5432/canvas");

        assert_eq!(config.redacted_url(), "postgres://canvas:***@db:5432/canvas");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn url_without_password_is_unchanged() {
        let config = DatabaseConfig::new("postgres://canvas@db/canvas");
        assert_eq!(config.redacted_url(), "postgres://canvas@db/canvas");
    }
}
