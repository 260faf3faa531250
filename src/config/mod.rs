//! Service configuration.
//!
//! Everything comes from `COMMUNITY_CANVAS__*` environment variables, with
//! a `.env` file picked up in development. Sections nest with `__`, so
//! `COMMUNITY_CANVAS__DATABASE__POOL__MAX=20` sets `database.pool.max`.
//!
//! ```no_run
//! use community_canvas::config::AppConfig;
//!
//! let config = AppConfig::load().expect("configuration");
//! config.validate().expect("valid configuration");
//! ```

mod auth;
mod database;
mod error;
mod server;

pub use auth::{AuthConfig, MIN_PRODUCTION_SECRET_LEN};
pub use database::{DatabaseConfig, PoolConfig, MAX_POOL_SIZE};
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig, MAX_REQUEST_TIMEOUT_SECS};

use serde::Deserialize;

const ENV_PREFIX: &str = "COMMUNITY_CANVAS";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Absent selects the in-memory stores.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Reads `.env` if present, then the prefixed environment.
    ///
    /// Only type errors surface here; range and consistency checks live in
    /// [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::default()
            .prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__");

        let config = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database
            .as_ref()
            .map_or(Ok(()), DatabaseConfig::validate)?;
        self.auth.validate(&self.server.environment)
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
