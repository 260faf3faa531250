//! Failures while loading or checking configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    Invalid(#[from] ValidationError),
}

/// A loaded value that the service refuses to start with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingRequired(&'static str),

    #[error("cannot bind to {0}")]
    InvalidBindAddress(String),

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be between 1 and {0} seconds")]
    InvalidTimeout(u64),

    #[error("database URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("pool bounds are inverted or empty")]
    InvalidPoolSize,

    #[error("pool may hold at most {0} connections")]
    PoolSizeTooLarge(u32),

    #[error("JWT secret must be at least {0} bytes in production")]
    JwtSecretTooShort(usize),
}
