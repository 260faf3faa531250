//! Authentication configuration

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::foundation::UserId;

/// Minimum HS256 secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (HS256 bearer tokens)
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 signing secret
    #[serde(default)]
    pub jwt_secret: String,

    /// Expected `iss` claim, if any
    pub issuer: Option<String>,

    /// Expected `aud` claim, if any
    pub audience: Option<String>,

    /// Comma-separated user ids allowed to run admin operations
    pub admin_user_ids: Option<String>,

    /// Clock skew tolerated on `exp`, in seconds
    #[serde(default = "default_token_leeway")]
    pub token_leeway_secs: u64,
}

impl AuthConfig {
    pub fn token_leeway(&self) -> Duration {
        Duration::from_secs(self.token_leeway_secs)
    }

    /// Parsed admin user ids. Blank entries are skipped.
    pub fn admin_ids(&self) -> HashSet<UserId> {
        self.admin_user_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter_map(|id| UserId::new(id).ok())
            .collect()
    }

    pub fn is_admin(&self, user_id: &UserId) -> bool {
        self.admin_ids().contains(user_id)
    }

    /// Validate authentication configuration
    ///
    /// A secret is always required; production additionally enforces
    /// a minimum length.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production
            && self.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_LEN));
        }
        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("admin_user_ids", &self.admin_user_ids)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: None,
            audience: None,
            admin_user_ids: None,
            token_leeway_secs: default_token_leeway(),
        }
    }
}

fn default_token_leeway() -> u64 {
    30
}
