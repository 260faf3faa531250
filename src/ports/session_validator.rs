//! Inbound identity port.
//!
//! The id of the returned user is the voter identity everywhere else in the
//! crate; nothing downstream looks inside the token.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Resolves a bearer token (prefix already stripped) to a member.
///
/// Signature, `exp` and any configured `iss`/`aud` are checked here. Bad
/// or foreign tokens map to `InvalidToken`, stale ones to `TokenExpired`,
/// and anything transient to `ServiceUnavailable`.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
