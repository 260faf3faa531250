//! Fixed token table standing in for the JWT validator in tests and demos.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Built once, then shared read-only behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MockSessionValidator {
    members: HashMap<String, AuthenticatedUser>,
    outage: Option<AuthError>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.members.insert(token.into(), user);
        self
    }

    /// Member named after their id, e.g. `carol` shows up as "Carol".
    ///
    /// # Panics
    ///
    /// On a blank `user_id`.
    pub fn with_test_user(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let mut chars = user_id.chars();
        let name = chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect::<String>());
        let id = UserId::new(user_id).expect("test user id must not be blank");
        self.with_user(token, AuthenticatedUser::new(id, None, name))
    }

    /// Every validation fails with `error`, known tokens included.
    pub fn with_error(mut self, error: AuthError) -> Self {
        self.outage = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = &self.outage {
            return Err(error.clone());
        }
        self.members
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_gets_capitalized_name() {
        let validator = MockSessionValidator::new().with_test_user("tok", "carol");

        let member = validator.validate("tok").await.unwrap();

        assert_eq!(member.id.as_str(), "carol");
        assert_eq!(member.display_label(), "Carol");
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = MockSessionValidator::new().with_test_user("tok", "carol");
        assert_eq!(validator.validate("TOK").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn outage_overrides_known_tokens() {
        let validator = MockSessionValidator::new()
            .with_test_user("tok", "carol")
            .with_error(AuthError::TokenExpired);
        assert_eq!(validator.validate("tok").await, Err(AuthError::TokenExpired));
    }
}
