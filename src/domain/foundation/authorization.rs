//! Authorization support types.
//!
//! Admin rights are a fixed roster of user ids taken from configuration.
//! Handlers ask the roster before running admin-only operations; every
//! other check is "is the caller the subject".

use std::collections::HashSet;

use super::{DomainError, ErrorCode, UserId};

/// The set of users allowed to run admin operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRoster {
    admins: HashSet<UserId>,
}

impl AdminRoster {
    pub fn new(admins: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, user: &UserId) -> bool {
        self.admins.contains(user)
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }

    /// # Errors
    ///
    /// - `Forbidden` if `actor` is not on the roster
    pub fn require_admin(&self, actor: &UserId) -> Result<(), DomainError> {
        if self.is_admin(actor) {
            return Ok(());
        }
        Err(DomainError::new(ErrorCode::Forbidden, "Admin rights required")
            .with_detail("user_id", actor.as_str()))
    }

    /// Allows `actor` to act on `subject` when they are the same user, or
    /// when `actor` is an admin.
    ///
    /// # Errors
    ///
    /// - `Forbidden` otherwise
    pub fn require_self_or_admin(&self, actor: &UserId, subject: &UserId) -> Result<(), DomainError> {
        if actor == subject {
            return Ok(());
        }
        self.require_admin(actor)
    }
}
