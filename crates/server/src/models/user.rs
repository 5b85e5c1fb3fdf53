//! User domain types.

use chrono::{DateTime, Utc};

use gavel_core::{Email, UserId, Username};

use crate::models::session::SessionUser;

/// A registered user (domain type).
///
/// Created by signup and immutable thereafter. The password hash never leaves
/// this type: it is neither serialized nor copied into session snapshots.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across all users.
    pub username: Username,
    /// Email address, unique across all users.
    pub email: Email,
    /// Argon2 digest of the signup password.
    pub password_hash: String,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
