//! Session-related types.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gavel_core::{Email, UserId, Username};

/// Opaque token proving a prior successful login.
///
/// Tokens are freshly minted v4 UUIDs; the value carries no structure and is
/// only meaningful as a key into the session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mint a new random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Identity snapshot stored against a session token.
///
/// Holds only the id and display fields captured at login time. Sensitive
/// fields (the password hash in particular) stay in the database and are
/// re-fetched where strictly needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name at the time of login.
    pub username: Username,
    /// Email address at the time of login.
    pub email: Email,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(SessionToken::generate(), SessionToken::generate());
    }

    #[test]
    fn round_trips_through_str() {
        let token = SessionToken::from("abc-123");
        assert_eq!(token.as_str(), "abc-123");
        assert_eq!(token.to_string(), "abc-123");
    }
}
