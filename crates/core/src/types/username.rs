//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("username may only contain letters, digits, '.', '_' and '-'")]
    InvalidCharacter,
}

/// A login name chosen at signup.
///
/// Usernames identify users at login and are unique across the system.
///
/// ## Constraints
///
/// - Length: 1-32 characters
/// - ASCII letters, digits, `.`, `_` and `-` only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns a [`UsernameError`] if the input is empty, too long, or
    /// contains disallowed characters.
    pub fn parse(input: &str) -> Result<Self, UsernameError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(UsernameError::Empty);
        }
        if input.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(input.to_owned()))
    }

    /// Get the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_names() {
        assert!(Username::parse("alice").is_ok());
        assert!(Username::parse("bob_42").is_ok());
        assert!(Username::parse("jean-luc.picard").is_ok());
    }

    #[test]
    fn rejects_empty_and_overlong() {
        assert!(matches!(Username::parse(""), Err(UsernameError::Empty)));
        assert!(matches!(Username::parse("   "), Err(UsernameError::Empty)));
        assert!(matches!(
            Username::parse(&"a".repeat(33)),
            Err(UsernameError::TooLong { .. })
        ));
    }

    #[test]
    fn rejects_disallowed_characters() {
        assert!(matches!(
            Username::parse("alice smith"),
            Err(UsernameError::InvalidCharacter)
        ));
        assert!(matches!(
            Username::parse("alice@example.com"),
            Err(UsernameError::InvalidCharacter)
        ));
    }
}
