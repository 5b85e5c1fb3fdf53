//! Authentication service.
//!
//! Signup, login with single-active-session dedup, and logout.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sqlx::PgPool;

use gavel_core::{Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::session::{SessionToken, SessionUser};
use crate::sessions::SessionStore;

/// Authentication service.
///
/// Handles user registration and the session lifecycle around login/logout.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    sessions: &'a SessionStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, sessions: &'a SessionStore) -> Self {
        Self {
            users: UserRepository::new(pool),
            sessions,
        }
    }

    /// Register a new user.
    ///
    /// The password arrives base64-encoded. That encoding exists only to
    /// survive transport - it carries no confidentiality whatsoever; the
    /// credential is protected by running over an encrypted channel and by
    /// hashing before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` for
    /// malformed identifiers.
    /// Returns `AuthError::InvalidPasswordEncoding` if the payload isn't
    /// valid base64-wrapped UTF-8.
    /// Returns `AuthError::UserAlreadyExists` if the username OR email is
    /// already taken.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        encoded_password: &str,
    ) -> Result<UserId, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        let password = decode_password(encoded_password)?;

        // One combined existence check across both unique fields.
        if self
            .users
            .exists_with_username_or_email(&username, &email)
            .await?
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&password)?;

        // The unique constraints backstop a racing signup between the check
        // and the insert.
        let user = self
            .users
            .create(&username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user.id)
    }

    /// Log a user in, returning the session token to deliver as a cookie.
    ///
    /// Lookup is by username only; email is not a login handle. A second
    /// login while a session is live returns the existing token unchanged
    /// instead of minting another session for the same user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no such user exists or the
    /// password does not verify.
    /// Returns `AuthError::InvalidPasswordEncoding` if the payload isn't
    /// valid base64-wrapped UTF-8.
    pub async fn login(
        &self,
        username: &str,
        encoded_password: &str,
    ) -> Result<SessionToken, AuthError> {
        // A name that can't exist is the same as one that doesn't.
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;
        let password = decode_password(encoded_password)?;

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(&password, &user.password_hash)?;

        if let Some(existing) = self.sessions.token_for_user(user.id).await {
            return Ok(existing);
        }

        let token = SessionToken::generate();
        self.sessions
            .put(token.clone(), SessionUser::from(&user))
            .await;

        Ok(token)
    }

    /// Destroy the session for `token`, if any. Idempotent.
    pub async fn logout(&self, token: &SessionToken) {
        self.sessions.remove(token).await;
    }
}

/// Recover the raw credential from its transport encoding.
fn decode_password(encoded: &str) -> Result<String, AuthError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| AuthError::InvalidPasswordEncoding)?;
    String::from_utf8(bytes).map_err(|_| AuthError::InvalidPasswordEncoding)
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_password_recovers_the_raw_credential() {
        // base64("pw1")
        assert_eq!(decode_password("cHcx").unwrap(), "pw1");
    }

    #[test]
    fn decode_password_tolerates_surrounding_whitespace() {
        assert_eq!(decode_password(" cHcx\n").unwrap(), "pw1");
    }

    #[test]
    fn decode_password_rejects_garbage() {
        assert!(matches!(
            decode_password("!!not-base64!!"),
            Err(AuthError::InvalidPasswordEncoding)
        ));
        // valid base64 but not UTF-8
        assert!(matches!(
            decode_password("/w=="),
            Err(AuthError::InvalidPasswordEncoding)
        ));
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("battery staple", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn same_password_hashes_differently() {
        // salts are random, digests must differ
        let first = hash_password("pw1").unwrap();
        let second = hash_password("pw1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_malformed_hashes() {
        assert!(matches!(
            verify_password("pw1", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
