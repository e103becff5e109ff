//! Account service: registration, credential verification, and user
//! updates.
//!
//! Owns the password policy so no other module ever touches a plaintext
//! password: callers hand plaintext in, only bcrypt hashes reach the
//! repository.

mod error;

pub use error::AuthError;

use sqlx::PgPool;

use mercato_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{User, UserPatch};

/// bcrypt cost factor for new password hashes.
///
/// Fixed at 10; bumping it only affects newly stored hashes, since the
/// cost is embedded in each hash string.
const BCRYPT_COST: u32 = 10;

/// Account service.
///
/// Wraps the user repository with credential handling.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// Hashes the plaintext password and stores the record. Email
    /// uniqueness is enforced atomically by the database's unique index,
    /// not by a prior read, so concurrent registrations cannot race.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if the username or password is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = validate_registration(username, email, password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Verify a supplied email/password pair.
    ///
    /// Returns the matching user on success, or `None` on failure. An
    /// unknown email and a wrong password are indistinguishable from the
    /// outside; neither leaks which one happened.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    /// Returns `AuthError::PasswordHash` if the stored hash is malformed.
    pub async fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Apply a partial update to a user.
    ///
    /// Fields left as `None` keep their stored values. A new password is
    /// hashed before it goes anywhere near the repository, so the
    /// stored-hash invariant holds across updates too. Returns `None` if
    /// the ID is absent (no write is issued).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` if a patched email collides with
    /// another user.
    /// Returns `AuthError::Repository` for other database errors.
    pub async fn update_user(
        &self,
        id: UserId,
        username: Option<String>,
        email: Option<Email>,
        password: Option<&str>,
    ) -> Result<Option<User>, AuthError> {
        let password_hash = password.map(hash_password).transpose()?;

        let patch = UserPatch {
            username,
            email,
            password_hash,
        };

        self.users.update(id, patch).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        })
    }
}

/// Validate registration input and parse the email.
fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<Email, AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::MissingField("username is required"));
    }
    if password.is_empty() {
        return Err(AuthError::MissingField("password is required"));
    }
    Ok(Email::parse(email)?)
}

/// Hash a password with bcrypt and a per-password random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored bcrypt hash.
///
/// Uses bcrypt's own verifier, never string equality.
fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|_| AuthError::PasswordHash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_password("secret").unwrap();
        assert_ne!(hash, "secret");
        assert!(!hash.contains("secret"));
    }

    #[test]
    fn test_hash_embeds_cost_factor() {
        let hash = hash_password("secret").unwrap();
        assert!(hash.contains("$10$"), "unexpected hash format: {hash}");
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_accepts_correct_password() {
        let hash = hash_password("secret").unwrap();
        assert!(verify_password("secret", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("secret").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_validate_registration_accepts_minimal_input() {
        let email = validate_registration("alice", "a@x.com", "secret").unwrap();
        assert_eq!(email.as_str(), "a@x.com");
    }

    #[test]
    fn test_validate_registration_rejects_blank_username() {
        assert!(matches!(
            validate_registration("  ", "a@x.com", "secret"),
            Err(AuthError::MissingField(_))
        ));
    }

    #[test]
    fn test_validate_registration_rejects_empty_password() {
        assert!(matches!(
            validate_registration("alice", "a@x.com", ""),
            Err(AuthError::MissingField(_))
        ));
    }

    #[test]
    fn test_validate_registration_rejects_bad_email() {
        assert!(matches!(
            validate_registration("alice", "not-an-email", "secret"),
            Err(AuthError::InvalidEmail(_))
        ));
    }
}
