//! User domain types.

use serde::Serialize;

use mercato_core::{Email, UserId};

/// A registered user (domain type).
///
/// `password_hash` holds the bcrypt hash, never a plaintext password. It
/// serializes under the wire key `password`, which is the shape callers of
/// this API historically consume; the HTTP layer is responsible for not
/// forwarding it anywhere it should not go.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Unique user ID, generated server-side at registration.
    pub id: UserId,
    /// Display name. Not unique.
    pub username: String,
    /// Login key. Unique, enforced by the database.
    pub email: Email,
    /// bcrypt hash of the user's password.
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// A partial update to a user.
///
/// Each field is present-or-absent; absent fields keep their previously
/// stored values. The password, when present, is already hashed by the
/// time a patch reaches the repository.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    /// Merge this patch over an existing record, field by field.
    ///
    /// The ID is immutable and always carried over.
    #[must_use]
    pub fn apply(self, existing: &User) -> User {
        User {
            id: existing.id,
            username: self.username.unwrap_or_else(|| existing.username.clone()),
            email: self.email.unwrap_or_else(|| existing.email.clone()),
            password_hash: self
                .password_hash
                .unwrap_or_else(|| existing.password_hash.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::generate(),
            username: "alice".to_owned(),
            email: Email::parse("a@x.com").unwrap(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_owned(),
        }
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let user = sample_user();
        let merged = UserPatch::default().apply(&user);
        assert_eq!(merged, user);
    }

    #[test]
    fn test_patch_overwrites_present_fields_only() {
        let user = sample_user();
        let patch = UserPatch {
            username: Some("alicia".to_owned()),
            email: None,
            password_hash: None,
        };

        let merged = patch.apply(&user);
        assert_eq!(merged.username, "alicia");
        assert_eq!(merged.email, user.email);
        assert_eq!(merged.password_hash, user.password_hash);
        assert_eq!(merged.id, user.id);
    }

    #[test]
    fn test_patch_overwrites_every_field() {
        let user = sample_user();
        let patch = UserPatch {
            username: Some("bob".to_owned()),
            email: Some(Email::parse("b@x.com").unwrap()),
            password_hash: Some("$2b$10$vutsrqponmlkjihgfedcba".to_owned()),
        };

        let merged = patch.apply(&user);
        assert_eq!(merged.username, "bob");
        assert_eq!(merged.email.as_str(), "b@x.com");
        assert_eq!(merged.password_hash, "$2b$10$vutsrqponmlkjihgfedcba");
        assert_eq!(merged.id, user.id);
    }

    #[test]
    fn test_password_hash_serializes_under_password_key() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_some());
        assert!(json.get("password_hash").is_none());
    }
}
