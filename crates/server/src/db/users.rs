//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use mercato_core::{Email, UserId};

use super::{RepositoryError, contains_pattern};
use crate::models::user::{User, UserPatch};

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            password_hash: row.password,
        })
    }
}

/// Map a unique violation on `users.email` to [`RepositoryError::Conflict`].
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}

/// Repository for user database operations.
///
/// One SQL statement per call, except [`update`](UserRepository::update)
/// which reads the current record before writing the merged one back.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users. Returns an empty vec when the table is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, password
            FROM users
            ORDER BY username ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a user by their ID. Absence is `None`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, password
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their email address (exact match).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, password
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new user with a freshly generated ID and return the stored
    /// record. `password_hash` must already be hashed by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let id = UserId::generate();

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, username, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password
            ",
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }

    /// Merge a patch over the user with the given ID.
    ///
    /// Reads the current record first; if the ID is absent no write is
    /// issued and `None` is returned. Otherwise fields present in the
    /// patch overwrite stored values, absent fields are kept, and the
    /// merged record is written back and returned.
    ///
    /// The read and the write are two independent statements; last write
    /// wins between concurrent patches, as with the rest of this layer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a patched email collides
    /// with another user.
    /// Returns `RepositoryError::Database` for other database errors.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, RepositoryError> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let merged = patch.apply(&existing);

        sqlx::query(
            r"
            UPDATE users
            SET username = $1, email = $2, password = $3
            WHERE id = $4
            ",
        )
        .bind(&merged.username)
        .bind(&merged.email)
        .bind(&merged.password_hash)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(Some(merged))
    }

    /// Delete the user with the given ID.
    ///
    /// Returns `true` if a row was deleted, `false` if the ID was absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find users whose username contains the given term,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn search_by_username(&self, term: &str) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, password
            FROM users
            WHERE username ILIKE $1
            ORDER BY username ASC
            ",
        )
        .bind(contains_pattern(term))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Find users whose email contains the given term, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn search_by_email(&self, term: &str) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, password
            FROM users
            WHERE email ILIKE $1
            ORDER BY username ASC
            ",
        )
        .bind(contains_pattern(term))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
