//! Database access for the Mercato `PostgreSQL` database.
//!
//! # Tables
//!
//! Each repository exclusively owns one table; there are no foreign keys
//! between them. The expected schema (applied out of band; migration
//! tooling is deliberately out of scope):
//!
//! ```sql
//! CREATE TABLE products (
//!     id UUID PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     price NUMERIC NOT NULL,
//!     quantity INTEGER NOT NULL,
//!     image TEXT NOT NULL
//! );
//!
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY,
//!     username TEXT NOT NULL,
//!     email TEXT NOT NULL UNIQUE,
//!     password TEXT NOT NULL
//! );
//! ```
//!
//! The unique index on `users.email` is load-bearing: registration relies
//! on it instead of a check-then-insert read, so two concurrent
//! registrations with the same email cannot race past each other.
//!
//! # Queries
//!
//! All queries are parameterized and runtime-checked
//! (`sqlx::query_as::<_, Row>` with `.bind`). Row types are private to
//! each repository module and converted into the domain models before
//! they cross the module boundary.

pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
///
/// Absence of a row is never an error; repositories report it as
/// `Option::None` (or `false` for deletes).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The pool connects lazily: construction succeeds even when the database
/// is down, and connection failures surface per-query as
/// [`RepositoryError::Database`]. This keeps a degraded process alive and
/// answering its health endpoints instead of crashing at startup.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url.expose_secret())
}

/// Build an SQL `LIKE`/`ILIKE` pattern matching any value that contains
/// `term` as a substring.
///
/// The term is bound as a query parameter, never interpolated into SQL.
fn contains_pattern(term: &str) -> String {
    format!("%{term}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("ann"), "%ann%");
        assert_eq!(contains_pattern(""), "%%");
        assert_eq!(contains_pattern("a@x"), "%a@x%");
    }
}
