//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Products
//! GET    /products        - List products
//! POST   /products        - Create product
//! GET    /products/{id}   - Product by ID
//! PUT    /products/{id}   - Overwrite product
//! DELETE /products/{id}   - Delete product
//!
//! # Users
//! GET    /users           - List users
//! GET    /users/search    - Search by ?name= or ?email= substring
//! GET    /users/{id}      - User by ID
//! PUT    /users/{id}      - Patch user (partial update)
//! DELETE /users/{id}      - Delete user
//! POST   /register        - Register (hashes the password)
//! POST   /login           - Verify credentials
//! ```
//!
//! Handlers translate verbs and paths into repository/service calls and
//! nothing else; status-code policy lives in [`crate::error::AppError`].

pub mod products;
pub mod users;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Confirmation body for deletes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Assemble all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(users::router())
}
