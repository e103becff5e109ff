//! User CRUD, registration, login, and search handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use mercato_core::{Email, UserId};

use super::MessageResponse;
use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list))
        .route("/users/search", get(search))
        .route("/users/{id}", get(get_one).put(update).delete(remove))
        .route("/register", post(register))
        .route("/login", post(login))
}

/// List response; `password` fields hold hashes, per the repository
/// contract.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    total_users: usize,
    users: Vec<User>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(users: Vec<User>) -> Self {
        Self {
            total_users: users.len(),
            users,
        }
    }
}

/// Request body for registration. All fields required.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

/// Request body for login. Both fields required.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}

/// Request body for a partial user update. Any subset of fields.
#[derive(Debug, Deserialize)]
pub struct UpdateUserPayload {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

/// Search query: exactly one of `name` or `email` is expected; `name`
/// wins when both are present.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    name: Option<String>,
    email: Option<String>,
}

/// `GET /users`
async fn list(State(state): State<AppState>) -> Result<Json<UsersResponse>, AppError> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users.into()))
}

/// `GET /users/{id}`
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;

    Ok(Json(user))
}

/// `POST /register`
///
/// Duplicate emails come back as a 400; the database's unique index is
/// what enforces it, so there is no window between check and insert.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let (Some(username), Some(email), Some(password)) =
        (payload.username, payload.email, payload.password)
    else {
        return Err(AppError::BadRequest(
            "username, email and password are required".to_owned(),
        ));
    };

    let user = AuthService::new(state.pool())
        .register(&username, &email, &password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /login`
///
/// An unknown email and a wrong password are both a 401 with the same
/// body, so the endpoint cannot be used to probe which emails exist.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<User>, AppError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::BadRequest(
            "email and password are required".to_owned(),
        ));
    };

    // A malformed email can't belong to any account; same uniform 401.
    let Ok(email) = Email::parse(&email) else {
        return Err(AppError::Unauthorized);
    };

    let user = AuthService::new(state.pool())
        .verify_credentials(&email, &password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(user))
}

/// `PUT /users/{id}` - partial update; absent fields keep stored values.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    let email = payload
        .email
        .map(|e| Email::parse(&e))
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let user = AuthService::new(state.pool())
        .update_user(id, payload.username, email, payload.password.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;

    Ok(Json(user))
}

/// `DELETE /users/{id}`
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = UserRepository::new(state.pool()).delete(id).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("user {id} not found")));
    }

    Ok(Json(MessageResponse {
        message: format!("user {id} deleted"),
    }))
}

/// `GET /users/search?name=...` or `?email=...`
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<UsersResponse>, AppError> {
    let repo = UserRepository::new(state.pool());

    let users = match (query.name, query.email) {
        (Some(name), _) => repo.search_by_username(&name).await?,
        (None, Some(email)) => repo.search_by_email(&email).await?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "a name or email query parameter is required".to_owned(),
            ));
        }
    };

    Ok(Json(users.into()))
}
