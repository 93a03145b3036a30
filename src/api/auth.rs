//! Account and session endpoints.
//!
//! - POST `/signup` - Create a user
//! - POST `/login` - Verify credentials and issue access + refresh tokens
//! - POST `/logout` - Clear both token cookies

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use super::error::{ApiError, ResultExt, require_non_empty};
use crate::auth::{clear_session, set_access_token, set_refresh_token};
use crate::db::Database;
use crate::jwt::{JwtConfig, unix_now};
use crate::password::{hash_password_blocking, verify_password_blocking};

/// Shortest accepted username.
const MIN_USERNAME_LENGTH: usize = 3;

/// Longest accepted username.
const MAX_USERNAME_LENGTH: usize = 32;

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    fn from_body(payload: Result<Json<Credentials>, JsonRejection>) -> Result<Self, ApiError> {
        let Json(credentials) = payload?;
        require_non_empty(&credentials.username, "username")?;
        require_non_empty(&credentials.password, "password")?;
        Ok(credentials)
    }
}

fn message(status: StatusCode, message: &'static str) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "message": message })))
}

async fn signup(
    State(state): State<AuthState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = Credentials::from_body(payload)?;

    let username_length = credentials.username.chars().count();
    if username_length < MIN_USERNAME_LENGTH {
        return Err(ApiError::bad_request(
            "The username must be at least 3 characters long",
        ));
    }
    if username_length > MAX_USERNAME_LENGTH {
        return Err(ApiError::bad_request(
            "The username cannot be longer than 32 characters",
        ));
    }

    let password_hash = hash_password_blocking(credentials.password)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::internal("Failed to hash password")
        })?;

    match state
        .db
        .users()
        .create(&credentials.username, &password_hash)
        .await
    {
        Ok(id) => info!(user_id = id, "User created"),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::conflict("User already exists!"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    }

    Ok(message(StatusCode::OK, "User created successfully"))
}

async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = Credentials::from_body(payload)?;

    let user = state
        .db
        .users()
        .get_by_username(&credentials.username)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::bad_request("Invalid username or password"))?;

    let matches = verify_password_blocking(credentials.password, user.password_hash)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to verify password");
            ApiError::internal("Failed to verify password")
        })?;
    if !matches {
        return Err(ApiError::bad_request("Invalid username or password"));
    }

    let pair = unix_now()
        .and_then(|now| state.jwt.issue_pair(user.id, now))
        .map_err(|e| {
            error!(error = %e, "Failed to generate tokens");
            ApiError::internal("Failed to generate token")
        })?;

    let mut headers = HeaderMap::new();
    set_access_token(&mut headers, &pair.access);
    set_refresh_token(&mut headers, &pair.refresh);

    info!(user_id = user.id, "User logged in");

    Ok((
        headers,
        message(StatusCode::OK, "User logged in successfully"),
    ))
}

async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    clear_session(&mut headers);
    (
        headers,
        message(StatusCode::OK, "User logged out successfully"),
    )
}
