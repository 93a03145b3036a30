use axum::{Json, Router, middleware, response::IntoResponse, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{Auth, require_auth};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<UsersState>,
        ))
        .with_state(state)
}

#[derive(Serialize)]
struct Profile {
    username: String,
}

#[derive(Serialize)]
struct ProfileResponse {
    data: Profile,
}

async fn profile(Auth(user): Auth) -> impl IntoResponse {
    Json(ProfileResponse {
        data: Profile {
            username: user.username,
        },
    })
}
