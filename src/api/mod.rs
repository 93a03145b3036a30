mod auth;
mod error;
mod tasks;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let users_state = users::UsersState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let tasks_state = tasks::TasksState { db, jwt };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/user", users::router(users_state))
        .nest("/task", tasks::router(tasks_state))
}
