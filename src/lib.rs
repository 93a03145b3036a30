pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod password;

use api::create_api_router;
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Secret for signing access tokens
    pub jwt_access_secret: Vec<u8>,
    /// Secret for signing refresh tokens
    pub jwt_refresh_secret: Vec<u8>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(
        &config.jwt_access_secret,
        &config.jwt_refresh_secret,
    ));

    create_api_router(config.db.clone(), jwt)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
