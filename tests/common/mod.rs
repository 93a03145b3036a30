#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use daily_tasks::{ServerConfig, create_app, db::Database, jwt::JwtConfig, password::hash_password};
use std::time::{SystemTime, UNIX_EPOCH};

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-0123456789abcdef";

/// Create a test app and return (app, db, jwt_config).
pub async fn create_test_app() -> (Router, Database, JwtConfig) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_access_secret: ACCESS_SECRET.to_vec(),
        jwt_refresh_secret: REFRESH_SECRET.to_vec(),
    };
    (
        create_app(&config),
        db,
        JwtConfig::new(ACCESS_SECRET, REFRESH_SECRET),
    )
}

/// Create a user with a real bcrypt hash. Returns the user ID.
pub async fn create_user(db: &Database, username: &str, password: &str) -> i64 {
    let hash = hash_password(password).expect("Failed to hash password");
    db.users().create(username, &hash).await.unwrap()
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn cookie_header(access_token: Option<&str>, refresh_token: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(token) = access_token {
        parts.push(format!("access_token={}", token));
    }
    if let Some(token) = refresh_token {
        parts.push(format!("refresh_token={}", token));
    }
    parts.join("; ")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", cookie_name)) && c.contains("Max-Age=0"))
}

/// Value of a cookie being set, if any.
pub fn set_cookie_value(cookies: &[String], cookie_name: &str) -> Option<String> {
    let prefix = format!("{}=", cookie_name);
    cookies
        .iter()
        .filter(|c| !c.contains("Max-Age=0"))
        .find_map(|c| c.strip_prefix(&prefix))
        .and_then(|rest| rest.split(';').next())
        .map(|value| value.to_string())
}

pub fn authorization_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
