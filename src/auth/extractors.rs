//! Axum middleware and extractor for authenticated routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::authenticator::authenticate_request;
use super::cookie::set_access_token;
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;
use crate::jwt::unix_now;

/// Middleware guarding a group of routes.
///
/// On success the user is stored in the request extensions for [`Auth`], and
/// a reissued access token is written to the response cookie and
/// `Authorization` header. On failure the request never reaches the handler.
pub async fn require_auth<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    let now = match unix_now() {
        Ok(now) => now,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read system time");
            return ApiAuthError(AuthErrorKind::IssueFailed).into_response();
        }
    };

    let auth = match authenticate_request(request.headers(), &state, now).await {
        Ok(auth) => auth,
        Err(kind) => {
            tracing::debug!(reason = %kind, path = %request.uri().path(), "Rejected request");
            return ApiAuthError(kind).into_response();
        }
    };

    request.extensions_mut().insert(auth.user);

    let mut response = next.run(request).await;
    if let Some(access) = auth.reissued {
        set_access_token(response.headers_mut(), &access);
    }
    response
}

/// Extractor for the user attached by [`require_auth`].
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or(ApiAuthError(AuthErrorKind::MissingCredential))
    }
}
