//! Request authentication with transparent refresh.
//!
//! The access token is read from the `access_token` cookie, falling back to the
//! raw `Authorization` header. It is only considered when a `refresh_token`
//! cookie is also present; otherwise the request is rejected outright. An
//! access token that fails to decode, has expired, or names an unknown user is
//! not an error by itself: the refresh token is checked instead and, if valid,
//! a new access token is minted for the response.

use axum::http::{HeaderMap, header};
use tracing::{debug, error};

use super::cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, get_cookie};
use super::directory::UserDirectory;
use super::errors::AuthErrorKind;
use super::state::HasAuthBackend;
use super::types::{Authenticated, AuthenticatedUser};
use crate::jwt::{Claims, TokenKind};

/// Authenticate a request from its headers at time `now` (Unix seconds).
pub async fn authenticate_request<S>(
    headers: &HeaderMap,
    state: &S,
    now: u64,
) -> Result<Authenticated, AuthErrorKind>
where
    S: HasAuthBackend + Sync,
{
    // The header value is used verbatim, a "Bearer " prefix is not stripped.
    let access_token = get_cookie(headers, ACCESS_COOKIE_NAME).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    });

    let Some(refresh_token) = get_cookie(headers, REFRESH_COOKIE_NAME) else {
        debug!("No refresh token cookie");
        return Err(AuthErrorKind::MissingCredential);
    };

    if let Some(access_token) = access_token {
        match validate_access(access_token, state, now).await {
            Ok(user) => {
                return Ok(Authenticated {
                    user,
                    reissued: None,
                });
            }
            Err(kind) => debug!(reason = %kind, "Access token rejected, trying refresh token"),
        }
    }

    refresh(refresh_token, state, now).await
}

async fn validate_access<S>(
    token: &str,
    state: &S,
    now: u64,
) -> Result<AuthenticatedUser, AuthErrorKind>
where
    S: HasAuthBackend + Sync,
{
    let claims = state.jwt().decode_access(token)?;

    if claims.typ != TokenKind::Access {
        return Err(AuthErrorKind::WrongTokenKind);
    }

    if claims.is_expired(now) {
        return Err(AuthErrorKind::Expired);
    }

    lookup(state, &claims).await
}

async fn refresh<S>(token: &str, state: &S, now: u64) -> Result<Authenticated, AuthErrorKind>
where
    S: HasAuthBackend + Sync,
{
    let claims = state.jwt().decode_refresh(token)?;

    if claims.typ != TokenKind::Refresh {
        return Err(AuthErrorKind::WrongTokenKind);
    }

    if claims.is_expired(now) {
        return Err(AuthErrorKind::Expired);
    }

    let user = lookup(state, &claims).await?;

    let access = state.jwt().issue_access(user.id, now).map_err(|e| {
        error!(error = %e, "Failed to generate access token");
        AuthErrorKind::IssueFailed
    })?;

    debug!(user_id = user.id, "Issued new access token from refresh token");

    Ok(Authenticated {
        user,
        reissued: Some(access),
    })
}

async fn lookup<S>(state: &S, claims: &Claims) -> Result<AuthenticatedUser, AuthErrorKind>
where
    S: HasAuthBackend + Sync,
{
    let Some(id) = claims.user_id() else {
        return Err(AuthErrorKind::IdentityNotFound);
    };

    match state.directory().find_by_id(id).await {
        Ok(Some(user)) => Ok(user.into()),
        Ok(None) => Err(AuthErrorKind::IdentityNotFound),
        Err(e) => {
            error!(user_id = id, error = %e, "Failed to get user");
            Err(AuthErrorKind::IdentityNotFound)
        }
    }
}
