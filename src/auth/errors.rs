//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::cookie::clear_session;
use crate::jwt::JwtError;

/// Why a request failed to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No refresh token cookie was sent
    MissingCredential,
    MalformedToken,
    UnexpectedSigningMethod,
    SignatureInvalid,
    Expired,
    /// The token subject does not resolve to a user
    IdentityNotFound,
    /// Signature verified but the claims are not in a recognized shape
    UnrecognizedClaims,
    /// Token decoded but carries the other kind in `typ`
    WrongTokenKind,
    /// Signing a replacement access token failed
    IssueFailed,
}

impl AuthErrorKind {
    /// Message returned to the client. Only two values are ever exposed.
    pub fn message(self) -> &'static str {
        match self {
            AuthErrorKind::MalformedToken
            | AuthErrorKind::UnexpectedSigningMethod
            | AuthErrorKind::SignatureInvalid
            | AuthErrorKind::Expired
            | AuthErrorKind::IdentityNotFound => "Token expired",
            AuthErrorKind::MissingCredential
            | AuthErrorKind::UnrecognizedClaims
            | AuthErrorKind::WrongTokenKind
            | AuthErrorKind::IssueFailed => "Unauthorized",
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AuthErrorKind::MissingCredential => "missing credential",
            AuthErrorKind::MalformedToken => "malformed token",
            AuthErrorKind::UnexpectedSigningMethod => "unexpected signing method",
            AuthErrorKind::SignatureInvalid => "invalid signature",
            AuthErrorKind::Expired => "token expired",
            AuthErrorKind::IdentityNotFound => "identity not found",
            AuthErrorKind::UnrecognizedClaims => "unrecognized claims",
            AuthErrorKind::WrongTokenKind => "wrong token kind",
            AuthErrorKind::IssueFailed => "failed to issue token",
        };
        f.write_str(text)
    }
}

impl From<JwtError> for AuthErrorKind {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::MalformedToken => AuthErrorKind::MalformedToken,
            JwtError::UnexpectedSigningMethod(_) => AuthErrorKind::UnexpectedSigningMethod,
            JwtError::SignatureInvalid => AuthErrorKind::SignatureInvalid,
            JwtError::UnrecognizedClaims => AuthErrorKind::UnrecognizedClaims,
            JwtError::Encoding(_) | JwtError::TimeError => AuthErrorKind::IssueFailed,
        }
    }
}

/// Rejection for protected routes: 401 JSON body and both cookies cleared.
#[derive(Debug)]
pub struct ApiAuthError(pub AuthErrorKind);

#[derive(Serialize)]
struct ErrorResponse {
    message: &'static str,
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                message: self.0.message(),
            }),
        )
            .into_response();

        clear_session(response.headers_mut());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_messages() {
        assert_eq!(AuthErrorKind::MissingCredential.message(), "Unauthorized");
        assert_eq!(AuthErrorKind::WrongTokenKind.message(), "Unauthorized");
        assert_eq!(AuthErrorKind::IssueFailed.message(), "Unauthorized");
        assert_eq!(AuthErrorKind::UnrecognizedClaims.message(), "Unauthorized");
        assert_eq!(AuthErrorKind::MalformedToken.message(), "Token expired");
        assert_eq!(AuthErrorKind::SignatureInvalid.message(), "Token expired");
        assert_eq!(AuthErrorKind::Expired.message(), "Token expired");
        assert_eq!(AuthErrorKind::IdentityNotFound.message(), "Token expired");
    }

    #[tokio::test]
    async fn test_rejection_clears_cookies() {
        let response = ApiAuthError(AuthErrorKind::Expired).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
        assert!(response.headers().get(header::AUTHORIZATION).is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Token expired");
    }
}
