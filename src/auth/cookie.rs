//! Cookie and header transport for session tokens.

use axum::http::{HeaderMap, HeaderValue, header};

use crate::jwt::IssuedToken;

/// Cookie name for the access token (short-lived, 15 minutes).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived, 7 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie headers.
///
/// HTTP/2 clients may split the cookie list across several `Cookie` headers.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn token_cookie(name: &str, issued: &IssuedToken) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name,
        issued.token,
        issued.max_age()
    )
}

/// `Set-Cookie` value that expires a cookie immediately.
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly", name)
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid Set-Cookie value"),
    }
}

/// Put an access token in both the cookie and the `Authorization` header.
pub fn set_access_token(headers: &mut HeaderMap, access: &IssuedToken) {
    append_set_cookie(headers, &token_cookie(ACCESS_COOKIE_NAME, access));
    match HeaderValue::from_str(&format!("Bearer {}", access.token)) {
        Ok(value) => {
            headers.insert(header::AUTHORIZATION, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid Authorization header value"),
    }
}

/// Put a refresh token in its cookie. Only done at login.
pub fn set_refresh_token(headers: &mut HeaderMap, refresh: &IssuedToken) {
    append_set_cookie(headers, &token_cookie(REFRESH_COOKIE_NAME, refresh));
}

/// Expire both session cookies.
pub fn clear_session(headers: &mut HeaderMap) {
    append_set_cookie(headers, &clear_cookie(ACCESS_COOKIE_NAME));
    append_set_cookie(headers, &clear_cookie(REFRESH_COOKIE_NAME));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{Claims, TokenKind};

    fn issued(kind: TokenKind) -> IssuedToken {
        IssuedToken {
            token: "header.payload.sig".to_string(),
            claims: Claims::new(1, kind, 0),
        }
    }

    #[test]
    fn test_get_cookie_simple() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=abc123"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
    }

    #[test]
    fn test_get_cookie_multiple() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; access_token=abc123; refresh_token=xyz789"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
        assert_eq!(get_cookie(&headers, "refresh_token"), Some("xyz789"));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
    }

    #[test]
    fn test_get_cookie_split_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("access_token=abc123"));
        headers.append(header::COOKIE, HeaderValue::from_static("refresh_token=xyz789"));

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
        assert_eq!(get_cookie(&headers, "refresh_token"), Some("xyz789"));
    }

    #[test]
    fn test_get_cookie_not_found() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("foo=bar"));

        assert_eq!(get_cookie(&headers, "access_token"), None);
        assert_eq!(get_cookie(&HeaderMap::new(), "access_token"), None);
    }

    #[test]
    fn test_token_cookie_lifetimes() {
        assert_eq!(
            token_cookie(ACCESS_COOKIE_NAME, &issued(TokenKind::Access)),
            "access_token=header.payload.sig; Path=/; Max-Age=900; HttpOnly; SameSite=Lax"
        );
        assert_eq!(
            token_cookie(REFRESH_COOKIE_NAME, &issued(TokenKind::Refresh)),
            "refresh_token=header.payload.sig; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_set_access_token_sets_cookie_and_header() {
        let mut headers = HeaderMap::new();
        set_access_token(&mut headers, &issued(TokenKind::Access));

        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer header.payload.sig"
        );
        let cookies: Vec<_> = headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].to_str().unwrap().starts_with("access_token=header.payload.sig;"));
    }

    #[test]
    fn test_clear_session_expires_both_cookies() {
        let mut headers = HeaderMap::new();
        clear_session(&mut headers);

        let cookies: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            cookies,
            vec![
                "access_token=; Path=/; Max-Age=0; HttpOnly".to_string(),
                "refresh_token=; Path=/; Max-Age=0; HttpOnly".to_string(),
            ]
        );
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }
}
