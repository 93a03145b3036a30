//! Authentication user types.

use crate::db::User;
use crate::jwt::IssuedToken;

/// Authenticated user attached to the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Database user ID
    pub id: i64,
    pub username: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Outcome of a successful authentication.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: AuthenticatedUser,
    /// Access token minted from the refresh token, if the old one was unusable
    pub reissued: Option<IssuedToken>,
}
