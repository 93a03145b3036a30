//! JWT session authentication.
//!
//! Dual-token system: short-lived access tokens (15 min) and long-lived
//! refresh tokens (7 days), both stateless. Protected routes transparently
//! mint a new access token when the old one is unusable but the refresh
//! token is still valid.

mod authenticator;
mod cookie;
mod directory;
mod errors;
mod extractors;
mod state;
mod types;

pub use authenticator::authenticate_request;
pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_session, get_cookie, set_access_token,
    set_refresh_token,
};
pub use directory::UserDirectory;
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{Auth, require_auth};
pub use state::HasAuthBackend;
pub use types::{Authenticated, AuthenticatedUser};
