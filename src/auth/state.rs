//! Authentication state trait and macro.

use super::directory::UserDirectory;
use crate::jwt::JwtConfig;

/// Trait for state types that provide JWT keys and user lookup for authentication.
pub trait HasAuthBackend {
    type Directory: UserDirectory;

    fn jwt(&self) -> &JwtConfig;
    fn directory(&self) -> Self::Directory;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `jwt: Arc<JwtConfig>`
/// - `db: Database`
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub jwt: Arc<JwtConfig>,
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            type Directory = $crate::db::UserStore;

            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
            fn directory(&self) -> $crate::db::UserStore {
                self.db.users()
            }
        }
    };
}
