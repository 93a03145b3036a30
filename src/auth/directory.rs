//! Identity lookup used by the authenticator.

use std::future::Future;

use crate::db::{User, UserStore};

/// Resolves a user from the numeric id carried in a token subject.
///
/// `Ok(None)` means the user does not exist.
pub trait UserDirectory: Send + Sync {
    type Error: std::fmt::Display + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;
}

impl UserDirectory for UserStore {
    type Error = sqlx::Error;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send {
        self.get_by_id(id)
    }
}
