use async_trait::async_trait;

use super::{AccountChanges, AccountId, NewAccountRecord, UserAccount};
use crate::Result;

/// Storage for accounts.
///
/// Emails passed in are already normalized. Implementations must enforce
/// email uniqueness atomically with the insert: of two concurrent inserts
/// with the same email, exactly one succeeds and the other fails with
/// [`ErrorKind::DuplicateEmail`].
///
/// [`ErrorKind::DuplicateEmail`]: crate::ErrorKind::DuplicateEmail
#[async_trait]
pub trait AccountBackend: Send + Sync {
    /// Short backend name used in logs and the health response.
    fn name(&self) -> &'static str;

    /// Stores a new active, unprivileged account and assigns its id.
    async fn insert(&self, record: NewAccountRecord) -> Result<UserAccount>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<UserAccount>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>>;

    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Applies a partial update, returning `None` if the account is missing.
    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<Option<UserAccount>>;

    /// Stamps `last_login_at` with the clock that stamped `created_at`,
    /// returning `None` if the account is missing.
    async fn record_login(&self, id: AccountId) -> Result<Option<UserAccount>>;

    /// Checks that the backend can serve requests.
    async fn health_check(&self) -> Result<()>;
}
