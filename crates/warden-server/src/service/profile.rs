//! Self-service profile reads and updates for the authenticated account.

use crate::service::account::{AccountId, AccountStore, UserAccount, validate_display_name};
use crate::{Error, FieldErrors, Result};

const TRACING_TARGET: &str = "warden_server::service::profile";

/// Fields a caller may change on their own profile.
///
/// Email and id are not here: they are immutable through this service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    /// New display name; `None` leaves the name unchanged.
    pub name: Option<String>,
}

/// Profile operations scoped to the token subject.
#[derive(Debug, Clone)]
pub struct ProfileService {
    accounts: AccountStore,
}

impl ProfileService {
    pub fn new(accounts: AccountStore) -> Self {
        Self { accounts }
    }

    /// Returns the subject's account.
    pub async fn get_profile(&self, subject_id: AccountId) -> Result<UserAccount> {
        self.active_account(subject_id).await
    }

    /// Applies a patch to the subject's account.
    ///
    /// An empty patch returns the account unchanged.
    pub async fn update_profile(
        &self,
        subject_id: AccountId,
        patch: ProfilePatch,
    ) -> Result<UserAccount> {
        let account = self.active_account(subject_id).await?;

        let Some(name) = patch.name else {
            return Ok(account);
        };

        let name = validate_display_name(&name).map_err(|message| {
            let mut fields = FieldErrors::new();
            fields.add("name", message);
            Error::validation(fields)
        })?;

        let account = self.accounts.update_name(account.id, name).await?;
        tracing::info!(
            target: TRACING_TARGET,
            account_id = account.id,
            "Profile updated"
        );

        Ok(account)
    }

    /// Changes the subject's password.
    pub async fn change_password(
        &self,
        subject_id: AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let account = self.active_account(subject_id).await?;
        self.accounts
            .change_password(account.id, current_password, new_password)
            .await
    }

    /// Tokens outlive deactivation, so every operation rechecks the flag.
    async fn active_account(&self, subject_id: AccountId) -> Result<UserAccount> {
        let account = self.accounts.get(subject_id).await?;
        if !account.is_active {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = subject_id,
                "Profile access by inactive account"
            );
            return Err(Error::unauthenticated("account is inactive"));
        }
        Ok(account)
    }
}
