//! Account storage and credential checks.

mod backend;
mod memory;
mod model;
mod postgres;
mod validation;

use std::sync::Arc;

pub use self::backend::AccountBackend;
pub use self::memory::MemoryAccountBackend;
pub use self::model::{AccountChanges, AccountId, NewAccountRecord, Registration, UserAccount};
pub use self::postgres::PgAccountBackend;
pub use self::validation::{
    EMAIL_MAX_LENGTH, NAME_MAX_LENGTH, normalize_email, validate_display_name, validate_email,
};
use crate::service::security::{PasswordHasher, PasswordPolicy};
use crate::{Error, FieldErrors, Result};

const TRACING_TARGET: &str = "warden_server::service::account";

/// Registers accounts, checks credentials and applies account updates.
///
/// Cheap to clone; clones share the backend and hasher.
#[derive(Clone)]
pub struct AccountStore {
    backend: Arc<dyn AccountBackend>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
}

impl AccountStore {
    /// Creates a store over the given backend.
    pub fn new(
        backend: Arc<dyn AccountBackend>,
        hasher: PasswordHasher,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            backend,
            hasher,
            policy,
        }
    }

    /// Returns the backend name, e.g. `"memory"`.
    #[inline]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Creates a new active, unprivileged account.
    ///
    /// The email is normalized before the uniqueness check. Field validation
    /// runs first, then the password policy, then the duplicate check.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Validation`] for a malformed email or blank name
    /// - [`ErrorKind::InvalidPassword`] if the password policy rejects it
    /// - [`ErrorKind::DuplicateEmail`] if the email is already registered
    ///
    /// [`ErrorKind::Validation`]: crate::ErrorKind::Validation
    /// [`ErrorKind::InvalidPassword`]: crate::ErrorKind::InvalidPassword
    /// [`ErrorKind::DuplicateEmail`]: crate::ErrorKind::DuplicateEmail
    pub async fn register(&self, registration: Registration) -> Result<UserAccount> {
        let email = normalize_email(&registration.email);

        let mut fields = FieldErrors::new();
        if let Err(message) = validate_email(&email) {
            fields.add("email", message);
        }

        let name = match registration.name.as_deref().map(validate_display_name) {
            Some(Ok(name)) => Some(name),
            Some(Err(message)) => {
                fields.add("name", message);
                None
            }
            None => None,
        };
        fields.into_result()?;

        self.policy.check(&registration.password, &email)?;

        // Advisory only; the backend enforces uniqueness on insert.
        if self.backend.email_exists(&email).await? {
            tracing::debug!(target: TRACING_TARGET, "Registration with taken email");
            return Err(Error::duplicate_email());
        }

        let password_hash = self.hasher.hash_password(&registration.password)?;
        let account = self
            .backend
            .insert(NewAccountRecord {
                email,
                password_hash,
                name,
            })
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = account.id,
            backend = self.backend.name(),
            "Account registered"
        );

        Ok(account)
    }

    /// Checks an email and password pair and records the login.
    ///
    /// Unknown email, wrong password and inactive account all fail with the
    /// same [`ErrorKind::InvalidCredentials`] error, and an unknown email
    /// still pays for one hash verification.
    ///
    /// [`ErrorKind::InvalidCredentials`]: crate::ErrorKind::InvalidCredentials
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<UserAccount> {
        let email = normalize_email(email);
        let Some(account) = self.backend.find_by_email(&email).await? else {
            self.hasher.verify_dummy_password(password);
            tracing::debug!(target: TRACING_TARGET, "Login for unknown email");
            return Err(Error::invalid_credentials());
        };

        if !account.can_login() {
            self.hasher.verify_dummy_password(password);
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = account.id,
                "Login for inactive account"
            );
            return Err(Error::invalid_credentials());
        }

        if !self.hasher.verify_password(password, &account.password_hash)? {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = account.id,
                "Login with wrong password"
            );
            return Err(Error::invalid_credentials());
        }

        let account = self
            .backend
            .record_login(account.id)
            .await?
            .ok_or_else(Error::invalid_credentials)?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = account.id,
            "Credentials verified"
        );

        Ok(account)
    }

    /// Loads an account by id.
    pub async fn get(&self, id: AccountId) -> Result<UserAccount> {
        self.backend
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("account"))
    }

    /// Replaces the display name. The caller validates the name.
    pub async fn update_name(&self, id: AccountId, name: String) -> Result<UserAccount> {
        let changes = AccountChanges {
            name: Some(name),
            ..AccountChanges::default()
        };
        self.apply(id, changes).await
    }

    /// Changes the password after checking the current one.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Validation`] if `current_password` is wrong
    /// - [`ErrorKind::InvalidPassword`] if the password policy rejects the new one
    /// - [`ErrorKind::NotFound`] if the account is missing
    ///
    /// [`ErrorKind::Validation`]: crate::ErrorKind::Validation
    /// [`ErrorKind::InvalidPassword`]: crate::ErrorKind::InvalidPassword
    /// [`ErrorKind::NotFound`]: crate::ErrorKind::NotFound
    pub async fn change_password(
        &self,
        id: AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let account = self.get(id).await?;
        if !self
            .hasher
            .verify_password(current_password, &account.password_hash)?
        {
            let mut fields = FieldErrors::new();
            fields.add("currentPassword", "invalid password");
            return Err(Error::validation(fields));
        }

        self.policy.check(new_password, &account.email)?;
        let password_hash = self.hasher.hash_password(new_password)?;

        let changes = AccountChanges {
            password_hash: Some(password_hash),
            ..AccountChanges::default()
        };
        self.apply(id, changes).await?;

        tracing::info!(target: TRACING_TARGET, account_id = id, "Password changed");
        Ok(())
    }

    /// Activates or deactivates an account.
    pub async fn set_active(&self, id: AccountId, is_active: bool) -> Result<UserAccount> {
        let changes = AccountChanges {
            is_active: Some(is_active),
            ..AccountChanges::default()
        };
        let account = self.apply(id, changes).await?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = id,
            is_active,
            "Account activation changed"
        );
        Ok(account)
    }

    /// Checks that the backend can serve requests.
    pub async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await
    }

    async fn apply(&self, id: AccountId, changes: AccountChanges) -> Result<UserAccount> {
        self.backend
            .update(id, changes)
            .await?
            .ok_or_else(|| Error::not_found("account"))
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::service::security::Argon2Costs;

    pub(crate) fn memory_store() -> AccountStore {
        let costs = Argon2Costs {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let hasher = PasswordHasher::new(costs).expect("valid test costs");
        AccountStore::new(
            Arc::new(MemoryAccountBackend::new()),
            hasher,
            PasswordPolicy::default(),
        )
    }

    pub(crate) fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: email.to_owned(),
            password: password.to_owned(),
            name: None,
        }
    }

    #[tokio::test]
    async fn register_normalizes_email() -> anyhow::Result<()> {
        let store = memory_store();
        let account = store
            .register(registration("  Alice@Example.COM ", "secret123"))
            .await?;

        assert_eq!(account.id, 1);
        assert_eq!(account.email, "alice@example.com");
        assert_ne!(account.password_hash, "secret123");
        assert!(account.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_case_variant_duplicate() -> anyhow::Result<()> {
        let store = memory_store();
        store.register(registration("a@x.io", "secret123")).await?;

        let error = store
            .register(registration("A@X.IO", "another123"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DuplicateEmail);
        Ok(())
    }

    #[tokio::test]
    async fn register_validates_fields_before_password() {
        let store = memory_store();
        let error = store
            .register(registration("not-an-email", "123"))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(error.fields().get("email").is_some());
    }

    #[tokio::test]
    async fn register_applies_password_policy() {
        let store = memory_store();
        let error = store
            .register(registration("a@x.io", "12345678"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidPassword);
    }

    #[tokio::test]
    async fn register_rejects_blank_name() {
        let store = memory_store();
        let mut input = registration("a@x.io", "secret123");
        input.name = Some("   ".to_owned());

        let error = store.register(input).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(error.fields().get("name").is_some());
    }

    #[tokio::test]
    async fn verify_credentials_records_login() -> anyhow::Result<()> {
        let store = memory_store();
        let created = store.register(registration("a@x.io", "secret123")).await?;
        assert!(created.last_login_at.is_none());

        let account = store.verify_credentials("A@x.io", "secret123").await?;
        assert_eq!(account.id, created.id);
        assert!(account.last_login_at.is_some_and(|at| at >= created.created_at));
        Ok(())
    }

    #[tokio::test]
    async fn credential_failures_are_uniform() -> anyhow::Result<()> {
        let store = memory_store();
        let account = store.register(registration("a@x.io", "secret123")).await?;

        let unknown = store
            .verify_credentials("nobody@x.io", "secret123")
            .await
            .unwrap_err();
        let wrong = store
            .verify_credentials("a@x.io", "wrong-password")
            .await
            .unwrap_err();

        store.set_active(account.id, false).await?;
        let inactive = store
            .verify_credentials("a@x.io", "secret123")
            .await
            .unwrap_err();

        for error in [&unknown, &wrong, &inactive] {
            assert_eq!(error.kind(), ErrorKind::InvalidCredentials);
            assert_eq!(error.message(), unknown.message());
        }
        Ok(())
    }

    #[tokio::test]
    async fn change_password_requires_current_password() -> anyhow::Result<()> {
        let store = memory_store();
        let account = store.register(registration("a@x.io", "secret123")).await?;

        let error = store
            .change_password(account.id, "wrong-password", "newsecret456")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);

        store
            .change_password(account.id, "secret123", "newsecret456")
            .await?;
        assert!(store.verify_credentials("a@x.io", "secret123").await.is_err());
        assert!(store.verify_credentials("a@x.io", "newsecret456").await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let store = memory_store();
        assert_eq!(store.get(7).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            store.update_name(7, "Bob".to_owned()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
