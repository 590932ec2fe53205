//! PostgreSQL account storage.

use async_trait::async_trait;
use warden_postgres::model::{NewAccount, UpdateAccount};
use warden_postgres::query::AccountRepository;
use warden_postgres::types::{AccountConstraints, ConstraintCategory};
use warden_postgres::{PgClient, PgError};

use super::{AccountBackend, AccountChanges, AccountId, NewAccountRecord, UserAccount};
use crate::{Error, Result};

const TRACING_TARGET: &str = "warden_server::service::account::postgres";

/// Backend storing accounts in the `accounts` table.
///
/// Email uniqueness is enforced by `accounts_email_address_unique_idx`.
#[derive(Debug, Clone)]
pub struct PgAccountBackend {
    client: PgClient,
}

impl PgAccountBackend {
    /// Wraps a connected client. Migrations must already be applied.
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountBackend for PgAccountBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, record: NewAccountRecord) -> Result<UserAccount> {
        let mut conn = self.client.get_connection().await?;
        let new_account =
            NewAccount::new(record.email, record.password_hash).with_name(record.name);

        let account = conn.create_account(new_account).await?;
        Ok(account.into())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<UserAccount>> {
        let mut conn = self.client.get_connection().await?;
        let account = conn.find_account_by_id(id).await?;
        Ok(account.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let mut conn = self.client.get_connection().await?;
        let account = conn.find_account_by_email(email).await?;
        Ok(account.map(Into::into))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let mut conn = self.client.get_connection().await?;
        Ok(conn.email_exists(email).await?)
    }

    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<Option<UserAccount>> {
        let mut conn = self.client.get_connection().await?;
        let updates = UpdateAccount {
            name: changes.name,
            password_hash: changes.password_hash,
            is_active: changes.is_active,
        };

        let account = conn.update_account(id, updates).await?;
        Ok(account.map(Into::into))
    }

    async fn record_login(&self, id: AccountId) -> Result<Option<UserAccount>> {
        let mut conn = self.client.get_connection().await?;
        let account = conn.record_login(id).await?;
        Ok(account.map(Into::into))
    }

    async fn health_check(&self) -> Result<()> {
        self.client.ping().await?;
        Ok(())
    }
}

impl From<PgError> for Error {
    fn from(error: PgError) -> Self {
        match error.account_constraint() {
            Some(AccountConstraints::EmailAddressUnique) => return Error::duplicate_email(),
            Some(constraint) if constraint.categorize() == ConstraintCategory::Validation => {
                let field = match constraint {
                    AccountConstraints::NameLength => "name",
                    AccountConstraints::PasswordHashNotEmpty => "password",
                    _ => "email",
                };
                return Error::validation(Default::default())
                    .with_field(field, "value violates a storage constraint")
                    .with_source(error);
            }
            _ => {}
        }

        if error.is_unique_violation() {
            return Error::duplicate_email();
        }

        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            transient = error.is_transient(),
            "Account storage operation failed"
        );

        Error::storage("postgres", "account storage operation failed").with_source(error)
    }
}
