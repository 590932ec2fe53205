//! Account repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{Account, NewAccount, UpdateAccount};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Queries on the `accounts` table.
///
/// Emails are compared as given; callers pass normalized (trimmed,
/// lower-cased) addresses.
pub trait AccountRepository {
    /// Inserts a new account.
    ///
    /// Fails with a unique violation on `accounts_email_address_unique_idx`
    /// if the email is already registered.
    fn create_account(
        &mut self,
        new_account: NewAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Finds an account by id.
    fn find_account_by_id(
        &mut self,
        account_id: i64,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Finds an account by email.
    fn find_account_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Applies a partial update, returning `None` if the account does not exist.
    fn update_account(
        &mut self,
        account_id: i64,
        updates: UpdateAccount,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Sets `last_login_at` to the database clock, the same clock that
    /// filled `created_at`.
    fn record_login(
        &mut self,
        account_id: i64,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Checks whether an email is already registered.
    fn email_exists(&mut self, email: &str) -> impl Future<Output = PgResult<bool>> + Send;
}

impl AccountRepository for PgConnection {
    async fn create_account(&mut self, mut new_account: NewAccount) -> PgResult<Account> {
        use schema::accounts;

        new_account.name = new_account.name.map(|name| name.trim().to_owned());

        let account = diesel::insert_into(accounts::table)
            .values(&new_account)
            .returning(Account::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            account_id = account.id,
            "Account created"
        );

        Ok(account)
    }

    async fn find_account_by_id(&mut self, account_id: i64) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::id.eq(account_id))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_account_by_email(&mut self, email: &str) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::email_address.eq(email))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_account(
        &mut self,
        account_id: i64,
        updates: UpdateAccount,
    ) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        if updates.is_empty() {
            return self.find_account_by_id(account_id).await;
        }

        diesel::update(accounts::table.filter(dsl::id.eq(account_id)))
            .set(&updates)
            .returning(Account::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn record_login(&mut self, account_id: i64) -> PgResult<Option<Account>> {
        use diesel::dsl::now;
        use schema::accounts::{self, dsl};

        diesel::update(accounts::table.filter(dsl::id.eq(account_id)))
            .set(dsl::last_login_at.eq(now))
            .returning(Account::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn email_exists(&mut self, email: &str) -> PgResult<bool> {
        use diesel::dsl::exists;
        use schema::accounts::{self, dsl};

        diesel::select(exists(
            accounts::table.filter(dsl::email_address.eq(email)),
        ))
        .get_result(self)
        .await
        .map_err(PgError::from)
    }
}
