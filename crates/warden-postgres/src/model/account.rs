//! Account model for the `accounts` table.
//!
//! - [`Account`]: a stored row
//! - [`NewAccount`]: values for an insert
//! - [`UpdateAccount`]: a partial update, `None` fields are left untouched

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::accounts;

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    /// Sequential account identifier.
    pub id: i64,
    /// Normalized (trimmed, lower-cased) login email.
    pub email_address: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Whether the account may authenticate.
    pub is_active: bool,
    /// Access to administrative tooling.
    pub is_staff: bool,
    /// Every permission without explicit grants.
    pub is_superuser: bool,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
    /// Timestamp of the last successful authentication.
    pub last_login_at: Option<Timestamp>,
}

/// Values for inserting an account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccount {
    pub email_address: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Partial update of an account.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

impl Account {
    /// Returns whether the account can authenticate with a password.
    pub fn can_login(&self) -> bool {
        self.is_active && !self.password_hash.is_empty()
    }
}

impl NewAccount {
    /// Creates an active, unprivileged account.
    pub fn new(email_address: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            password_hash: password_hash.into(),
            name: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}

impl UpdateAccount {
    /// Returns `true` if no column would be written.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.password_hash.is_none()
            && self.is_active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_is_active_and_unprivileged() {
        let account = NewAccount::new("a@x.com", "$argon2id$hash").with_name(Some("A".into()));
        assert!(account.is_active);
        assert!(!account.is_staff);
        assert!(!account.is_superuser);
        assert_eq!(account.name.as_deref(), Some("A"));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateAccount::default().is_empty());

        let update = UpdateAccount {
            is_active: Some(false),
            ..UpdateAccount::default()
        };
        assert!(!update.is_empty());
    }
}
