use std::fmt;

use jiff::Timestamp;

/// Numeric account identifier, assigned by the storage backend.
pub type AccountId = i64;

/// A stored account.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: AccountId,
    /// Normalized (trimmed, lower-cased) email, unique across accounts.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: Timestamp,
    pub last_login_at: Option<Timestamp>,
}

impl UserAccount {
    /// Returns `true` if the account may obtain tokens.
    #[inline]
    pub fn can_login(&self) -> bool {
        self.is_active && !self.password_hash.is_empty()
    }
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("is_active", &self.is_active)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .field("created_at", &self.created_at)
            .field("last_login_at", &self.last_login_at)
            .finish_non_exhaustive()
    }
}

impl From<warden_postgres::model::Account> for UserAccount {
    fn from(account: warden_postgres::model::Account) -> Self {
        Self {
            id: account.id,
            email: account.email_address,
            password_hash: account.password_hash,
            name: account.name,
            is_active: account.is_active,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            created_at: account.created_at.into(),
            last_login_at: account.last_login_at.map(Into::into),
        }
    }
}

/// Input to [`AccountBackend::insert`].
///
/// [`AccountBackend::insert`]: super::AccountBackend::insert
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccountRecord {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

impl fmt::Debug for NewAccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccountRecord")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

impl AccountChanges {
    /// Returns `true` if no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.password_hash.is_none()
            && self.is_active.is_none()
    }

    /// Applies the changes to an in-memory account.
    pub fn apply_to(self, account: &mut UserAccount) {
        if let Some(name) = self.name {
            account.name = Some(name);
        }
        if let Some(password_hash) = self.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(is_active) = self.is_active {
            account.is_active = is_active;
        }
    }
}

/// Registration input as received from the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> UserAccount {
        UserAccount {
            id: 1,
            email: "alice@example.com".to_owned(),
            password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_owned(),
            name: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Timestamp::UNIX_EPOCH,
            last_login_at: None,
        }
    }

    #[test]
    fn debug_hides_password_hash() {
        let debug = format!("{:?}", account());
        assert!(debug.contains("alice@example.com"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn inactive_or_hashless_accounts_cannot_login() {
        let mut inactive = account();
        inactive.is_active = false;
        assert!(!inactive.can_login());

        let mut hashless = account();
        hashless.password_hash.clear();
        assert!(!hashless.can_login());

        assert!(account().can_login());
    }

    #[test]
    fn changes_only_touch_set_columns() {
        let mut target = account();
        let changes = AccountChanges {
            name: Some("Alice".to_owned()),
            ..AccountChanges::default()
        };
        assert!(!changes.is_empty());

        changes.apply_to(&mut target);
        assert_eq!(target.name.as_deref(), Some("Alice"));
        assert_eq!(target.email, "alice@example.com");
        assert!(target.is_active);
        assert!(AccountChanges::default().is_empty());
    }
}
