//! Named constraints of the `accounts` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Broad category of a constraint violation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConstraintCategory {
    /// Field-level validation (length, emptiness).
    Validation,
    /// Ordering between timestamps.
    Chronological,
    /// Uniqueness of a column.
    Uniqueness,
}

/// Constraint names declared by the `accounts` migration.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum AccountConstraints {
    #[strum(serialize = "accounts_email_address_not_empty")]
    EmailAddressNotEmpty,
    #[strum(serialize = "accounts_email_address_length_max")]
    EmailAddressLengthMax,
    #[strum(serialize = "accounts_password_hash_not_empty")]
    PasswordHashNotEmpty,
    #[strum(serialize = "accounts_name_length")]
    NameLength,

    #[strum(serialize = "accounts_last_login_after_created")]
    LastLoginAfterCreated,

    #[strum(serialize = "accounts_email_address_unique_idx")]
    EmailAddressUnique,
}

impl AccountConstraints {
    /// Parses a constraint name reported by Postgres.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::EmailAddressNotEmpty
            | Self::EmailAddressLengthMax
            | Self::PasswordHashNotEmpty
            | Self::NameLength => ConstraintCategory::Validation,
            Self::LastLoginAfterCreated => ConstraintCategory::Chronological,
            Self::EmailAddressUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<AccountConstraints> for String {
    #[inline]
    fn from(val: AccountConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for AccountConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
