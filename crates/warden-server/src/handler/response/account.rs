//! Account response types.

use serde::{Deserialize, Serialize};

use crate::service::{AccountId, UserAccount};

/// Public view of an account.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Account identifier.
    pub id: AccountId,
    /// Normalized email address.
    pub email: String,
    /// Display name, `null` if never set.
    pub name: Option<String>,
}

impl From<UserAccount> for Profile {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
        }
    }
}
