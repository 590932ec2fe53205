//! Authentication request types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::service::Registration;

/// Request payload for registration.
#[must_use]
#[derive(Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    /// Email address; the account store trims, lower-cases and then
    /// validates it.
    pub email: String,

    /// Password; the password policy is applied by the account store.
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub password: String,

    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl From<Register> for Registration {
    fn from(request: Register) -> Self {
        Self {
            email: request.email,
            password: request.password,
            name: request.name,
        }
    }
}

/// Request payload for obtaining a token pair.
#[must_use]
#[derive(Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub email: String,

    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub password: String,
}

/// Request payload for refreshing an access token.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub refresh_token: String,
}

/// Request payload for verifying a token of either kind.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyToken {
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub token: String,
}
