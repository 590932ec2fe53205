//! Authentication response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::service::{AccessToken, SessionClaims, TokenKind, TokenPair};

/// Tokens returned at login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    /// Short-lived token for the `Authorization` header.
    pub access_token: String,
    /// Long-lived token for `/auth/token/refresh`.
    pub refresh_token: String,
    /// When the access token expires.
    pub expires_at: Timestamp,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.access_expires_at,
        }
    }
}

/// Access token returned on refresh.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_at: Timestamp,
}

impl From<AccessToken> for AccessTokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token: token.token,
            expires_at: token.expires_at,
        }
    }
}

/// Result of verifying a token.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedToken {
    pub token_type: TokenKind,
    pub expires_at: Timestamp,
}

impl From<SessionClaims> for VerifiedToken {
    fn from(claims: SessionClaims) -> Self {
        Self {
            token_type: claims.kind,
            expires_at: claims.expires_at,
        }
    }
}
