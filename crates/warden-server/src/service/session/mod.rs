//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying [`SessionClaims`]. An access token
//! authenticates requests; a refresh token is only exchanged for new access
//! tokens. Validation checks, in order: structure, signature, issuer and
//! audience, token kind, expiry.

mod claims;
mod error;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, Header, Validation};
use uuid::Uuid;

pub use self::claims::{SessionClaims, TokenKind};
pub use self::error::TokenError;
use crate::service::AccountId;
use crate::service::security::SessionKeys;
use crate::{Error, Result};

const TRACING_TARGET: &str = "warden_server::service::session";

/// Value of the `iss` claim.
pub const TOKEN_ISSUER: &str = "warden";
/// Value of the `aud` claim.
pub const TOKEN_AUDIENCE: &str = "warden:api";

/// Access and refresh tokens issued together at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: Timestamp,
    pub refresh_token: String,
    pub refresh_expires_at: Timestamp,
}

/// Access token issued on refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Issues and validates session tokens.
///
/// Stateless: tokens are not stored, and remain valid until they expire.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    keys: SessionKeys,
    access_ttl: SignedDuration,
    refresh_ttl: SignedDuration,
}

impl SessionIssuer {
    /// Default access token lifetime (15 minutes).
    pub const DEFAULT_ACCESS_TTL: SignedDuration = SignedDuration::from_mins(15);
    /// Default refresh token lifetime (7 days).
    pub const DEFAULT_REFRESH_TTL: SignedDuration = SignedDuration::from_hours(24 * 7);

    pub fn new(keys: SessionKeys, access_ttl: SignedDuration, refresh_ttl: SignedDuration) -> Self {
        Self {
            keys,
            access_ttl,
            refresh_ttl,
        }
    }

    #[inline]
    pub fn access_ttl(&self) -> SignedDuration {
        self.access_ttl
    }

    #[inline]
    pub fn refresh_ttl(&self) -> SignedDuration {
        self.refresh_ttl
    }

    /// Issues an access and refresh token pair for an account.
    pub fn issue(&self, subject_id: AccountId) -> Result<TokenPair> {
        self.issue_at(subject_id, Timestamp::now())
    }

    /// Issues a token pair as if the current time were `now`.
    pub fn issue_at(&self, subject_id: AccountId, now: Timestamp) -> Result<TokenPair> {
        let (access_token, access_expires_at) = self.sign(subject_id, TokenKind::Access, now)?;
        let (refresh_token, refresh_expires_at) =
            self.sign(subject_id, TokenKind::Refresh, now)?;

        tracing::debug!(
            target: TRACING_TARGET,
            account_id = subject_id,
            expires_at = %access_expires_at,
            "Token pair issued"
        );

        Ok(TokenPair {
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Validates a token of the expected kind and returns its subject.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<AccountId, TokenError> {
        self.validate_at(token, expected, Timestamp::now())
            .map(|claims| claims.subject_id)
    }

    /// Validates a token of the expected kind as if the current time were `now`.
    pub fn validate_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: Timestamp,
    ) -> Result<SessionClaims, TokenError> {
        let claims = self.decode(token)?;
        if claims.kind != expected {
            return Err(TokenError::WrongKind);
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Validates a token of either kind.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Timestamp::now())
    }

    /// Validates a token of either kind as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: Timestamp) -> Result<SessionClaims, TokenError> {
        let claims = self.decode(token)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated. Token failures surface as
    /// [`ErrorKind::Unauthenticated`] with the [`TokenError`] as source.
    ///
    /// [`ErrorKind::Unauthenticated`]: crate::ErrorKind::Unauthenticated
    pub fn refresh(&self, refresh_token: &str) -> Result<AccessToken> {
        self.refresh_at(refresh_token, Timestamp::now())
    }

    /// Exchanges a refresh token as if the current time were `now`.
    pub fn refresh_at(&self, refresh_token: &str, now: Timestamp) -> Result<AccessToken> {
        let claims = self.validate_at(refresh_token, TokenKind::Refresh, now)?;
        let (token, expires_at) = self.sign(claims.subject_id, TokenKind::Access, now)?;

        tracing::debug!(
            target: TRACING_TARGET,
            account_id = claims.subject_id,
            "Access token refreshed"
        );

        Ok(AccessToken { token, expires_at })
    }

    fn sign(
        &self,
        subject_id: AccountId,
        kind: TokenKind,
        now: Timestamp,
    ) -> Result<(String, Timestamp)> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let expires_at = now.checked_add(ttl).map_err(|e| {
            Error::internal("session", format!("token expiry out of range: {e}"))
        })?;

        let claims = SessionClaims {
            issuer: TOKEN_ISSUER.to_owned(),
            audience: TOKEN_AUDIENCE.to_owned(),
            token_id: Uuid::now_v7(),
            subject_id,
            issued_at: now,
            expires_at,
            kind,
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            self.keys.encoding_key(),
        )
        .map_err(|e| {
            tracing::error!(target: TRACING_TARGET, error = %e, "Failed to sign token");
            Error::internal("session", "failed to sign token").with_source(e)
        })?;

        Ok((token, expires_at))
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, self.keys.decoding_key(), &validation())
            .map_err(|e| {
                tracing::debug!(target: TRACING_TARGET, error = %e, "Token rejected");
                TokenError::from(e)
            })?;
        Ok(data.claims)
    }
}

/// Signature, issuer and audience checks. Expiry is checked separately so
/// that it is reported after a kind mismatch and without leeway.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "iat", "sub", "iss", "aud"]);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation
}
