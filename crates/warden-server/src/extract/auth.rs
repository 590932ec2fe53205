//! Bearer token authentication.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::handler::{Error, ErrorKind};
use crate::service::{AccountId, SessionIssuer, TokenKind};

const TRACING_TARGET: &str = "warden_server::extract::auth";

/// Accepted `Authorization` schemes, matched case-insensitively.
const AUTH_SCHEMES: [&str; 2] = ["Bearer", "JWT"];

/// The account id carried by a valid access token.
///
/// Extracted from `Authorization: Bearer <token>` (or the `JWT` scheme).
/// Only the token is checked here; whether the account still exists and is
/// active is up to the service being called. The result is cached in the
/// request extensions.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSubject(pub AccountId);

impl AuthSubject {
    /// Returns the account id.
    #[inline]
    pub fn account_id(self) -> AccountId {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthSubject
where
    SessionIssuer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(subject) = parts.extensions.get::<Self>() {
            return Ok(*subject);
        }

        let session_issuer = SessionIssuer::from_ref(state);
        let token = bearer_token(&parts.headers)?;
        let account_id = session_issuer
            .validate(token, TokenKind::Access)
            .map_err(Error::from)?;

        tracing::trace!(target: TRACING_TARGET, account_id, "Request authenticated");

        let subject = Self(account_id);
        parts.extensions.insert(subject);
        Ok(subject)
    }
}

/// Returns the token from an `Authorization: <scheme> <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, Error<'static>> {
    let header = headers.get(AUTHORIZATION).ok_or_else(|| {
        ErrorKind::Unauthenticated.with_context("authentication credentials were not provided")
    })?;

    let value = header.to_str().map_err(|_| {
        ErrorKind::Unauthenticated.with_context("authorization header is not valid ASCII")
    })?;

    let (scheme, token) = value.trim().split_once(' ').ok_or_else(|| {
        ErrorKind::Unauthenticated.with_context("authorization header must be '<scheme> <token>'")
    })?;

    if !AUTH_SCHEMES
        .iter()
        .any(|accepted| scheme.eq_ignore_ascii_case(accepted))
    {
        return Err(ErrorKind::Unauthenticated
            .with_context("authorization scheme must be 'Bearer' or 'JWT'"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ErrorKind::Unauthenticated.with_context("authorization token is empty"));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn accepts_both_schemes_case_insensitively() {
        assert_eq!(bearer_token(&headers("Bearer abc")).ok(), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")).ok(), Some("abc"));
        assert_eq!(bearer_token(&headers("JWT abc")).ok(), Some("abc"));
        assert_eq!(bearer_token(&headers("jwt  abc ")).ok(), Some("abc"));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        for value in ["Basic abc", "Bearer", "Bearer    ", "abc"] {
            let error = bearer_token(&headers(value)).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Unauthenticated, "{value:?}");
        }

        let error = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthenticated);
    }
}
