//! Service layer error types.
//!
//! [`Error`] carries a kind, a human-readable message, optional per-field
//! messages (for validation failures) and an optional source error. The HTTP
//! layer maps each [`ErrorKind`] to a stable response name and status.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use crate::service::TokenError;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of a service layer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input failed shape or format validation.
    Validation,
    /// Password rejected by the password policy.
    InvalidPassword,
    /// Email is already registered.
    DuplicateEmail,
    /// Unknown email, wrong password or inactive account.
    InvalidCredentials,
    /// Missing, invalid or expired token, or an inactive subject.
    Unauthenticated,
    /// Record missing after authentication.
    NotFound,
    /// Invalid configuration.
    Config,
    /// Storage backend failure.
    Storage,
    /// Internal service logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::InvalidPassword => "invalid_password",
            Self::DuplicateEmail => "duplicate_email",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::Config => "config",
            Self::Storage => "storage",
            Self::Internal => "internal_service",
        }
    }

    /// Returns `true` for failures caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Config | Self::Storage | Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages keyed by the (wire) name of the offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty set of field errors.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns the messages recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `true` if no field has an error.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Fails with a validation error if any field has an error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(self))
        }
    }
}

/// Service layer error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    fields: FieldErrors,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: FieldErrors::new(),
            source: None,
        }
    }

    /// Attaches a source error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attaches a message for a single field.
    #[inline]
    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields.add(field, message);
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the per-field messages.
    #[must_use]
    #[inline]
    pub fn fields(&self) -> &FieldErrors {
        &self.fields
    }

    /// Consumes the error, returning the per-field messages.
    #[must_use]
    pub fn into_fields(self) -> FieldErrors {
        self.fields
    }

    /// Returns the token failure behind an `Unauthenticated` error, if any.
    #[must_use]
    pub fn token_error(&self) -> Option<TokenError> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<TokenError>())
            .copied()
    }

    /// Creates a validation error from per-field messages.
    pub fn validation(fields: FieldErrors) -> Self {
        Self {
            fields,
            ..Self::new(ErrorKind::Validation, "request validation failed")
        }
    }

    /// Creates a password policy error from per-field messages.
    pub fn invalid_password(fields: FieldErrors) -> Self {
        Self {
            fields,
            ..Self::new(
                ErrorKind::InvalidPassword,
                "password does not satisfy the password policy",
            )
        }
    }

    /// Creates a duplicate email error.
    pub fn duplicate_email() -> Self {
        Self::new(
            ErrorKind::DuplicateEmail,
            "an account with this email already exists",
        )
        .with_field("email", "an account with this email already exists")
    }

    /// Creates the uniform credential failure.
    ///
    /// Deliberately identical for unknown emails, wrong passwords and
    /// inactive accounts.
    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorKind::InvalidCredentials,
            "no active account found with the given credentials",
        )
    }

    /// Creates an authentication error.
    #[inline]
    pub fn unauthenticated(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Creates a not found error for the named resource.
    #[inline]
    pub fn not_found(resource: impl Into<Cow<'static, str>>) -> Self {
        let resource = resource.into();
        Self::new(ErrorKind::NotFound, format!("{resource} not found"))
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a storage backend error.
    #[inline]
    pub fn storage(
        backend: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(
            ErrorKind::Storage,
            format!("{}: {}", backend.into(), message.into()),
        )
    }

    /// Creates a new internal service error.
    #[inline]
    pub fn internal(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(
            ErrorKind::Internal,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}
