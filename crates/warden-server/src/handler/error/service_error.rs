//! Conversions from service layer errors into HTTP errors.

use super::{Error, ErrorKind};
use crate::ErrorKind as ServiceErrorKind;
use crate::service::TokenError;

const TRACING_TARGET: &str = "warden_server::handler::error";

impl From<crate::Error> for Error<'static> {
    fn from(error: crate::Error) -> Self {
        let kind = error.kind();
        if kind.is_client_error() {
            tracing::debug!(
                target: TRACING_TARGET,
                kind = %kind,
                message = error.message(),
                "Request rejected"
            );
        } else {
            tracing::error!(
                target: TRACING_TARGET,
                kind = %kind,
                error = %error,
                source = ?std::error::Error::source(&error),
                "Service error"
            );
        }

        match kind {
            ServiceErrorKind::Validation => {
                ErrorKind::ValidationError.with_fields(error.into_fields())
            }
            ServiceErrorKind::InvalidPassword => ErrorKind::InvalidPassword
                .with_fields(error.into_fields())
                .with_resource("password"),
            ServiceErrorKind::DuplicateEmail => ErrorKind::DuplicateEmail
                .with_fields(error.into_fields())
                .with_resource("account"),
            // Uniform body regardless of which check failed.
            ServiceErrorKind::InvalidCredentials => ErrorKind::InvalidCredentials.into_error(),
            ServiceErrorKind::Unauthenticated => {
                ErrorKind::Unauthenticated.with_context(error.message().to_owned())
            }
            ServiceErrorKind::NotFound => {
                ErrorKind::NotFound.with_context(error.message().to_owned())
            }
            ServiceErrorKind::Config | ServiceErrorKind::Storage | ServiceErrorKind::Internal => {
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

impl From<TokenError> for Error<'static> {
    fn from(error: TokenError) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            reason = %error,
            "Token rejected"
        );

        ErrorKind::Unauthenticated.with_context(error.to_string())
    }
}
