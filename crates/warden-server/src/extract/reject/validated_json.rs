//! JSON extractor that also runs `validator` rules.

use std::borrow::Cow;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::FieldErrors;
use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "warden_server::extract::validated_json";

/// [`Json`] followed by [`Validate::validate`].
///
/// Validation failures become a 400 `validation_error` whose `errors` map is
/// keyed by the camelCase wire name of each field.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Creates a new instance of [`ValidateJson`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self::new(data))
    }
}

/// Uses the custom message if present, otherwise one derived from the code.
fn format_validation_error(error: &ValidationError) -> Cow<'static, str> {
    if let Some(message) = &error.message {
        return message.clone();
    }

    match error.code.as_ref() {
        "required" => "this field is required".into(),
        "email" => "enter a valid email address".into(),
        "length" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => format!("length must be between {min} and {max}").into(),
            (Some(min), None) => format!("length must be at least {min}").into(),
            (None, Some(max)) => format!("length must be at most {max}").into(),
            _ => "invalid length".into(),
        },
        code => format!("failed validation: {code}").into(),
    }
}

/// `current_password` -> `currentPassword`.
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let field = to_camel_case(&field);
            for error in field_errors {
                fields.add(field.clone(), format_validation_error(error));
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            errors = ?fields,
            "Request validation failed"
        );

        ErrorKind::ValidationError
            .with_resource("request")
            .with_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(email)]
        email_address: String,
        #[validate(length(min = 1, message = "this field may not be blank"))]
        new_password: String,
    }

    #[test]
    fn field_names_are_camel_cased() {
        assert_eq!(to_camel_case("current_password"), "currentPassword");
        assert_eq!(to_camel_case("email"), "email");
    }

    #[test]
    fn validation_errors_become_field_errors() {
        let sample = Sample {
            email_address: "nope".to_owned(),
            new_password: String::new(),
        };
        let error = Error::from(sample.validate().unwrap_err());
        let fields = error.fields().cloned().unwrap_or_default();

        assert_eq!(error.kind(), ErrorKind::ValidationError);
        assert_eq!(
            fields.get("emailAddress"),
            Some(&["enter a valid email address".to_owned()][..])
        );
        assert_eq!(
            fields.get("newPassword"),
            Some(&["this field may not be blank".to_owned()][..])
        );
    }
}
