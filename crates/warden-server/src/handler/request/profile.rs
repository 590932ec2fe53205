//! Profile request types.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::service::ProfilePatch;
use crate::{Error, FieldErrors, Result};

/// Request payload for `PATCH /profile` and `PUT /profile`.
///
/// Both methods are partial: an absent `name` leaves it unchanged. An
/// explicit `null` is rejected. Unknown fields, including `email` and `id`,
/// are ignored.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
}

impl UpdateProfile {
    /// Converts the request into a patch, rejecting explicit nulls.
    pub fn into_patch(self) -> Result<ProfilePatch> {
        match self.name {
            Some(None) => {
                let mut fields = FieldErrors::new();
                fields.add("name", "this field may not be null");
                Err(Error::validation(fields))
            }
            Some(Some(name)) => Ok(ProfilePatch { name: Some(name) }),
            None => Ok(ProfilePatch::default()),
        }
    }
}

/// Distinguishes a present `null` (`Some(None)`) from an absent field (`None`).
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request payload for `POST /profile/password`.
#[must_use]
#[derive(Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub current_password: String,

    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn parse(json: &str) -> anyhow::Result<UpdateProfile> {
        Ok(serde_json::from_str(json)?)
    }

    #[test]
    fn absent_name_is_a_no_op() -> anyhow::Result<()> {
        let patch = parse("{}")?.into_patch()?;
        assert_eq!(patch, ProfilePatch::default());
        Ok(())
    }

    #[test]
    fn explicit_null_is_rejected() -> anyhow::Result<()> {
        let error = parse(r#"{"name": null}"#)?.into_patch().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(error.fields().get("name").is_some());
        Ok(())
    }

    #[test]
    fn immutable_fields_are_ignored() -> anyhow::Result<()> {
        let patch = parse(r#"{"name": "Alice", "email": "b@x.io", "id": 9}"#)?.into_patch()?;
        assert_eq!(patch.name.as_deref(), Some("Alice"));
        Ok(())
    }
}
