//! Request extractors with handler-style rejections.
//!
//! - [`AuthSubject`] - account id from a validated access token
//! - [`Json`] - JSON body with `validation_error` rejections
//! - [`ValidateJson`] - JSON body checked with `validator` rules

mod auth;
pub mod reject;

pub use crate::extract::auth::AuthSubject;
pub use crate::extract::reject::{Json, ValidateJson};
