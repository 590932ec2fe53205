//! HTTP errors and their conversions from service errors.

mod http_error;
mod service_error;

pub use http_error::{Error, ErrorKind, Result};
