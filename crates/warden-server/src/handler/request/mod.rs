//! Request types for HTTP handlers.

mod authentication;
mod profile;

pub use authentication::*;
pub use profile::*;
