//! Response types for HTTP handlers.

mod account;
mod authentication;
mod error_response;
mod health;

pub use account::*;
pub use authentication::*;
pub use error_response::*;
pub use health::*;
