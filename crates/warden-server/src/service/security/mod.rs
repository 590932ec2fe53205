//! Security services: password hashing, the password policy and the keys
//! used to sign session tokens.

mod password_hasher;
mod password_policy;
mod session_keys;

pub use password_hasher::{Argon2Costs, PasswordHasher};
pub use password_policy::PasswordPolicy;
pub use session_keys::SessionKeys;
