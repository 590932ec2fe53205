//! Database models.

mod account;

pub use account::{Account, NewAccount, UpdateAccount};
