//! Shared database types.

mod constraints;

pub use constraints::{AccountConstraints, ConstraintCategory};
