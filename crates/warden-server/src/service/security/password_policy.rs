//! Password acceptance rules applied on registration and password change.

use crate::{Error, FieldErrors, Result};

/// Minimum length, maximum length and similarity rules for new passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
    max_length: usize,
}

impl PasswordPolicy {
    /// Default minimum number of characters.
    pub const DEFAULT_MIN_LENGTH: usize = 8;
    /// Upper bound on the number of characters.
    pub const MAX_LENGTH: usize = 128;

    /// Creates a policy with the given minimum length.
    ///
    /// The minimum is clamped to `1..=MAX_LENGTH`.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length: min_length.clamp(1, Self::MAX_LENGTH),
            max_length: Self::MAX_LENGTH,
        }
    }

    /// Returns the minimum number of characters.
    #[inline]
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Lists every rule the password breaks, in a stable order.
    pub fn violations(&self, password: &str, email: &str) -> Vec<String> {
        let mut violations = Vec::new();
        let length = password.chars().count();

        if password.trim().is_empty() {
            violations.push("this field may not be blank".to_owned());
            return violations;
        }

        if length < self.min_length {
            violations.push(format!(
                "this password is too short; it must contain at least {} characters",
                self.min_length
            ));
        }

        if length > self.max_length {
            violations.push(format!(
                "this password is too long; it must contain at most {} characters",
                self.max_length
            ));
        }

        if password.chars().all(|c| c.is_ascii_digit()) {
            violations.push("this password is entirely numeric".to_owned());
        }

        if is_similar_to_email(password, email) {
            violations.push("this password is too similar to the email address".to_owned());
        }

        violations
    }

    /// Fails with [`ErrorKind::InvalidPassword`] listing every violated rule.
    ///
    /// [`ErrorKind::InvalidPassword`]: crate::ErrorKind::InvalidPassword
    pub fn check(&self, password: &str, email: &str) -> Result<()> {
        let violations = self.violations(password, email);
        if violations.is_empty() {
            return Ok(());
        }

        let mut fields = FieldErrors::new();
        for violation in violations {
            fields.add("password", violation);
        }

        Err(Error::invalid_password(fields))
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_LENGTH)
    }
}

fn is_similar_to_email(password: &str, email: &str) -> bool {
    let password = password.to_lowercase();
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return false;
    }

    let local_part = email.split('@').next().unwrap_or_default();
    password == email || (!local_part.is_empty() && password == local_part)
}
