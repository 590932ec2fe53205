//! Field normalization and validation shared by registration and profile
//! updates.

use validator::ValidateEmail;

/// Maximum email length in characters.
pub const EMAIL_MAX_LENGTH: usize = 254;
/// Maximum display name length in characters.
pub const NAME_MAX_LENGTH: usize = 255;

/// Trims and lower-cases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks an already normalized email.
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("this field may not be blank");
    }
    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Err("ensure this field has no more than 254 characters");
    }
    if !email.validate_email() {
        return Err("enter a valid email address");
    }
    Ok(())
}

/// Trims a display name and checks it is non-blank and within bounds.
pub fn validate_display_name(name: &str) -> Result<String, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("this field may not be blank");
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err("ensure this field has no more than 255 characters");
    }
    Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Alice@Example.COM\n"), "alice@example.com");
    }

    #[test]
    fn validates_email_format() {
        assert!(validate_email("alice@example.com").is_ok());
        assert_eq!(validate_email(""), Err("this field may not be blank"));
        assert_eq!(validate_email("not-an-email"), Err("enter a valid email address"));

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn display_name_is_trimmed() {
        assert_eq!(validate_display_name("  Alice  "), Ok("Alice".to_owned()));
    }

    #[test]
    fn display_name_bounds() {
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(255)).is_ok());
        assert!(validate_display_name(&"x".repeat(256)).is_err());
    }
}
