//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password. The auth provider enforces its own policy too; this
/// rejects obviously weak passwords before an identity is created.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}

/// Validate a required display name and return it trimmed
pub fn validate_display_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Display name is required".to_string());
    }
    if name.chars().count() > 80 {
        return Err("Display name must be at most 80 characters long".to_string());
    }
    Ok(name.to_string())
}

/// Validate a program name and return it trimmed
pub fn validate_program_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Program name is required".to_string());
    }
    if name.chars().count() > 120 {
        return Err("Program name must be at most 120 characters long".to_string());
    }
    Ok(name.to_string())
}

/// Normalise an email for lookups and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("coach@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("coach@").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
    }

    #[test]
    fn test_password() {
        assert!(validate_password("abcdefg1").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("allletters").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password(&"a1".repeat(65)).is_err());
    }

    #[test]
    fn test_names_are_trimmed() {
        assert_eq!(validate_display_name("  Sam  ").unwrap(), "Sam");
        assert!(validate_display_name("   ").is_err());
        assert_eq!(validate_program_name(" Strength Block ").unwrap(), "Strength Block");
        assert!(validate_program_name("").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Coach@Example.COM "), "coach@example.com");
    }
}
