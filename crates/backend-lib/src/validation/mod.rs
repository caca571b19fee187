// ============================
// scribe-backend-lib/src/validation/mod.rs
// ============================
//! Credential format validation.
//!
//! These are presentation-layer guards run before any store access; the
//! store's own constraints stay authoritative.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::AppError;

// Common validation constants
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 31;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 255;
const MAX_EMAIL_LENGTH: usize = 255;

// Regex patterns for validation
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("static regex"));
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"));

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email address format")]
    InvalidEmail,

    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

/// Result type for validation operations
pub type ValidationResult = Result<(), ValidationError>;

/// Validate a username: 3-31 chars of lowercase alphanumerics, `_` or `-`.
pub fn validate_username(username: &str) -> ValidationResult {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "only lowercase letters, digits, '_' and '-' are allowed".to_string(),
        ));
    }
    Ok(())
}

/// Validate an email address: simple local@domain shape, no whitespace,
/// at most 255 chars.
pub fn validate_email(email: &str) -> ValidationResult {
    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validate a password's length bounds.
pub fn validate_password(password: &str) -> ValidationResult {
    if password.len() < MIN_PASSWORD_LENGTH || password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "must be {MIN_PASSWORD_LENGTH}-{MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Combined email/password format guard for login forms.
pub fn credentials_format_ok(email: &str, password: &str) -> bool {
    validate_email(email).is_ok() && validate_password(password).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(31)).is_ok());
        assert!(validate_username(&"a".repeat(32)).is_err());
    }

    #[test]
    fn test_username_alphabet() {
        assert!(validate_username("alice_01-x").is_ok());
        assert!(validate_username("Alice").is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("alice!").is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("has space@example.com").is_err());
        assert!(validate_email("missing@tld").is_err());

        let long_local = "a".repeat(250);
        assert!(validate_email(&format!("{long_local}@example.com")).is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"p".repeat(255)).is_ok());
        assert!(validate_password(&"p".repeat(256)).is_err());
    }

    #[test]
    fn test_credentials_format_ok() {
        assert!(credentials_format_ok("alice@example.com", "secret1"));
        assert!(!credentials_format_ok("alice@example.com", "short"));
        assert!(!credentials_format_ok("alice", "secret1"));
    }

    #[test]
    fn test_validation_error_maps_to_invalid_input() {
        let err: AppError = ValidationError::InvalidEmail.into();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
