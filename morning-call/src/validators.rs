use email_address::EmailAddress;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::config::UserConfig;
use crate::errors::{ValidationError, ValidationIssue, ValidationResult};
use crate::reason::{Check, NgReason};

/// Dotted-domain shape required on top of RFC parsing.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("email shape pattern should compile")
});

/// Input format checks used by registration.
pub trait InputValidator: Send + Sync {
    fn is_valid_email(&self, value: &str) -> bool;

    fn is_valid_username(&self, value: &str) -> bool;

    fn check_email(&self, value: &str) -> Check {
        if self.is_valid_email(value) { Ok(()) } else { Err(NgReason::InvalidEmail) }
    }

    fn check_username(&self, value: &str) -> Check {
        if self.is_valid_username(value) { Ok(()) } else { Err(NgReason::InvalidUsername) }
    }

    /// Validates and normalises a registration, reporting every bad field.
    fn validate_registration(&self, username: &str, email: &str) -> ValidationResult<(String, String)> {
        let username = normalize_username(username);
        let email = normalize_email(email);
        let mut issues = Vec::new();
        if let Err(reason) = self.check_username(&username) {
            issues.push(ValidationIssue::from_reason("username", reason));
        }
        if let Err(reason) = self.check_email(&email) {
            issues.push(ValidationIssue::from_reason("email", reason));
        }
        if issues.is_empty() { Ok((username, email)) } else { Err(ValidationError::new(issues)) }
    }
}

#[derive(Debug, Clone)]
pub struct DefaultValidator {
    min_username_chars: usize,
    max_username_chars: usize,
}

impl DefaultValidator {
    pub fn new(config: &UserConfig) -> Self {
        Self {
            min_username_chars: config.min_username_chars,
            max_username_chars: config.max_username_chars,
        }
    }
}

impl Default for DefaultValidator {
    fn default() -> Self {
        Self::new(&UserConfig::default())
    }
}

impl InputValidator for DefaultValidator {
    fn is_valid_email(&self, value: &str) -> bool {
        is_valid_email(value)
    }

    fn is_valid_username(&self, value: &str) -> bool {
        self.check_username(value).is_ok()
    }

    fn check_username(&self, value: &str) -> Check {
        let trimmed = value.trim();
        let len = trimmed.chars().count();
        if len < self.min_username_chars {
            return Err(NgReason::UsernameTooShort);
        }
        if len > self.max_username_chars {
            return Err(NgReason::UsernameTooLong);
        }
        if !trimmed.chars().all(is_username_char) {
            return Err(NgReason::InvalidUsername);
        }
        Ok(())
    }
}

/// Returns `true` if the provided string is a syntactically valid email address
/// with a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value) && EMAIL_SHAPE.is_match(value)
}

/// Returns `true` for 2 to 30 characters drawn from the username alphabet.
pub fn is_valid_username(value: &str) -> bool {
    DefaultValidator::default().check_username(value).is_ok()
}

/// ASCII alphanumerics, `_`, `-`, Hiragana, Katakana and common CJK ideographs.
fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '-'
        || ('\u{3040}'..='\u{309F}').contains(&c)
        || ('\u{30A0}'..='\u{30FF}').contains(&c)
        || ('\u{4E00}'..='\u{9FAF}').contains(&c)
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn normalize_username(value: &str) -> String {
    value.trim().to_string()
}

/// Returns `true` if the provided string parses as a UUID.
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}
