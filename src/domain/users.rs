//! Canonical forms for user-supplied account fields.

use crate::domain::error::DomainError;

/// Usernames are stored trimmed and lowercased.
pub fn normalize_username(raw: &str) -> Result<String, DomainError> {
    lower_trimmed(raw, "username")
}

/// Nicknames are stored trimmed and lowercased.
pub fn normalize_nickname(raw: &str) -> Result<String, DomainError> {
    lower_trimmed(raw, "nickname")
}

/// Emails are lowercased; an absent email stays absent.
pub fn normalize_email(raw: Option<&str>) -> Option<String> {
    raw.map(str::to_lowercase)
}

pub fn ensure_password(raw: &str) -> Result<(), DomainError> {
    if raw.trim().is_empty() {
        return Err(DomainError::blank("password"));
    }
    Ok(())
}

fn lower_trimmed(raw: &str, field: &'static str) -> Result<String, DomainError> {
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        return Err(DomainError::blank(field));
    }
    Ok(value)
}
