//! Post input normalization.

use crate::domain::error::DomainError;

/// Trim a post title, rejecting titles that are blank after trimming.
pub fn normalize_title(raw: &str) -> Result<String, DomainError> {
    non_blank(raw, "title")
}

/// Trim post content, rejecting content that is blank after trimming.
pub fn normalize_content(raw: &str) -> Result<String, DomainError> {
    non_blank(raw, "content")
}

/// Reject blank content while keeping it byte-for-byte as submitted.
pub fn ensure_content(raw: &str) -> Result<(), DomainError> {
    non_blank(raw, "content").map(|_| ())
}

/// First `max_chars` characters of `content`, with `...` appended when cut.
pub fn summarize(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

fn non_blank(raw: &str, field: &'static str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::blank(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(normalize_title("  Hello world \n").unwrap(), "Hello world");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(normalize_title("   "), Err(DomainError::blank("title")));
    }

    #[test]
    fn content_check_does_not_rewrite() {
        assert!(ensure_content("  body  ").is_ok());
        assert_eq!(ensure_content("\n\t"), Err(DomainError::blank("content")));
        assert_eq!(normalize_content("  body  ").unwrap(), "body");
    }

    #[test]
    fn summary_cuts_on_character_boundaries() {
        assert_eq!(summarize("crème brûlée", 5), "crème...");
        assert_eq!(summarize("short", 5), "short");
        assert_eq!(summarize("", 5), "");
    }
}
