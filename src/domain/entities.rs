//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::posts::summarize;

/// Number of characters kept by [`PostRecord::summary`] in API responses.
pub const POST_SUMMARY_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub view_count: i64,
    pub comment_count: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl PostRecord {
    pub fn summary(&self, max_chars: usize) -> String {
        summarize(&self.content, max_chars)
    }
}

/// Stored user account. The credential hash stays inside the service layer and
/// is never serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub email: Option<String>,
    pub created_at: OffsetDateTime,
}

impl UserRecord {
    /// Name shown to other users: the nickname, falling back to the username.
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.username
        } else {
            &self.nickname
        }
    }
}
