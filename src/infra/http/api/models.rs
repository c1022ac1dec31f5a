use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::application::pagination::OffsetPage;
use crate::domain::entities::{POST_SUMMARY_CHARS, PostRecord, UserRecord};

#[derive(Debug, Deserialize, Serialize)]
pub struct PostWriteRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserCreateRequest {
    pub username: String,
    pub password: String,
    pub nickname: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NicknameRequest {
    pub nickname: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub view_count: i64,
    pub comments_cnt: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<PostRecord> for PostResponse {
    fn from(post: PostRecord) -> Self {
        Self {
            summary: post.summary(POST_SUMMARY_CHARS),
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            view_count: post.view_count,
            comments_cnt: post.comment_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub items: Vec<PostResponse>,
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl From<OffsetPage<PostRecord>> for PostListResponse {
    fn from(page: OffsetPage<PostRecord>) -> Self {
        let page = page.map(PostResponse::from);
        Self {
            items: page.items,
            page: page.page,
            limit: page.limit,
            total_count: page.total_count,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub display_name: String,
    pub email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            display_name: user.display_name().to_string(),
            id: user.id,
            username: user.username,
            nickname: user.nickname,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: UserResponse,
    pub roles: Vec<crate::domain::types::Role>,
}
