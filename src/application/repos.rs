//! Repository traits describing persistence adapters.

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::entities::{PostRecord, UserRecord};
use crate::domain::types::Role;

/// Unique constraint reported by the store when an insert or update collides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueKey {
    Username,
    Email,
    Other(String),
}

impl Display for UniqueKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Email => f.write_str("email"),
            Self::Other(constraint) => f.write_str(constraint),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique key `{key}`")]
    Duplicate { key: UniqueKey },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: i64,
    pub title: String,
    pub content: String,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;

    /// Newest first.
    async fn list_posts(&self, offset: u64, limit: u32) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_posts(&self) -> Result<u64, RepoError>;

    async fn is_owner(&self, post_id: i64, user_id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    /// Inserts the post and returns the stored row, including storage defaults.
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    /// Increments the view counter and returns the updated row in one atomic
    /// step. `None` means no row matched `id`.
    async fn increase_view_count(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;

    /// `None` means no row matched `params.id`.
    async fn update_post(&self, params: UpdatePostParams) -> Result<Option<PostRecord>, RepoError>;

    /// Returns the number of rows removed.
    async fn delete_post(&self, id: i64) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub email: Option<String>,
}

/// User persistence. Update and delete methods return the number of affected
/// rows; uniqueness violations surface as [`RepoError::Duplicate`].
#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// Inserts the account together with the default [`Role::User`] grant.
    async fn create_user(&self, params: CreateUserParams) -> Result<i64, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn list_users(&self, limit: u32) -> Result<Vec<UserRecord>, RepoError>;

    async fn update_nickname(&self, id: i64, nickname: &str) -> Result<u64, RepoError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<u64, RepoError>;

    async fn update_email(&self, id: i64, email: Option<&str>) -> Result<u64, RepoError>;

    async fn delete_user(&self, id: i64) -> Result<u64, RepoError>;

    async fn list_roles(&self, user_id: i64) -> Result<Vec<Role>, RepoError>;

    /// Idempotent: granting a role the user already holds is not an error.
    async fn grant_role(&self, user_id: i64, role: Role) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub token_hash: Vec<u8>,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn create_session(&self, session: NewSession) -> Result<(), RepoError>;

    /// Owner of the session identified by `token_hash`, unless it expired
    /// before `now`.
    async fn find_active_session(
        &self,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> Result<Option<i64>, RepoError>;

    async fn delete_session(&self, token_hash: &[u8]) -> Result<u64, RepoError>;

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError>;
}
