use async_trait::async_trait;

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::entities::PostRecord;

use super::super::{PostgresRepositories, map_sqlx_error};
use super::POST_COLUMNS;
use super::types::PostRow;

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn list_posts(&self, offset: u64, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        let offset = Self::convert_offset(offset)?;
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2"
        ))
        .bind(offset)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_posts(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn is_owner(&self, post_id: i64, user_id: i64) -> Result<bool, RepoError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1 AND user_id = $2)")
            .bind(post_id)
            .bind(user_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}
