use async_trait::async_trait;

use crate::application::repos::{CreatePostParams, PostsWriteRepo, RepoError, UpdatePostParams};
use crate::domain::entities::PostRecord;

use super::super::{PostgresRepositories, map_sqlx_error};
use super::POST_COLUMNS;
use super::types::PostRow;

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let CreatePostParams {
            user_id,
            title,
            content,
        } = params;

        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn increase_view_count(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET view_count = view_count + 1
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<Option<PostRecord>, RepoError> {
        let UpdatePostParams { id, title, content } = params;

        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn delete_post(&self, id: i64) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
