use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{NewSession, RepoError, SessionsRepo};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl SessionsRepo for PostgresRepositories {
    async fn create_session(&self, session: NewSession) -> Result<(), RepoError> {
        let NewSession {
            token_hash,
            user_id,
            expires_at,
        } = session;

        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_active_session(
        &self,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> Result<Option<i64>, RepoError> {
        sqlx::query_scalar("SELECT user_id FROM sessions WHERE token_hash = $1 AND expires_at > $2")
            .bind(token_hash)
            .bind(now)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
