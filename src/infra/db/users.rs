use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;
use crate::domain::types::Role;

use super::{PostgresRepositories, map_sqlx_error};

const USER_COLUMNS: &str = "id, username, password_hash, nickname, email, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    nickname: String,
    email: Option<String>,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            nickname: row.nickname,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<i64, RepoError> {
        let CreateUserParams {
            username,
            password_hash,
            nickname,
            email,
        } = params;

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, nickname, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(nickname)
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(id)
            .bind(Role::User)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<UserRecord>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn update_nickname(&self, id: i64, nickname: &str) -> Result<u64, RepoError> {
        let result = sqlx::query("UPDATE users SET nickname = $2 WHERE id = $1")
            .bind(id)
            .bind(nickname)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<u64, RepoError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn update_email(&self, id: i64, email: Option<&str>) -> Result<u64, RepoError> {
        let result = sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_user(&self, id: i64) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn list_roles(&self, user_id: i64) -> Result<Vec<Role>, RepoError> {
        sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn grant_role(&self, user_id: i64, role: Role) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
