use crate::application::repos::{RepoError, UniqueKey};

pub(crate) const USERS_USERNAME_KEY: &str = "users_username_key";
pub(crate) const USERS_EMAIL_KEY: &str = "users_email_key";

/// SQLSTATE `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Duplicate {
            key: unique_key(db.constraint()),
        },
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepoError::InvalidInput {
            message: db.message().to_string(),
        },
        sqlx::Error::Database(db) if db.is_check_violation() => RepoError::Integrity {
            message: db.message().to_string(),
        },
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            RepoError::Timeout
        }
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        other => RepoError::from_persistence(other),
    }
}

pub(crate) fn unique_key(constraint: Option<&str>) -> UniqueKey {
    match constraint {
        Some(USERS_USERNAME_KEY) => UniqueKey::Username,
        Some(USERS_EMAIL_KEY) => UniqueKey::Email,
        Some(other) => UniqueKey::Other(other.to_string()),
        None => UniqueKey::Other("unknown".to_string()),
    }
}
