//! Account use cases. Every read and mutation except registration and login is
//! restricted to the account itself or an admin.

use std::sync::Arc;

use tracing::info;

use crate::application::access::{self, Principal};
use crate::application::credentials::CredentialHasher;
use crate::application::error::ServiceError;
use crate::application::pagination::normalize_limit;
use crate::application::repos::{CreateUserParams, UsersRepo};
use crate::domain::entities::UserRecord;
use crate::domain::error::DomainError;
use crate::domain::types::Role;
use crate::domain::users::{
    ensure_password, normalize_email, normalize_nickname, normalize_username,
};

const SOURCE: &str = "application::users::UserService";

#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UsersRepo>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UsersRepo>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Register a new account and return its id. New accounts hold the
    /// `user` role.
    pub async fn create(&self, command: CreateUserCommand) -> Result<i64, ServiceError> {
        let username = normalize_username(&command.username)?;
        let nickname = normalize_nickname(&command.nickname)?;
        ensure_password(&command.password)?;
        let email = normalize_email(command.email.as_deref());
        let password_hash = self.hasher.hash(&command.password)?;

        let id = self
            .repo
            .create_user(CreateUserParams {
                username,
                password_hash,
                nickname,
                email,
            })
            .await?;

        info!(target = SOURCE, user_id = id, "user registered");
        Ok(id)
    }

    pub async fn get(&self, requester: Option<&Principal>, id: i64) -> Result<UserRecord, ServiceError> {
        access::require_admin_or_self(id, requester)?;
        self.fetch(id).await
    }

    /// Admin-only listing of at most `limit` accounts.
    pub async fn list(
        &self,
        requester: Option<&Principal>,
        limit: i64,
    ) -> Result<Vec<UserRecord>, ServiceError> {
        access::require_admin(requester)?;
        let limit = normalize_limit(limit)?;
        Ok(self.repo.list_users(limit).await?)
    }

    pub async fn change_nickname(
        &self,
        requester: Option<&Principal>,
        id: i64,
        nickname: &str,
    ) -> Result<(), ServiceError> {
        access::require_admin_or_self(id, requester)?;
        let nickname = normalize_nickname(nickname)?;
        let user = self.fetch(id).await?;
        if user.nickname == nickname {
            return Ok(());
        }

        ensure_updated(self.repo.update_nickname(id, &nickname).await?, id)?;
        info!(target = SOURCE, user_id = id, "nickname changed");
        Ok(())
    }

    pub async fn change_password(
        &self,
        requester: Option<&Principal>,
        id: i64,
        password: &str,
    ) -> Result<(), ServiceError> {
        access::require_admin_or_self(id, requester)?;
        ensure_password(password)?;
        let user = self.fetch(id).await?;

        if self.hasher.verify(password, &user.password_hash)? {
            return Err(DomainError::validation("new password must differ from the current one").into());
        }

        let password_hash = self.hasher.hash(password)?;
        ensure_updated(self.repo.update_password(id, &password_hash).await?, id)?;
        info!(target = SOURCE, user_id = id, "password changed");
        Ok(())
    }

    /// Replace the account email; `None` clears it.
    pub async fn change_email(
        &self,
        requester: Option<&Principal>,
        id: i64,
        email: Option<&str>,
    ) -> Result<(), ServiceError> {
        access::require_admin_or_self(id, requester)?;
        let email = normalize_email(email);

        ensure_updated(self.repo.update_email(id, email.as_deref()).await?, id)?;
        info!(target = SOURCE, user_id = id, "email changed");
        Ok(())
    }

    /// Delete the account along with its roles, sessions and posts.
    pub async fn delete(&self, requester: Option<&Principal>, id: i64) -> Result<(), ServiceError> {
        access::require_admin_or_self(id, requester)?;

        ensure_updated(self.repo.delete_user(id).await?, id)?;
        info!(target = SOURCE, user_id = id, "user deleted");
        Ok(())
    }

    /// Check credentials and return the account id.
    ///
    /// An unknown username is [`ServiceError::NotFound`] while a wrong password
    /// is [`ServiceError::InvalidRequest`].
    pub async fn login(&self, username: &str, password: &str) -> Result<i64, ServiceError> {
        let username = normalize_username(username)?;
        let user = self
            .repo
            .find_by_username(&username)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("user not found. username={username}")))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(ServiceError::invalid("password does not match"));
        }

        Ok(user.id)
    }

    pub async fn roles(&self, user_id: i64) -> Result<Vec<Role>, ServiceError> {
        Ok(self.repo.list_roles(user_id).await?)
    }

    /// Grant `role` to the account named `username`. Operator entry point with
    /// no requester check.
    pub async fn grant_role(&self, username: &str, role: Role) -> Result<i64, ServiceError> {
        let username = normalize_username(username)?;
        let user = self
            .repo
            .find_by_username(&username)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("user not found. username={username}")))?;

        self.repo.grant_role(user.id, role).await?;
        info!(target = SOURCE, user_id = user.id, role = %role, "role granted");
        Ok(user.id)
    }

    async fn fetch(&self, id: i64) -> Result<UserRecord, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }
}

fn ensure_updated(rows: u64, id: i64) -> Result<(), ServiceError> {
    if rows == 0 {
        return Err(user_not_found(id));
    }
    Ok(())
}

fn user_not_found(id: i64) -> ServiceError {
    ServiceError::not_found(format!("user not found. id={id}"))
}
