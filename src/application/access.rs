//! Requester identity and the ownership predicates guarding mutations.
//!
//! Every guarded operation resolves its access decision here before touching
//! storage: no requester is [`ServiceError::Unauthorized`], an admin or a
//! requester satisfying the resource predicate passes, anyone else is
//! [`ServiceError::Forbidden`].

use crate::{
    application::{
        error::ServiceError,
        repos::{PostsRepo, RepoError},
    },
    domain::types::Role,
};

/// Authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(user_id: i64, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// True when `requester` is the account identified by `target_user_id`.
pub fn is_self(target_user_id: i64, requester: Option<&Principal>) -> bool {
    requester.is_some_and(|principal| principal.user_id == target_user_id)
}

/// True when `requester` authored `post_id`. An absent requester or a missing
/// post is simply not an owner.
pub async fn is_owner(
    posts: &dyn PostsRepo,
    post_id: i64,
    requester: Option<&Principal>,
) -> Result<bool, RepoError> {
    match requester {
        Some(principal) => posts.is_owner(post_id, principal.user_id).await,
        None => Ok(false),
    }
}

pub fn require_authenticated(requester: Option<&Principal>) -> Result<&Principal, ServiceError> {
    requester.ok_or(ServiceError::Unauthorized)
}

/// Admin-or-`permitted` gate.
pub fn authorize(requester: Option<&Principal>, permitted: bool) -> Result<&Principal, ServiceError> {
    let principal = require_authenticated(requester)?;
    if principal.is_admin() || permitted {
        Ok(principal)
    } else {
        Err(ServiceError::Forbidden)
    }
}

pub fn require_admin(requester: Option<&Principal>) -> Result<&Principal, ServiceError> {
    authorize(requester, false)
}

/// Admin-or-self gate for account operations.
pub fn require_admin_or_self(
    target_user_id: i64,
    requester: Option<&Principal>,
) -> Result<&Principal, ServiceError> {
    authorize(requester, is_self(target_user_id, requester))
}
