//! API handlers organized by resource type.
//!
//! Handlers stay thin: extract, call one service operation, shape the JSON.

mod auth;
mod posts;
mod users;

pub use auth::*;
pub use posts::*;
pub use users::*;

use serde::Deserialize;

use crate::application::access;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::ApiJson;
use crate::infra::http::api::middleware::Requester;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub limit: Option<i64>,
}

/// Body of an operation that needs a session. Anonymous callers get
/// `unauthorized` even when the body is malformed too.
fn authenticated_body<T>(
    requester: &Requester,
    body: Result<ApiJson<T>, ApiError>,
) -> Result<T, ApiError> {
    access::require_authenticated(requester.principal())?;
    body.map(|ApiJson(body)| body)
}
