//! Posts handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::posts::{CreatePostCommand, UpdatePostCommand};

use super::{DEFAULT_LIMIT, DEFAULT_PAGE, PostListQuery, authenticated_body};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::infra::http::api::middleware::Requester;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_posts(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<PostListQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = state
        .posts
        .list(
            query.page.unwrap_or(DEFAULT_PAGE),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .await?;

    Ok(Json(PostListResponse::from(page)))
}

pub async fn create_post(
    State(state): State<ApiState>,
    requester: Requester,
    body: Result<ApiJson<PostWriteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = authenticated_body(&requester, body)?;
    let post = state
        .posts
        .create(
            requester.principal(),
            CreatePostCommand {
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

pub async fn get_post(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.posts.get(id).await?;
    Ok(Json(PostResponse::from(post)))
}

pub async fn update_post(
    State(state): State<ApiState>,
    requester: Requester,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<PostWriteRequest>, ApiError>,
) -> Result<Json<PostResponse>, ApiError> {
    let payload = authenticated_body(&requester, body)?;
    let post = state
        .posts
        .update(
            requester.principal(),
            UpdatePostCommand {
                id,
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;

    Ok(Json(PostResponse::from(post)))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    requester: Requester,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.posts.delete(requester.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
