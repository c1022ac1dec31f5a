//! Users handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::users::CreateUserCommand;

use super::{DEFAULT_LIMIT, UserListQuery, authenticated_body};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::infra::http::api::middleware::Requester;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn create_user(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<UserCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .users
        .create(CreateUserCommand {
            username: payload.username,
            password: payload.password,
            nickname: payload.nickname,
            email: payload.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn list_users(
    State(state): State<ApiState>,
    requester: Requester,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state
        .users
        .list(requester.principal(), query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<ApiState>,
    requester: Requester,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get(requester.principal(), id).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn change_nickname(
    State(state): State<ApiState>,
    requester: Requester,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<NicknameRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let payload = authenticated_body(&requester, body)?;
    state
        .users
        .change_nickname(requester.principal(), id, &payload.nickname)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<ApiState>,
    requester: Requester,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<PasswordRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let payload = authenticated_body(&requester, body)?;
    state
        .users
        .change_password(requester.principal(), id, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_email(
    State(state): State<ApiState>,
    requester: Requester,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<EmailRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let payload = authenticated_body(&requester, body)?;
    state
        .users
        .change_email(requester.principal(), id, payload.email.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<ApiState>,
    requester: Requester,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.users.delete(requester.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
