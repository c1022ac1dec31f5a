//! Login, logout and current-identity handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::application::access;
use crate::application::error::ServiceError;

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::ApiJson;
use crate::infra::http::api::middleware::Requester;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::{ApiState, SessionCookie};

pub async fn login(
    State(state): State<ApiState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .login(&payload.username, &payload.password)
        .await?;

    let jar = jar.add(session_cookie(&state.cookie, session.token)?);
    Ok((
        jar,
        Json(SessionResponse {
            user_id: session.user_id,
            expires_at: session.expires_at,
        }),
    ))
}

pub async fn logout(
    State(state): State<ApiState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(cookie) = jar.get(&state.cookie.name) {
        state.sessions.logout(cookie.value()).await?;
    }

    let removal = Cookie::build(state.cookie.name.clone()).path("/");
    Ok((jar.remove(removal), StatusCode::NO_CONTENT))
}

pub async fn me(
    State(state): State<ApiState>,
    requester: Requester,
) -> Result<Json<MeResponse>, ApiError> {
    let principal = access::require_authenticated(requester.principal())?;
    let user = state
        .users
        .get(requester.principal(), principal.user_id)
        .await?;

    Ok(Json(MeResponse {
        user: UserResponse::from(user),
        roles: principal.roles.clone(),
    }))
}

fn session_cookie(config: &SessionCookie, token: String) -> Result<Cookie<'static>, ApiError> {
    let max_age = time::Duration::try_from(config.max_age)
        .map_err(|err| ApiError::from(ServiceError::Internal(err.to_string())))?;

    Ok(Cookie::build((config.name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .max_age(max_age)
        .build())
}
