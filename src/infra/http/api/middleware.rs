use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::application::access::Principal;

use super::error::ApiError;
use super::state::ApiState;

/// Resolve the session cookie into a [`Principal`] stored in the request
/// extensions. Requests without a valid session continue anonymously; the
/// operation decides whether that is acceptable.
pub async fn resolve_session(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = CookieJar::from_headers(request.headers())
        .get(&state.cookie.name)
        .map(|cookie| cookie.value().to_string());

    let principal = match token {
        Some(token) => match state.sessions.resolve(&token).await {
            Ok(principal) => principal,
            Err(err) => return ApiError::from(err).into_response(),
        },
        None => None,
    };

    if let Some(principal) = principal.clone() {
        request.extensions_mut().insert(principal);
    }

    let mut response = next.run(request).await;
    if let Some(principal) = principal {
        response.extensions_mut().insert(principal);
    }
    response
}

/// The caller identity, if any, resolved by [`resolve_session`].
#[derive(Debug, Clone)]
pub struct Requester(pub Option<Principal>);

impl Requester {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}
