pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::{ApiState, SessionCookie};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::infra::http::middleware::{log_responses, set_request_context};

pub fn build_api_router(state: ApiState) -> Router {
    let session_state = state.clone();

    Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/api/users/{id}/nickname", put(handlers::change_nickname))
        .route("/api/users/{id}/password", put(handlers::change_password))
        .route("/api/users/{id}/email", put(handlers::change_email))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/me", get(handlers::me))
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            session_state,
            middleware::resolve_session,
        ))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
