pub mod api;
mod middleware;

pub use api::{ApiState, SessionCookie, build_api_router};
