use std::sync::Arc;
use std::time::Duration;

use crate::application::posts::PostService;
use crate::application::sessions::SessionService;
use crate::application::users::UserService;

/// How the session cookie is written back to clients.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
    pub max_age: Duration,
}

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub users: Arc<UserService>,
    pub sessions: Arc<SessionService>,
    pub cookie: Arc<SessionCookie>,
}
