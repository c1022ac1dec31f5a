//! Posts-and-users REST backend with cookie sessions and ownership-based
//! authorization.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
