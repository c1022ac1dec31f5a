//! Application services layer.

pub mod access;
pub mod credentials;
pub mod error;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod sessions;
pub mod users;
