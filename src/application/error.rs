use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{
    application::{
        credentials::CredentialError,
        pagination::PaginationError,
        repos::{RepoError, UniqueKey},
    },
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Diagnostic chain attached to error responses so the logging middleware can
/// record the full cause without leaking it to clients.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure taxonomy shared by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("access denied")]
    Forbidden,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<DomainError> for ServiceError {
    fn from(error: DomainError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}

impl From<PaginationError> for ServiceError {
    fn from(error: PaginationError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}

impl From<CredentialError> for ServiceError {
    fn from(error: CredentialError) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<RepoError> for ServiceError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::Duplicate { key } => Self::Duplicate(
                match key {
                    UniqueKey::Username => "username already exists",
                    UniqueKey::Email => "email already exists",
                    UniqueKey::Other(_) => "duplicate value",
                }
                .to_string(),
            ),
            RepoError::NotFound => Self::NotFound("resource not found".to_string()),
            RepoError::InvalidInput { message } => Self::InvalidRequest(message),
            RepoError::Timeout => Self::Unavailable(error.to_string()),
            RepoError::Persistence(_) | RepoError::Integrity { .. } => {
                Self::Internal(error.to_string())
            }
        }
    }
}

/// Top-level failure of a CLI command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_map_to_field_messages() {
        let cases = [
            (UniqueKey::Username, "username already exists"),
            (UniqueKey::Email, "email already exists"),
            (UniqueKey::Other("posts_pkey".into()), "duplicate value"),
        ];
        for (key, expected) in cases {
            match ServiceError::from(RepoError::Duplicate { key }) {
                ServiceError::Duplicate(message) => assert_eq!(message, expected),
                other => panic!("unexpected mapping: {other:?}"),
            }
        }
    }

    #[test]
    fn timeouts_are_reported_as_unavailable() {
        assert!(matches!(
            ServiceError::from(RepoError::Timeout),
            ServiceError::Unavailable(_)
        ));
    }

    #[test]
    fn attached_report_is_readable_from_the_response() {
        let mut response = Response::new(axum::body::Body::empty());
        ErrorReport::from_message("test", StatusCode::FORBIDDEN, "access denied").attach(&mut response);
        let report = response.extensions().get::<ErrorReport>().expect("report");
        assert_eq!(report.status, StatusCode::FORBIDDEN);
        assert_eq!(report.messages, vec!["access denied".to_string()]);
    }
}
