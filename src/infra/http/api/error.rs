use crate::application::error::{ErrorReport, ServiceError};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const INTERNAL: &str = "internal";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
}

/// JSON error envelope returned by every API handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Diagnostic recorded in the response log but withheld from the client.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Input the framework could not decode. Client-side failures map to 400
    /// `invalid_request`; anything else is internal.
    fn rejected(status: StatusCode, text: String) -> Self {
        if status.is_server_error() {
            Self::from(ServiceError::Internal(text))
        } else {
            Self::new(StatusCode::BAD_REQUEST, codes::INVALID_REQUEST, text)
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::InvalidRequest(message) => {
                Self::new(StatusCode::BAD_REQUEST, codes::INVALID_REQUEST, message)
            }
            ServiceError::NotFound(message) => {
                Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
            }
            ServiceError::Duplicate(message) => {
                Self::new(StatusCode::CONFLICT, codes::DUPLICATE, message)
            }
            ServiceError::Unauthorized => Self::new(
                StatusCode::UNAUTHORIZED,
                codes::UNAUTHORIZED,
                "authentication required",
            ),
            ServiceError::Forbidden => {
                Self::new(StatusCode::FORBIDDEN, codes::FORBIDDEN, "access denied")
            }
            ServiceError::Unavailable(detail) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::UNAVAILABLE,
                "service temporarily unavailable",
            )
            .with_detail(detail),
            ServiceError::Internal(detail) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL,
                "internal server error",
            )
            .with_detail(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self
            .detail
            .clone()
            .unwrap_or_else(|| self.message.clone());
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {}", self.code, detail),
        )
        .attach(&mut response);
        response
    }
}
