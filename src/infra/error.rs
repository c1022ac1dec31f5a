//! Failures raised while bootstrapping the process: configuration, database
//! connection and migrations, telemetry and the listener socket.

use thiserror::Error;

/// Startup and runtime-plumbing errors surfaced through `AppError::Infra`.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {message}")]
    Database { message: String },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_subsystem() {
        assert_eq!(
            InfraError::configuration("database url is not configured").to_string(),
            "configuration error: database url is not configured"
        );
        assert_eq!(
            InfraError::database("connection refused").to_string(),
            "database error: connection refused"
        );
    }
}
