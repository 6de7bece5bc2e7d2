// Error types for the Switchyard framework

use crate::HttpStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Registration-time errors
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Invalid route pattern '{pattern}' (compiled as '{compiled}'): {reason}")]
    InvalidPattern {
        pattern: String,
        compiled: String,
        reason: String,
    },

    #[error("Route '{key}' cannot be added: ancestor '{ancestor}' is not registered")]
    MissingAncestor { key: String, ancestor: String },

    #[error("Invalid route registry: {0}")]
    InvalidRegistry(String),

    // Dispatch-time errors
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed ({code}): {message}")]
    Validation { code: u16, message: String },

    #[error("Loop Detected: {0}")]
    LoopDetected(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("{message}")]
    Status { code: u16, message: String },
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) | Error::NotFound(_) => HttpStatus::NotFound.code(),
            Error::Forbidden(_) => HttpStatus::Forbidden.code(),
            Error::Validation { code, .. } => *code,
            Error::LoopDetected(_) => HttpStatus::LoopDetected.code(),
            Error::Status { code, .. } => *code,

            // Registration problems surface as server faults if they ever reach a request
            Error::InvalidRoute(_)
            | Error::InvalidPattern { .. }
            | Error::MissingAncestor { .. }
            | Error::InvalidRegistry(_)
            | Error::Internal(_) => HttpStatus::InternalServerError.code(),
        }
    }

    /// Get the HttpStatus enum for this error
    pub fn http_status(&self) -> HttpStatus {
        HttpStatus::from_code(self.status_code()).unwrap_or(HttpStatus::InternalServerError)
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    /// Whether the error was raised while building routes rather than serving them.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRoute(_)
                | Error::InvalidPattern { .. }
                | Error::MissingAncestor { .. }
                | Error::InvalidRegistry(_)
        )
    }
}
