//! Application-wide error types.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Failure taxonomy shared by every component.
///
/// Component errors map onto one of these so callers can branch on the
/// category without knowing the component that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or missing required input.
    Validation,
    /// Referenced entity absent.
    NotFound,
    /// Valid shape, but violates a business invariant.
    BadRequest,
    /// Role not authorized for the operation.
    Forbidden,
    /// Persistence or unexpected failure.
    Internal,
}

impl ErrorKind {
    /// Returns the machine-readable code for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation error.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable message.
        message: String,
        /// Component-specific code.
        code: &'static str,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable message.
        message: String,
        /// Component-specific code.
        code: &'static str,
    },

    /// Business rule violation.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable message.
        message: String,
        /// Component-specific code.
        code: &'static str,
    },

    /// Access denied.
    #[error("Access denied: {message}")]
    Forbidden {
        /// Human-readable message.
        message: String,
        /// Component-specific code.
        code: &'static str,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable message.
        message: String,
        /// Component-specific code.
        code: &'static str,
    },
}

impl AppError {
    /// Builds an error of the given kind with a component-specific code.
    #[must_use]
    pub fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Validation => Self::Validation { message, code },
            ErrorKind::NotFound => Self::NotFound { message, code },
            ErrorKind::BadRequest => Self::BadRequest { message, code },
            ErrorKind::Forbidden => Self::Forbidden { message, code },
            ErrorKind::Internal => Self::Internal { message, code },
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::BadRequest { .. } => 400,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }

    /// Returns the taxonomy code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns the component-specific code (e.g. `ALREADY_PAID`).
    #[must_use]
    pub const fn detail_code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. }
            | Self::NotFound { code, .. }
            | Self::BadRequest { code, .. }
            | Self::Forbidden { code, .. }
            | Self::Internal { code, .. } => code,
        }
    }

    /// Returns the human-readable message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::BadRequest { message, .. }
            | Self::Forbidden { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }
}
