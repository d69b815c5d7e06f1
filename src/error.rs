//! Error types for the catalog data layer
//!
//! Provides the normalized failure taxonomy using thiserror.

use serde::Serialize;
use thiserror::Error;

use crate::source::SourceError;

// == Error Code Enum ==
/// Stable identifier for each failure category.
///
/// These are the only codes a caller will ever observe on an error coming
/// out of the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AuthRequired,
    NotFound,
    ApiError,
    UnknownError,
}

impl ErrorCode {
    /// Returns the wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ApiError => "API_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

// == Data Error Enum ==
/// Normalized error raised by every data operation.
///
/// The façade classifies every underlying failure into `AuthRequired`,
/// `NotFound` or `Api` before propagating, so callers can match on the
/// variant (or display `message`/`code`/`status_code` directly) without
/// inspecting message text. `Unknown` is reserved for call sites outside
/// the data layer that need to wrap a failure they did not produce; the
/// façade itself never constructs it.
///
/// Errors are `Clone` because a failed deduplicated fetch delivers the
/// same error to every caller that joined the in-flight request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Underlying fetch was rejected for credential/session reasons
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// The referenced resource does not exist in the remote store
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other underlying-fetch failure (network, malformed response, ...)
    #[error("API error: {0}")]
    Api(String),

    /// Unclassified failure wrapped outside the data layer
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DataError {
    /// Returns the taxonomy code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DataError::AuthRequired(_) => ErrorCode::AuthRequired,
            DataError::NotFound(_) => ErrorCode::NotFound,
            DataError::Api(_) => ErrorCode::ApiError,
            DataError::Unknown(_) => ErrorCode::UnknownError,
        }
    }

    /// Returns the HTTP-style status code associated with this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DataError::AuthRequired(_) => 401,
            DataError::NotFound(_) => 404,
            DataError::Api(_) | DataError::Unknown(_) => 500,
        }
    }

    /// Returns the inner message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            DataError::AuthRequired(msg)
            | DataError::NotFound(msg)
            | DataError::Api(msg)
            | DataError::Unknown(msg) => msg,
        }
    }

    /// Wraps a failure caught outside the façade.
    ///
    /// Intended for UI error boundaries and similar call sites; everything
    /// inside the data layer classifies through [`SourceError`] instead.
    pub fn unknown(message: impl Into<String>) -> Self {
        DataError::Unknown(message.into())
    }
}

// == Classification ==
/// Classification of source-layer failures is an explicit pattern match on
/// the tagged error, never message-text inspection.
impl From<SourceError> for DataError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unauthorized(msg) => DataError::AuthRequired(msg),
            SourceError::MissingResource(msg) => DataError::NotFound(msg),
            SourceError::Transport(msg) | SourceError::Malformed(msg) => DataError::Api(msg),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the data layer.
pub type Result<T> = std::result::Result<T, DataError>;
