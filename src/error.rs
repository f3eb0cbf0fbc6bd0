//! Error types for the relay server and the uppercase copier.
//!
//! [`RelayError`] covers the server side and maps to an HTTP status code
//! with a structured JSON body. [`CopyError`] covers the file pipeline;
//! it never reaches a network client.

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "Error loading index.html"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Relay server error.
///
/// | Code | Category      | HTTP Status               |
/// |------|---------------|---------------------------|
/// | 1001 | Configuration | 500 Internal Server Error |
/// | 3000 | Server        | 500 Internal Server Error |
/// | 3001 | Static page   | 500 Internal Server Error |
/// | 3002 | File watcher  | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// An environment variable held an unusable value.
    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// The page served at `/` could not be read.
    #[error("Error loading index.html")]
    IndexUnavailable {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file watcher could not be installed.
    #[error("cannot watch {}: {source}", path.display())]
    Watch {
        /// Path that was to be watched.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },

    /// A frame could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Socket-level I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidConfig { .. } => 1001,
            Self::Serialization(_) | Self::Io(_) => 3000,
            Self::IndexUnavailable { .. } => 3001,
            Self::Watch { .. } => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Uppercase copier error.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// The source file does not exist.
    #[error("The file {} does not exist.", .0.display())]
    SourceMissing(PathBuf),

    /// Reading the source failed.
    #[error("Error while reading {}: {source}", path.display())]
    Read {
        /// Source path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Creating or writing the destination failed.
    #[error("Error while writing {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CopyError {
    /// Attaches file paths to a pipeline failure.
    #[must_use]
    pub fn from_stream(err: StreamError, source: &Path, dest: &Path) -> Self {
        match err {
            StreamError::Read(err) => Self::Read {
                path: source.to_path_buf(),
                source: err,
            },
            StreamError::Write(err) => Self::Write {
                path: dest.to_path_buf(),
                source: err,
            },
        }
    }
}

/// Failure inside the read → transform → write loop.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The reader failed.
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),
    /// The writer failed.
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
}
