//! Fatal export errors.
//!
//! Recoverable problems are reported as [`frapack_model::ExportWarning`]s and
//! never surface here.

use frapack_backend_atlas::PngError;
use thiserror::Error;

/// An export that could not produce a container.
#[derive(Debug, Error)]
pub enum ExportError {
    /// An internal invariant of the container layout did not hold.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// A sheet could not be encoded.
    #[error("sheet encoding failed: {0}")]
    Png(#[from] PngError),

    /// The header could not be converted to JSON.
    #[error("header JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The async runtime for media decoding could not be started.
    #[error("failed to start decode runtime: {0}")]
    Runtime(String),
}

/// Errors from reading a resource container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container truncated: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("header is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("header is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("header is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
