//! Error and warning types for project loading and export.

use thiserror::Error;

/// Warning codes for recoverable export problems.
///
/// Warnings never abort an export. The affected construct is skipped,
/// substituted, or clamped and the export continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: A layer, keyframe, or symbol id was not found
    MissingReference,
    /// W002: A referenced image asset is absent; a placeholder was used
    MissingAsset,
    /// W003: Trimmed bounds exceed the maximum sheet dimension
    OversizedAsset,
    /// W004: Media decode did not finish within the timeout
    DecodeTimeout,
    /// W005: Media decode failed
    DecodeFailed,
    /// W006: A keyframe references a symbol of a different kind
    SymbolTypeMismatch,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::MissingReference => "W001",
            WarningCode::MissingAsset => "W002",
            WarningCode::OversizedAsset => "W003",
            WarningCode::DecodeTimeout => "W004",
            WarningCode::DecodeFailed => "W005",
            WarningCode::SymbolTypeMismatch => "W006",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A recoverable problem encountered during export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
}

impl ExportWarning {
    /// Creates a new export warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Errors from loading project documents.
#[derive(Debug, Error)]
pub enum ModelError {
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from reading the resource manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No script asset with the manifest id exists.
    #[error("project has no script asset with id '{0}'")]
    Missing(String),

    /// The manifest script is not valid manifest JSON.
    #[error("problem parsing manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// The manifest parsed but names no resource.
    #[error("manifest has an empty resourceId")]
    EmptyResourceId,
}
