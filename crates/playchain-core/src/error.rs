//! Error types for Playchain Core

use crate::types::BackendKind;
use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error types
#[derive(Error, Debug)]
pub enum Error {
    // Request errors
    #[error("Empty playback URL")]
    EmptyUrl,

    // Session errors
    #[error("Session already holds a {0} instance")]
    SessionOccupied(BackendKind),

    #[error("Invalid orchestrator state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "headless")]
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a single attempt failed.
///
/// None of these escape the fallback orchestrator; they only decide whether
/// the next attempt in the plan gets its turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Capability check failed before anything was created
    #[error("{backend} not supported")]
    UnsupportedBackend { backend: BackendKind },

    /// Backend reported an unrecoverable stream error
    #[error("{backend} fatal error: {detail}")]
    BackendFatal { backend: BackendKind, detail: String },

    /// The media surface raised an error event
    #[error("Native Error: {detail}")]
    Surface { detail: String },

    /// Deadline elapsed without a playing signal
    #[error("{backend} timeout after {elapsed_ms}ms")]
    Timeout { backend: BackendKind, elapsed_ms: u64 },
}

impl AttemptError {
    /// Returns true if the attempt ran out of time rather than failing outright
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Timeout { .. })
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            AttemptError::UnsupportedBackend { .. } => "UNSUPPORTED_BACKEND",
            AttemptError::BackendFatal { .. } => "BACKEND_FATAL",
            AttemptError::Surface { .. } => "SURFACE_ERROR",
            AttemptError::Timeout { .. } => "TIMEOUT",
        }
    }
}
