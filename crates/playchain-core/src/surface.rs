//! The single media surface every backend competes for

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// HTML media ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

/// Media error codes reported by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SrcNotSupported = 4,
}

impl std::fmt::Display for MediaErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaErrorCode::Aborted => write!(f, "MEDIA_ERR_ABORTED"),
            MediaErrorCode::Network => write!(f, "MEDIA_ERR_NETWORK"),
            MediaErrorCode::Decode => write!(f, "MEDIA_ERR_DECODE"),
            MediaErrorCode::SrcNotSupported => write!(f, "MEDIA_ERR_SRC_NOT_SUPPORTED"),
        }
    }
}

/// Error raised by the surface itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaError {
    pub code: MediaErrorCode,
    pub message: Option<String>,
}

impl MediaError {
    pub fn new(code: MediaErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// Message if there is one, otherwise the code
    pub fn detail(&self) -> String {
        match &self.message {
            Some(message) if !message.is_empty() => message.clone(),
            _ => self.code.to_string(),
        }
    }
}

/// Events fired by the surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Playback actually started
    Playing,
    /// Surface error; details are also available via [`MediaSurface::error`]
    Error(MediaError),
    /// Source was removed
    Emptied,
}

/// What the surface is currently bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceSource {
    /// URL assigned directly for native playback
    Url(String),
    /// Stream fed by an attached backend
    Stream { owner: String },
}

/// A single video surface.
///
/// Subscribing returns a fresh listener; dropping the receiver removes it.
#[async_trait]
pub trait MediaSurface: Send + Sync {
    /// Bind a new source, replacing any previous one
    fn set_source(&self, source: SurfaceSource);

    /// Remove the source binding and reset the element
    fn clear_source(&self);

    /// Current source binding
    fn source(&self) -> Option<SurfaceSource>;

    /// Request playback. A rejection here is not diagnostic; the outcome
    /// arrives later as a [`SurfaceEvent`].
    async fn play(&self) -> std::result::Result<(), MediaError>;

    /// Media appended by an attached backend (seconds)
    fn append_buffered(&self, seconds: f64);

    fn paused(&self) -> bool;

    fn ready_state(&self) -> ReadyState;

    /// Last error raised, cleared when the source changes
    fn error(&self) -> Option<MediaError>;

    fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_state_ordering() {
        assert!(ReadyState::HaveCurrentData < ReadyState::HaveFutureData);
        assert!(ReadyState::HaveEnoughData >= ReadyState::HaveFutureData);
    }

    #[test]
    fn test_media_error_detail() {
        let err = MediaError {
            code: MediaErrorCode::Decode,
            message: None,
        };
        assert_eq!(err.detail(), "MEDIA_ERR_DECODE");

        let err = MediaError::new(MediaErrorCode::Network, "connection reset");
        assert_eq!(err.detail(), "connection reset");
    }
}
