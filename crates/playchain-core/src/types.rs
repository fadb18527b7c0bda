//! Core types for Playchain

use crate::backend::BackendInstance;
use crate::error::{AttemptError, Error};
use crate::planner::extension_hint;
use crate::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback backends that can drive the media surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// MPEG-TS / FLV demuxing into the surface
    SegmentedTransport,
    /// HLS playlists
    AdaptiveStreaming,
    /// Direct URL assignment to the surface
    Native,
}

impl BackendKind {
    /// Backends that own a separate player instance
    pub fn owns_instance(&self) -> bool {
        !matches!(self, BackendKind::Native)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::SegmentedTransport => write!(f, "segmented-transport"),
            BackendKind::AdaptiveStreaming => write!(f, "adaptive-streaming"),
            BackendKind::Native => write!(f, "native"),
        }
    }
}

/// Which form of the requested URL an attempt uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlVariant {
    Original,
    Proxied,
}

impl std::fmt::Display for UrlVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlVariant::Original => write!(f, "original"),
            UrlVariant::Proxied => write!(f, "proxied"),
        }
    }
}

/// A submitted URL and the extension hint derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackRequest {
    id: RequestId,
    url: String,
    extension: String,
}

impl PlaybackRequest {
    /// Build a request from raw user input.
    ///
    /// Surrounding whitespace is trimmed; blank input is rejected.
    pub fn new(input: &str) -> Result<Self> {
        let url = input.trim();
        if url.is_empty() {
            return Err(Error::EmptyUrl);
        }

        Ok(Self {
            id: RequestId::new(),
            url: url.to_string(),
            extension: extension_hint(url),
        })
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lowercase file extension of the URL path, empty if unknown
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// One (backend, URL form) pairing to try
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptSpec {
    pub backend: BackendKind,
    pub variant: UrlVariant,
    /// URL handed to the backend
    pub url: String,
}

impl std::fmt::Display for AttemptSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.backend, self.variant)
    }
}

/// Result of a single attempt.
///
/// `Success` hands over the live backend instance, or `None` for native
/// playback where there is nothing separate to own.
pub enum AttemptOutcome {
    Success(Option<Box<dyn BackendInstance>>),
    Failure(AttemptError),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

impl std::fmt::Debug for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptOutcome::Success(Some(instance)) => {
                write!(f, "Success({})", instance.kind())
            }
            AttemptOutcome::Success(None) => write!(f, "Success(native)"),
            AttemptOutcome::Failure(err) => write!(f, "Failure({})", err),
        }
    }
}

/// Fallback orchestrator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrchestratorState {
    /// No request in progress
    Idle,
    /// Running the attempt at this plan index
    Attempting(usize),
    /// An attempt confirmed playback
    Succeeded,
    /// Every attempt in the plan failed
    Exhausted,
}

impl OrchestratorState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: OrchestratorState) -> bool {
        use OrchestratorState::*;
        match (*self, target) {
            // Any request starts from Idle; terminal states reset to Idle
            (Succeeded, Idle) | (Exhausted, Idle) | (Attempting(_), Idle) => true,
            (Idle, Attempting(0)) => true,
            (Attempting(i), Attempting(j)) => j == i + 1,
            (Attempting(_), Succeeded) | (Attempting(_), Exhausted) => true,
            _ => false,
        }
    }

    /// Terminal for the current request
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestratorState::Succeeded | OrchestratorState::Exhausted)
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorState::Idle => write!(f, "idle"),
            OrchestratorState::Attempting(i) => write!(f, "attempting({})", i),
            OrchestratorState::Succeeded => write!(f, "succeeded"),
            OrchestratorState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Overall result of one playback request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Attempt at `index` is playing
    Played { index: usize, spec: AttemptSpec },
    /// Every attempt failed, in plan order
    Exhausted { failures: Vec<(AttemptSpec, AttemptError)> },
    /// A newer request replaced this one before it settled
    Superseded,
    /// Blank input, nothing attempted
    Ignored,
}

impl PlaybackOutcome {
    pub fn is_played(&self) -> bool {
        matches!(self, PlaybackOutcome::Played { .. })
    }
}
