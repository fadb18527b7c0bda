//! Segmented-transport backend (MPEG-TS / FLV demuxed into the surface)

use super::{race_playing, BackendInstance, PendingInstance, PlaybackBackend, Settlement};
use crate::config::SegmentedTuning;
use crate::error::AttemptError;
use crate::surface::MediaSurface;
use crate::types::{AttemptOutcome, BackendKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

/// Capabilities reported by the library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentedFeatures {
    /// Live playback through media source extensions
    pub mse_live_playback: bool,
}

/// How the library feeds the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Mse,
}

/// Source description handed to the player factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDataSource {
    pub mode: TransportMode,
    pub is_live: bool,
    pub url: String,
    /// Fetch with CORS
    pub cors: bool,
}

/// Error event raised by a segmented-transport player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedErrorEvent {
    /// Error category, e.g. `NetworkError` or `MediaError`
    pub kind: String,
    pub details: String,
}

/// Entry points of a segmented-transport library
pub trait SegmentedTransportLibrary: Send + Sync {
    fn features(&self) -> SegmentedFeatures;

    fn create_player(
        &self,
        source: MediaDataSource,
        tuning: &SegmentedTuning,
    ) -> Arc<dyn SegmentedPlayer>;
}

/// A player created by [`SegmentedTransportLibrary::create_player`]
#[async_trait]
pub trait SegmentedPlayer: Send + Sync {
    fn attach_media_element(&self, surface: Arc<dyn MediaSurface>);

    fn load(&self);

    async fn play(&self) -> Result<(), crate::surface::MediaError>;

    /// Stop loading, release buffers and detach from the surface
    fn destroy(&self);

    fn subscribe_errors(&self) -> broadcast::Receiver<SegmentedErrorEvent>;
}

/// Session handle for a playing segmented-transport player
pub struct SegmentedInstance {
    player: Arc<dyn SegmentedPlayer>,
}

impl SegmentedInstance {
    pub fn new(player: Arc<dyn SegmentedPlayer>) -> Self {
        Self { player }
    }
}

impl BackendInstance for SegmentedInstance {
    fn kind(&self) -> BackendKind {
        BackendKind::SegmentedTransport
    }

    fn destroy(&self) {
        self.player.destroy();
    }
}

/// Low-latency live playback through a segmented-transport library
pub struct SegmentedTransportBackend {
    library: Arc<dyn SegmentedTransportLibrary>,
    tuning: SegmentedTuning,
}

impl SegmentedTransportBackend {
    pub fn new(library: Arc<dyn SegmentedTransportLibrary>, tuning: SegmentedTuning) -> Self {
        Self { library, tuning }
    }
}

#[async_trait]
impl PlaybackBackend for SegmentedTransportBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::SegmentedTransport
    }

    #[instrument(skip(self, surface))]
    async fn attempt(
        &self,
        url: &str,
        surface: Arc<dyn MediaSurface>,
        deadline: Duration,
    ) -> AttemptOutcome {
        if !self.library.features().mse_live_playback {
            return AttemptOutcome::Failure(AttemptError::UnsupportedBackend {
                backend: self.kind(),
            });
        }

        let source = MediaDataSource {
            mode: TransportMode::Mse,
            is_live: true,
            url: url.to_string(),
            cors: true,
        };
        let player = self.library.create_player(source, &self.tuning);
        let pending = PendingInstance::new(SegmentedInstance::new(Arc::clone(&player)));

        let errors = player.subscribe_errors();
        let events = surface.subscribe();

        player.attach_media_element(surface);
        player.load();

        let play_handle = Arc::clone(&player);
        tokio::spawn(async move {
            if let Err(err) = play_handle.play().await {
                debug!(error = %err.detail(), "play() rejected");
            }
        });

        let failure = match race_playing(events, Some(errors), false, |_| true, deadline).await {
            Settlement::Playing => return AttemptOutcome::Success(pending.hand_over()),
            Settlement::Backend(event) => AttemptError::BackendFatal {
                backend: self.kind(),
                detail: event.details,
            },
            Settlement::Deadline => AttemptError::Timeout {
                backend: self.kind(),
                elapsed_ms: deadline.as_millis() as u64,
            },
            Settlement::Surface(err) => AttemptError::Surface {
                detail: err.detail(),
            },
            Settlement::Closed => AttemptError::BackendFatal {
                backend: self.kind(),
                detail: "media surface closed".to_string(),
            },
        };

        drop(pending);
        AttemptOutcome::Failure(failure)
    }
}
