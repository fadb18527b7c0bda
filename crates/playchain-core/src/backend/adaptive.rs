//! Adaptive-streaming backend (HLS)

use super::{race_playing, BackendInstance, PendingInstance, PlaybackBackend, Settlement};
use crate::config::AdaptiveOptions;
use crate::error::AttemptError;
use crate::surface::MediaSurface;
use crate::types::{AttemptOutcome, BackendKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::instrument;

/// Error event raised by an adaptive-streaming player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveErrorEvent {
    /// Unrecoverable; the player has given up
    pub fatal: bool,
    /// Error category, e.g. `networkError`
    pub kind: String,
    pub details: String,
}

/// Entry points of an adaptive-streaming library
pub trait AdaptiveStreamingLibrary: Send + Sync {
    /// Whether the platform can run the player at all
    fn is_supported(&self) -> bool;

    fn create_player(&self, options: &AdaptiveOptions) -> Arc<dyn AdaptivePlayer>;
}

/// A player created by [`AdaptiveStreamingLibrary::create_player`]
pub trait AdaptivePlayer: Send + Sync {
    fn load_source(&self, url: &str);

    fn attach_media(&self, surface: Arc<dyn MediaSurface>);

    fn detach_media(&self);

    fn destroy(&self);

    fn subscribe_errors(&self) -> broadcast::Receiver<AdaptiveErrorEvent>;
}

/// Session handle for a playing adaptive-streaming player
pub struct AdaptiveInstance {
    player: Arc<dyn AdaptivePlayer>,
}

impl AdaptiveInstance {
    pub fn new(player: Arc<dyn AdaptivePlayer>) -> Self {
        Self { player }
    }
}

impl BackendInstance for AdaptiveInstance {
    fn kind(&self) -> BackendKind {
        BackendKind::AdaptiveStreaming
    }

    fn destroy(&self) {
        self.player.destroy();
    }

    fn detach(&self) {
        self.player.detach_media();
    }
}

/// HLS playback through an adaptive-streaming library.
///
/// The surface is expected to autoplay once media is attached; only fatal
/// player errors end the attempt early.
pub struct AdaptiveStreamingBackend {
    library: Arc<dyn AdaptiveStreamingLibrary>,
    options: AdaptiveOptions,
}

impl AdaptiveStreamingBackend {
    pub fn new(library: Arc<dyn AdaptiveStreamingLibrary>, options: AdaptiveOptions) -> Self {
        Self { library, options }
    }
}

#[async_trait]
impl PlaybackBackend for AdaptiveStreamingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AdaptiveStreaming
    }

    #[instrument(skip(self, surface))]
    async fn attempt(
        &self,
        url: &str,
        surface: Arc<dyn MediaSurface>,
        deadline: Duration,
    ) -> AttemptOutcome {
        if !self.library.is_supported() {
            return AttemptOutcome::Failure(AttemptError::UnsupportedBackend {
                backend: self.kind(),
            });
        }

        let player = self.library.create_player(&self.options);
        let pending = PendingInstance::new(AdaptiveInstance::new(Arc::clone(&player)));

        let errors = player.subscribe_errors();
        let events = surface.subscribe();

        player.load_source(url);
        player.attach_media(surface);

        let settled = race_playing(
            events,
            Some(errors),
            false,
            |event: &AdaptiveErrorEvent| event.fatal,
            deadline,
        )
        .await;

        let failure = match settled {
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
