//! Playback backends
//!
//! Every backend offers the same capability: try to get the surface playing
//! a URL within a deadline, and report exactly one outcome. On failure the
//! backend has already torn down whatever it created.

mod adaptive;
mod native;
mod segmented;

pub use adaptive::{
    AdaptiveErrorEvent, AdaptiveInstance, AdaptivePlayer, AdaptiveStreamingBackend,
    AdaptiveStreamingLibrary,
};
pub use native::NativeBackend;
pub use segmented::{
    MediaDataSource, SegmentedErrorEvent, SegmentedFeatures, SegmentedInstance, SegmentedPlayer,
    SegmentedTransportBackend, SegmentedTransportLibrary, TransportMode,
};

use crate::surface::{MediaError, MediaSurface, SurfaceEvent};
use crate::types::{AttemptOutcome, BackendKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

/// Uniform attempt-to-play capability
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Try to get `surface` playing `url`, giving up after `deadline`
    async fn attempt(
        &self,
        url: &str,
        surface: Arc<dyn MediaSurface>,
        deadline: Duration,
    ) -> AttemptOutcome;
}

/// A live backend instance owned by the session.
///
/// Both teardown operations are optional; backends that lack one keep the
/// no-op default.
pub trait BackendInstance: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Release the instance's resources
    fn destroy(&self) {}

    /// Detach from the media surface
    fn detach(&self) {}

    fn teardown(&self) {
        self.destroy();
        self.detach();
    }
}

/// An attempt's instance until it is handed to the session.
///
/// Dropping the guard tears the instance down, which covers both a failed
/// attempt and an attempt future dropped mid-race by a newer request.
pub(crate) struct PendingInstance<I: BackendInstance + 'static> {
    instance: Option<I>,
}

impl<I: BackendInstance + 'static> PendingInstance<I> {
    pub(crate) fn new(instance: I) -> Self {
        Self {
            instance: Some(instance),
        }
    }

    pub(crate) fn hand_over(mut self) -> Option<Box<dyn BackendInstance>> {
        self.instance
            .take()
            .map(|instance| Box::new(instance) as Box<dyn BackendInstance>)
    }
}

impl<I: BackendInstance + 'static> Drop for PendingInstance<I> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            debug!(backend = %instance.kind(), "Tearing down pending instance");
            instance.teardown();
        }
    }
}

/// How a deadline race ended
#[derive(Debug)]
pub(crate) enum Settlement<E> {
    Playing,
    Backend(E),
    Surface(MediaError),
    Deadline,
    /// Surface went away
    Closed,
}

async fn next_backend_event<E: Clone>(
    rx: &mut Option<broadcast::Receiver<E>>,
) -> Result<E, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Race the surface's playing signal against backend errors and a timer.
///
/// Listeners are owned here and dropped on return, so nothing outlives the
/// attempt.
pub(crate) async fn race_playing<E, F>(
    mut surface_events: broadcast::Receiver<SurfaceEvent>,
    mut backend_events: Option<broadcast::Receiver<E>>,
    watch_surface_errors: bool,
    is_fatal: F,
    deadline: Duration,
) -> Settlement<E>
where
    E: Clone + Send,
    F: Fn(&E) -> bool + Send,
{
    let timer = tokio::time::sleep(deadline);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            event = surface_events.recv() => match event {
                Ok(SurfaceEvent::Playing) => return Settlement::Playing,
                Ok(SurfaceEvent::Error(err)) if watch_surface_errors => {
                    return Settlement::Surface(err);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Surface listener lagged");
                }
                Err(RecvError::Closed) => return Settlement::Closed,
            },
            event = next_backend_event(&mut backend_events) => match event {
                Ok(event) if is_fatal(&event) => return Settlement::Backend(event),
                Ok(_) => debug!("Ignoring non-fatal backend error"),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Backend listener lagged");
                }
                Err(RecvError::Closed) => backend_events = None,
            },
            _ = &mut timer => return Settlement::Deadline,
        }
    }
}

/// Fire off a play request without waiting on it
pub(crate) fn request_play(surface: Arc<dyn MediaSurface>) {
    tokio::spawn(async move {
        if let Err(err) = surface.play().await {
            debug!(error = %err.detail(), "play() rejected, waiting for surface events");
        }
    });
}
