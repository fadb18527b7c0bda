//! Native playback: the URL goes straight onto the surface

use super::{race_playing, request_play, PlaybackBackend, Settlement};
use crate::error::AttemptError;
use crate::surface::{MediaSurface, ReadyState, SurfaceSource};
use crate::types::{AttemptOutcome, BackendKind};
use async_trait::async_trait;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Direct URL assignment. Owns no instance; the session only has to release
/// the surface's source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlaybackBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    #[instrument(skip(self, surface))]
    async fn attempt(
        &self,
        url: &str,
        surface: Arc<dyn MediaSurface>,
        deadline: Duration,
    ) -> AttemptOutcome {
        let events = surface.subscribe();
        surface.set_source(SurfaceSource::Url(url.to_string()));
        request_play(Arc::clone(&surface));

        let settled =
            race_playing::<Infallible, _>(events, None, true, |_| true, deadline).await;

        match settled {
            Settlement::Playing => AttemptOutcome::Success(None),
            Settlement::Surface(err) => {
                // Prefer what the surface recorded, it may be more specific
                let detail = surface.error().unwrap_or(err).detail();
                AttemptOutcome::Failure(AttemptError::Surface { detail })
            }
            Settlement::Deadline => {
                if surface.paused() && surface.ready_state() < ReadyState::HaveFutureData {
                    AttemptOutcome::Failure(AttemptError::Timeout {
                        backend: self.kind(),
                        elapsed_ms: deadline.as_millis() as u64,
                    })
                } else {
                    debug!(
                        ready_state = ?surface.ready_state(),
                        "Deadline hit with playback under way"
                    );
                    AttemptOutcome::Success(None)
                }
            }
            Settlement::Closed => AttemptOutcome::Failure(AttemptError::Surface {
                detail: "media surface closed".to_string(),
            }),
            Settlement::Backend(never) => match never {},
        }
    }
}
