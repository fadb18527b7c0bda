//! Segmented-transport library that validates MPEG-TS / FLV framing over HTTP

use super::probe::fetch_head;
use crate::backend::{
    MediaDataSource, SegmentedErrorEvent, SegmentedFeatures, SegmentedPlayer,
    SegmentedTransportLibrary,
};
use crate::config::SegmentedTuning;
use crate::surface::{MediaError, MediaErrorCode, MediaSurface, SurfaceSource};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Media credited to the surface once the stream's framing checks out (seconds)
const PROBE_BUFFER_SECONDS: f64 = 1.0;

pub struct HttpSegmentedLibrary {
    client: Client,
    probe_bytes: usize,
}

impl HttpSegmentedLibrary {
    pub fn new(client: Client, probe_bytes: usize) -> Self {
        Self { client, probe_bytes }
    }
}

impl SegmentedTransportLibrary for HttpSegmentedLibrary {
    fn features(&self) -> SegmentedFeatures {
        SegmentedFeatures {
            mse_live_playback: true,
        }
    }

    fn create_player(
        &self,
        source: MediaDataSource,
        tuning: &SegmentedTuning,
    ) -> Arc<dyn SegmentedPlayer> {
        debug!(
            url = %source.url,
            live = source.is_live,
            worker = tuning.enable_worker,
            max_latency = tuning.max_latency,
            "Creating segmented-transport player"
        );
        let (errors, _) = broadcast::channel(16);
        Arc::new(HttpSegmentedPlayer {
            client: self.client.clone(),
            probe_bytes: self.probe_bytes,
            source,
            owner: format!("segmented-transport#{}", Uuid::new_v4()),
            errors,
            state: Mutex::new(PlayerState::default()),
        })
    }
}

#[derive(Default)]
struct PlayerState {
    surface: Option<Arc<dyn MediaSurface>>,
    loader: Option<JoinHandle<()>>,
    destroyed: bool,
}

struct HttpSegmentedPlayer {
    client: Client,
    probe_bytes: usize,
    source: MediaDataSource,
    /// Identifies this player's stream binding on the surface
    owner: String,
    errors: broadcast::Sender<SegmentedErrorEvent>,
    state: Mutex<PlayerState>,
}

impl HttpSegmentedPlayer {
    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn owned_source(&self) -> SurfaceSource {
        SurfaceSource::Stream {
            owner: self.owner.clone(),
        }
    }
}

#[async_trait]
impl SegmentedPlayer for HttpSegmentedPlayer {
    fn attach_media_element(&self, surface: Arc<dyn MediaSurface>) {
        surface.set_source(self.owned_source());
        self.lock().surface = Some(surface);
    }

    fn load(&self) {
        let mut state = self.lock();
        if state.destroyed || state.loader.is_some() {
            return;
        }
        let Some(surface) = state.surface.clone() else {
            let _ = self.errors.send(SegmentedErrorEvent {
                kind: "MediaError".to_string(),
                details: "no media element attached".to_string(),
            });
            return;
        };

        let client = self.client.clone();
        let url = self.source.url.clone();
        let limit = self.probe_bytes;
        let errors = self.errors.clone();
        let owned = self.owned_source();

        state.loader = Some(tokio::spawn(async move {
            let event = match fetch_head(&client, &url, limit).await {
                Ok(probe) if probe.container().is_transport() => {
                    if surface.source() == Some(owned) {
                        surface.append_buffered(PROBE_BUFFER_SECONDS);
                    }
                    return;
                }
                Ok(probe) => SegmentedErrorEvent {
                    kind: "MediaError".to_string(),
                    details: format!("unsupported stream format ({:?})", probe.container()),
                },
                Err(err) => SegmentedErrorEvent {
                    kind: "NetworkError".to_string(),
                    details: err.to_string(),
                },
            };
            let _ = errors.send(event);
        }));
    }

    async fn play(&self) -> Result<(), MediaError> {
        let surface = self.lock().surface.clone();
        match surface {
            Some(surface) => surface.play().await,
            None => Err(MediaError::new(MediaErrorCode::Aborted, "player not attached")),
        }
    }

    fn destroy(&self) {
        let mut state = self.lock();
        if state.destroyed {
            return;
        }
        state.destroyed = true;

        if let Some(loader) = state.loader.take() {
            loader.abort();
        }
        if let Some(surface) = state.surface.take() {
            if surface.source() == Some(self.owned_source()) {
                surface.clear_source();
            }
        }
        debug!(owner = %self.owner, "Segmented-transport player destroyed");
    }

    fn subscribe_errors(&self) -> broadcast::Receiver<SegmentedErrorEvent> {
        self.errors.subscribe()
    }
}
