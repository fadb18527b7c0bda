//! Adaptive-streaming library that loads HLS playlists over HTTP

use super::probe::{fetch_text, ProbeError};
use crate::backend::{AdaptiveErrorEvent, AdaptivePlayer, AdaptiveStreamingLibrary};
use crate::config::AdaptiveOptions;
use crate::surface::{MediaSurface, SurfaceSource};
use m3u8_rs::Playlist;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// Segments credited to the buffer on startup
const STARTUP_SEGMENTS: usize = 3;

pub struct HttpAdaptiveLibrary {
    client: Client,
}

impl HttpAdaptiveLibrary {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AdaptiveStreamingLibrary for HttpAdaptiveLibrary {
    fn is_supported(&self) -> bool {
        true
    }

    fn create_player(&self, options: &AdaptiveOptions) -> Arc<dyn AdaptivePlayer> {
        debug!(
            worker = options.enable_worker,
            low_latency = options.low_latency_mode,
            "Creating adaptive-streaming player"
        );
        let (errors, _) = broadcast::channel(16);
        Arc::new(HttpAdaptivePlayer {
            client: self.client.clone(),
            owner: format!("adaptive-streaming#{}", Uuid::new_v4()),
            errors,
            state: Mutex::new(PlayerState::default()),
        })
    }
}

#[derive(Default)]
struct PlayerState {
    url: Option<String>,
    surface: Option<Arc<dyn MediaSurface>>,
    loader: Option<JoinHandle<()>>,
    destroyed: bool,
}

struct HttpAdaptivePlayer {
    client: Client,
    owner: String,
    errors: broadcast::Sender<AdaptiveErrorEvent>,
    state: Mutex<PlayerState>,
}

impl HttpAdaptivePlayer {
    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn owned_source(&self) -> SurfaceSource {
        SurfaceSource::Stream {
            owner: self.owner.clone(),
        }
    }

    /// Start loading once both a source and a surface are known
    fn start_loading(&self, state: &mut PlayerState) {
        if state.destroyed || state.loader.is_some() {
            return;
        }
        let (Some(url), Some(surface)) = (state.url.clone(), state.surface.clone()) else {
            return;
        };

        let client = self.client.clone();
        let errors = self.errors.clone();
        let owned = self.owned_source();

        state.loader = Some(tokio::spawn(async move {
            match load_startup_media(&client, &url).await {
                Ok(seconds) => {
                    if surface.source() == Some(owned) {
                        surface.append_buffered(seconds);
                    }
                }
                Err(event) => {
                    let _ = errors.send(event);
                }
            }
        }));
    }
}

fn fatal(kind: &str, details: impl Into<String>) -> AdaptiveErrorEvent {
    AdaptiveErrorEvent {
        fatal: true,
        kind: kind.to_string(),
        details: details.into(),
    }
}

fn network_error(details: &str, err: ProbeError) -> AdaptiveErrorEvent {
    fatal("networkError", format!("{}: {}", details, err))
}

/// Load the playlist (following the first variant of a master playlist) and
/// return the duration of the first few segments
async fn load_startup_media(client: &Client, url: &str) -> Result<f64, AdaptiveErrorEvent> {
    let body = fetch_text(client, url)
        .await
        .map_err(|e| network_error("manifestLoadError", e))?;

    let playlist = m3u8_rs::parse_playlist_res(body.as_bytes())
        .map_err(|e| fatal("mediaError", format!("manifestParsingError: {:?}", e)))?;

    let media = match playlist {
        Playlist::MediaPlaylist(media) => media,
        Playlist::MasterPlaylist(master) => {
            let variant = master
                .variants
                .iter()
                .find(|v| !v.is_i_frame)
                .ok_or_else(|| fatal("mediaError", "manifestIncompatibleCodecsError"))?;

            let base = Url::parse(url)
                .map_err(|e| fatal("networkError", format!("manifestLoadError: {}", e)))?;
            let level_url = base
                .join(&variant.uri)
                .map_err(|e| fatal("networkError", format!("levelLoadError: {}", e)))?;

            debug!(level = %level_url, bandwidth = variant.bandwidth, "Loading level playlist");

            let body = fetch_text(client, level_url.as_str())
                .await
                .map_err(|e| network_error("levelLoadError", e))?;
            m3u8_rs::parse_media_playlist_res(body.as_bytes())
                .map_err(|e| fatal("mediaError", format!("levelParsingError: {:?}", e)))?
        }
    };

    if media.segments.is_empty() {
        return Err(fatal("mediaError", "levelEmptyError"));
    }

    let seconds: f32 = media
        .segments
        .iter()
        .take(STARTUP_SEGMENTS)
        .map(|s| s.duration)
        .sum();
    Ok(f64::from(seconds))
}

impl AdaptivePlayer for HttpAdaptivePlayer {
    fn load_source(&self, url: &str) {
        let mut state = self.lock();
        state.url = Some(url.to_string());
        self.start_loading(&mut state);
    }

    fn attach_media(&self, surface: Arc<dyn MediaSurface>) {
        surface.set_source(self.owned_source());
        let mut state = self.lock();
        state.surface = Some(surface);
        self.start_loading(&mut state);
    }

    fn detach_media(&self) {
        let mut state = self.lock();
        if let Some(loader) = state.loader.take() {
            loader.abort();
        }
        if let Some(surface) = state.surface.take() {
            if surface.source() == Some(self.owned_source()) {
                surface.clear_source();
            }
        }
    }

    fn destroy(&self) {
        self.detach_media();
        self.lock().destroyed = true;
        debug!(owner = %self.owner, "Adaptive-streaming player destroyed");
    }

    fn subscribe_errors(&self) -> broadcast::Receiver<AdaptiveErrorEvent> {
        self.errors.subscribe()
    }
}
