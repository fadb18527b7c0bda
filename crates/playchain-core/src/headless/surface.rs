//! Headless media surface
//!
//! Plays nothing on screen. Native sources are probed over HTTP; stream
//! sources start once the attached backend has appended enough media.

use super::probe::{fetch_head, is_native_content_type, Container, ProbeError};
use crate::config::HeadlessConfig;
use crate::surface::{MediaError, MediaErrorCode, MediaSurface, ReadyState, SurfaceEvent, SurfaceSource};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
struct SurfaceState {
    source: Option<SurfaceSource>,
    /// Bumped on every source change; stale probe results are dropped
    epoch: u64,
    paused: bool,
    ready_state: ReadyState,
    buffered: f64,
    play_requested: bool,
    error: Option<MediaError>,
    probe: Option<JoinHandle<()>>,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            source: None,
            epoch: 0,
            paused: true,
            ready_state: ReadyState::HaveNothing,
            buffered: 0.0,
            play_requested: false,
            error: None,
            probe: None,
        }
    }
}

impl SurfaceState {
    fn reset(&mut self, source: Option<SurfaceSource>) {
        if let Some(probe) = self.probe.take() {
            probe.abort();
        }
        let epoch = self.epoch + 1;
        *self = SurfaceState {
            source,
            epoch,
            ..SurfaceState::default()
        };
    }
}

struct Inner {
    client: Client,
    config: HeadlessConfig,
    state: Mutex<SurfaceState>,
    events: broadcast::Sender<SurfaceEvent>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        // Poisoning leaves the state consistent enough to keep going
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: SurfaceEvent) {
        // No listeners is fine
        let _ = self.events.send(event);
    }

    /// Start playback if data and intent line up
    fn maybe_start(&self, state: &mut SurfaceState) {
        let wants_play = state.play_requested || self.config.autoplay;
        if state.paused && wants_play && state.ready_state >= ReadyState::HaveFutureData {
            state.paused = false;
            debug!(buffered = state.buffered, "Surface playing");
            self.emit(SurfaceEvent::Playing);
        }
    }

    fn fail(&self, state: &mut SurfaceState, error: MediaError) {
        debug!(code = %error.code, detail = %error.detail(), "Surface error");
        state.error = Some(error.clone());
        state.paused = true;
        self.emit(SurfaceEvent::Error(error));
    }
}

/// Media surface backed by HTTP probes
#[derive(Clone)]
pub struct HeadlessSurface {
    inner: Arc<Inner>,
}

impl HeadlessSurface {
    pub fn new(client: Client, config: HeadlessConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                client,
                config,
                state: Mutex::new(SurfaceState::default()),
                events,
            }),
        }
    }

    /// Seconds of media appended to the current stream source
    pub fn buffered(&self) -> f64 {
        self.inner.lock().buffered
    }

    fn spawn_probe(&self, state: &mut SurfaceState, url: String) {
        let inner = Arc::clone(&self.inner);
        let epoch = state.epoch;

        state.probe = Some(tokio::spawn(async move {
            let result = fetch_head(&inner.client, &url, inner.config.probe_bytes).await;

            let mut state = inner.lock();
            if state.epoch != epoch {
                return;
            }
            state.probe = None;

            match classify(result) {
                Ok(container) => {
                    debug!(?container, url = %url, "Native source accepted");
                    state.ready_state = ReadyState::HaveEnoughData;
                    inner.maybe_start(&mut state);
                }
                Err(error) => inner.fail(&mut state, error),
            }
        }));
    }
}

/// Decide whether a probed native source is playable
fn classify(result: Result<super::probe::ProbeResult, ProbeError>) -> Result<Container, MediaError> {
    let probe = result.map_err(|e| MediaError::new(MediaErrorCode::Network, e.to_string()))?;
    let container = probe.container();

    if container.is_native() {
        return Ok(container);
    }

    let content_type_ok = probe
        .content_type
        .as_deref()
        .is_some_and(is_native_content_type);

    if container == Container::Unknown && content_type_ok {
        return Ok(container);
    }

    Err(MediaError::new(
        MediaErrorCode::SrcNotSupported,
        format!(
            "unsupported source ({:?}, content-type {})",
            container,
            probe.content_type.as_deref().unwrap_or("unknown")
        ),
    ))
}

#[async_trait]
impl MediaSurface for HeadlessSurface {
    fn set_source(&self, source: SurfaceSource) {
        let mut state = self.inner.lock();
        state.reset(Some(source));
    }

    fn clear_source(&self) {
        let mut state = self.inner.lock();
        let had_source = state.source.is_some();
        state.reset(None);
        if had_source {
            self.inner.emit(SurfaceEvent::Emptied);
        }
    }

    fn source(&self) -> Option<SurfaceSource> {
        self.inner.lock().source.clone()
    }

    async fn play(&self) -> Result<(), MediaError> {
        let mut state = self.inner.lock();
        state.play_requested = true;

        match state.source.clone() {
            None => Err(MediaError::new(MediaErrorCode::SrcNotSupported, "no source")),
            Some(SurfaceSource::Url(url)) => {
                if state.probe.is_none() && state.ready_state < ReadyState::HaveFutureData {
                    self.spawn_probe(&mut state, url);
                } else {
                    self.inner.maybe_start(&mut state);
                }
                Ok(())
            }
            Some(SurfaceSource::Stream { .. }) => {
                self.inner.maybe_start(&mut state);
                Ok(())
            }
        }
    }

    fn append_buffered(&self, seconds: f64) {
        let mut state = self.inner.lock();
        if !matches!(state.source, Some(SurfaceSource::Stream { .. })) {
            warn!("Media appended without a stream source");
            return;
        }

        state.buffered += seconds.max(0.0);
        state.ready_state = if state.buffered >= self.inner.config.start_threshold {
            ReadyState::HaveEnoughData
        } else if state.buffered > 0.0 {
            ReadyState::HaveCurrentData
        } else {
            ReadyState::HaveMetadata
        };
        self.inner.maybe_start(&mut state);
    }

    fn paused(&self) -> bool {
        self.inner.lock().paused
    }

    fn ready_state(&self) -> ReadyState {
        self.inner.lock().ready_state
    }

    fn error(&self) -> Option<MediaError> {
        self.inner.lock().error.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.inner.events.subscribe()
    }
}
