//! Attempt runner
//!
//! Wraps one backend invocation with its deadline. Each call settles exactly
//! once: the backend races its playing signal against the timer and has
//! already cleaned up after itself when it reports failure.

use crate::backend::{
    AdaptiveStreamingBackend, AdaptiveStreamingLibrary, NativeBackend, PlaybackBackend,
    SegmentedTransportBackend, SegmentedTransportLibrary,
};
use crate::config::FallbackConfig;
use crate::error::AttemptError;
use crate::surface::MediaSurface;
use crate::types::{AttemptOutcome, AttemptSpec, BackendKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Runs attempt specs against the registered backends
pub struct AttemptRunner {
    surface: Arc<dyn MediaSurface>,
    backends: HashMap<BackendKind, Arc<dyn PlaybackBackend>>,
    native_deadline: Duration,
    streaming_deadline: Duration,
}

impl AttemptRunner {
    /// Runner with only the native backend registered
    pub fn new(surface: Arc<dyn MediaSurface>, config: &FallbackConfig) -> Self {
        let mut runner = Self {
            surface,
            backends: HashMap::new(),
            native_deadline: config.native_deadline(),
            streaming_deadline: config.streaming_deadline(),
        };
        runner.register(Arc::new(NativeBackend::new()));
        runner
    }

    /// Runner with all three backends wired to the given libraries
    pub fn with_libraries(
        surface: Arc<dyn MediaSurface>,
        config: &FallbackConfig,
        segmented: Arc<dyn SegmentedTransportLibrary>,
        adaptive: Arc<dyn AdaptiveStreamingLibrary>,
    ) -> Self {
        let mut runner = Self::new(surface, config);
        runner.register(Arc::new(SegmentedTransportBackend::new(
            segmented,
            config.segmented.clone(),
        )));
        runner.register(Arc::new(AdaptiveStreamingBackend::new(
            adaptive,
            config.adaptive.clone(),
        )));
        runner
    }

    /// Register a backend, replacing any previous one of the same kind
    pub fn register(&mut self, backend: Arc<dyn PlaybackBackend>) {
        self.backends.insert(backend.kind(), backend);
    }

    pub fn surface(&self) -> &Arc<dyn MediaSurface> {
        &self.surface
    }

    /// Deadline for an attempt of `kind`
    pub fn deadline_for(&self, kind: BackendKind) -> Duration {
        match kind {
            BackendKind::Native => self.native_deadline,
            BackendKind::SegmentedTransport | BackendKind::AdaptiveStreaming => {
                self.streaming_deadline
            }
        }
    }

    /// Run one attempt with an explicit deadline
    #[instrument(skip(self, spec), fields(backend = %spec.backend, variant = %spec.variant))]
    pub async fn run(&self, spec: &AttemptSpec, deadline: Duration) -> AttemptOutcome {
        let Some(backend) = self.backends.get(&spec.backend) else {
            debug!("No backend registered");
            return AttemptOutcome::Failure(AttemptError::UnsupportedBackend {
                backend: spec.backend,
            });
        };

        let start = Instant::now();
        let outcome = backend
            .attempt(&spec.url, Arc::clone(&self.surface), deadline)
            .await;

        info!(
            success = outcome.is_success(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Attempt settled"
        );
        outcome
    }

    /// Run one attempt with the backend's configured deadline
    pub async fn run_default(&self, spec: &AttemptSpec) -> AttemptOutcome {
        self.run(spec, self.deadline_for(spec.backend)).await
    }
}
