//! Fallback orchestrator
//!
//! Drives a request through its plan one attempt at a time:
//!
//! ```text
//! Idle ──request──▶ Attempting(0) ──fail──▶ Attempting(1) ── … ──fail──▶ Exhausted
//!                        │                       │
//!                        └──────success──────────┴──────────▶ Succeeded
//! ```
//!
//! Each request takes a new generation. Attempts run one at a time across
//! all requests: a newer request cancels the in-flight attempt (dropping it
//! tears its instance down) and waits for it to unwind before starting its
//! own. A stale result never touches the session.

use crate::{
    backend::BackendInstance,
    error::Error,
    planner::StrategyPlanner,
    runner::AttemptRunner,
    session::Session,
    types::*,
    Result,
};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

/// Message shown once every attempt has failed
pub const FAILURE_MESSAGE: &str = "Could not play video. Please check the URL or file format.";

/// Presentation hooks. Layout and alerts live outside the orchestrator.
pub trait Presenter: Send + Sync {
    /// A request started; make the surface visible
    fn show_surface(&self) {}

    fn notify_playing(&self, _spec: &AttemptSpec) {}

    /// Every attempt failed. Called once per exhausted request.
    fn notify_failure(&self, message: &str);
}

/// Presenter that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn notify_playing(&self, spec: &AttemptSpec) {
        info!(attempt = %spec, "Video loaded successfully");
    }

    fn notify_failure(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Runs playback requests against the shared surface
pub struct FallbackOrchestrator {
    planner: StrategyPlanner,
    runner: AttemptRunner,
    session: Mutex<Session>,
    presenter: Arc<dyn Presenter>,
    /// Held for the whole of each attempt
    attempt_slot: Mutex<()>,
    generation_tx: watch::Sender<u64>,
    state_tx: watch::Sender<OrchestratorState>,
}

impl FallbackOrchestrator {
    pub fn new(planner: StrategyPlanner, runner: AttemptRunner, presenter: Arc<dyn Presenter>) -> Self {
        let (state_tx, _) = watch::channel(OrchestratorState::Idle);
        let (generation_tx, _) = watch::channel(0);
        let session = Session::new(Arc::clone(runner.surface()));

        Self {
            planner,
            runner,
            session: Mutex::new(session),
            presenter,
            attempt_slot: Mutex::new(()),
            generation_tx,
            state_tx,
        }
    }

    pub fn planner(&self) -> &StrategyPlanner {
        &self.planner
    }

    /// Get current state
    pub fn state(&self) -> OrchestratorState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes
    pub fn subscribe_state(&self) -> watch::Receiver<OrchestratorState> {
        self.state_tx.subscribe()
    }

    /// Generation of the most recent request
    pub fn generation(&self) -> u64 {
        *self.generation_tx.borrow()
    }

    /// Backend instance currently held by the session
    pub async fn active_backend(&self) -> Option<BackendKind> {
        self.session.lock().await.active_kind()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    fn next_generation(&self) -> u64 {
        self.generation_tx.send_modify(|generation| *generation += 1);
        self.generation()
    }

    /// Transition to new state
    fn set_state(&self, new_state: OrchestratorState) -> Result<()> {
        let current = self.state();
        if current == new_state {
            return Ok(());
        }

        if !current.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        self.state_tx.send_replace(new_state);
        debug!(from = %current, to = %new_state, "State transition");
        Ok(())
    }

    fn transition(&self, new_state: OrchestratorState) {
        if let Err(err) = self.set_state(new_state) {
            warn!(error = %err, "Ignoring state change");
        }
    }

    /// Submit raw input. Blank input is ignored without touching the session.
    pub async fn submit(&self, input: &str) -> PlaybackOutcome {
        match PlaybackRequest::new(input) {
            Ok(request) => self.execute(request).await,
            Err(_) => {
                debug!("Ignoring blank input");
                PlaybackOutcome::Ignored
            }
        }
    }

    /// Drop whatever is playing and invalidate any in-flight request
    pub async fn reset(&self) {
        {
            let mut session = self.session.lock().await;
            self.next_generation();
            session.clear();
            self.transition(OrchestratorState::Idle);
        }
        // Returns once a cancelled attempt has torn down its instance
        let _slot = self.attempt_slot.lock().await;
    }

    /// Run a request through its plan
    #[instrument(skip(self, request), fields(request_id = %request.id(), url = %request.url()))]
    pub async fn execute(&self, request: PlaybackRequest) -> PlaybackOutcome {
        let generation = {
            let mut session = self.session.lock().await;
            let generation = self.next_generation();
            session.clear();
            self.transition(OrchestratorState::Idle);
            generation
        };

        self.presenter.show_surface();

        let plan = self.planner.plan(&request);
        info!(
            generation,
            extension = request.extension(),
            attempts = plan.len(),
            "Starting playback"
        );

        let mut failures = Vec::with_capacity(plan.len());

        for (index, spec) in plan.into_iter().enumerate() {
            let _slot = self.attempt_slot.lock().await;
            let generations = {
                let _session = self.session.lock().await;
                if !self.is_current(generation) {
                    return self.superseded(generation);
                }
                self.transition(OrchestratorState::Attempting(index));
                self.generation_tx.subscribe()
            };

            let deadline = self.runner.deadline_for(spec.backend);
            let outcome = tokio::select! {
                outcome = self.runner.run(&spec, deadline) => Some(outcome),
                _ = generation_changed(generations, generation) => None,
            };
            let Some(outcome) = outcome else {
                debug!(attempt = %spec, index, "Attempt cancelled by a newer request");
                return self.superseded(generation);
            };

            let mut session = self.session.lock().await;
            if !self.is_current(generation) {
                if let AttemptOutcome::Success(Some(instance)) = outcome {
                    instance.teardown();
                }
                return self.superseded(generation);
            }

            match outcome {
                AttemptOutcome::Success(instance) => {
                    if let Err(err) = session.install(instance) {
                        warn!(error = %err, "Session was not cleared before install");
                    }
                    self.transition(OrchestratorState::Succeeded);
                    info!(attempt = %spec, index, "Playback confirmed");
                    self.presenter.notify_playing(&spec);
                    return PlaybackOutcome::Played { index, spec };
                }
                AttemptOutcome::Failure(err) => {
                    warn!(
                        attempt = %spec,
                        index,
                        code = err.error_code(),
                        reason = %err,
                        "Attempt failed, trying next"
                    );
                    session.clear();
                    failures.push((spec, err));
                }
            }
        }

        let _session = self.session.lock().await;
        if !self.is_current(generation) {
            return self.superseded(generation);
        }
        self.transition(OrchestratorState::Exhausted);
        warn!(attempts = failures.len(), "All attempts failed");
        self.presenter.notify_failure(FAILURE_MESSAGE);

        PlaybackOutcome::Exhausted { failures }
    }

    fn superseded(&self, generation: u64) -> PlaybackOutcome {
        info!(
            generation,
            current = self.generation(),
            "Discarding stale attempt result"
        );
        PlaybackOutcome::Superseded
    }
}

/// Resolves once the generation moves past `generation`
async fn generation_changed(mut generations: watch::Receiver<u64>, generation: u64) {
    let changed = generations.wait_for(|current| *current != generation).await.is_ok();
    if !changed {
        // Sender gone with the orchestrator; nothing can supersede us now
        std::future::pending::<()>().await;
    }
}
