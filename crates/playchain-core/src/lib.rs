//! Playchain Core - playback backend selection and fallback
//!
//! Plays a URL on a single media surface by trying backends in order until
//! one confirms playback:
//! - Strategy planning from the URL's extension hint
//! - Segmented-transport, adaptive-streaming and native backends
//! - Deadline-bounded attempts with single-outcome settlement
//! - A session slot holding the one live backend instance
//! - CORS-proxy rewritten retries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Playchain Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐        ┌──────────────────────┐               │
//! │  │   Strategy   │──plan─▶│ Fallback Orchestrator │──▶ Presenter │
//! │  │   Planner    │        └──────────┬───────────┘               │
//! │  └──────────────┘                   │                           │
//! │                          ┌──────────┴──────────┐                │
//! │                          │                     │                │
//! │                   ┌──────┴──────┐       ┌──────┴──────┐         │
//! │                   │   Attempt   │       │   Session   │         │
//! │                   │   Runner    │       │             │         │
//! │                   └──────┬──────┘       └──────┬──────┘         │
//! │                          │                     │                │
//! │     ┌────────────────────┼────────────────┐    │                │
//! │  ┌──┴─────────┐  ┌───────┴──────┐  ┌──────┴─┐  │                │
//! │  │ Segmented  │  │   Adaptive   │  │ Native │  │                │
//! │  │ Transport  │  │  Streaming   │  │        │  │                │
//! │  └──────┬─────┘  └───────┬──────┘  └────┬───┘  │                │
//! │         └────────────────┼──────────────┴──────┘                │
//! │                   ┌──────┴──────┐                               │
//! │                   │Media Surface│                               │
//! │                   └─────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod proxy;
pub mod runner;
pub mod session;
pub mod surface;
pub mod types;

#[cfg(feature = "headless")]
pub mod headless;

pub use backend::{BackendInstance, PlaybackBackend};
pub use config::FallbackConfig;
pub use error::{AttemptError, Error, Result};
pub use orchestrator::{FallbackOrchestrator, LogPresenter, Presenter, FAILURE_MESSAGE};
pub use planner::{extension_hint, StrategyPlanner};
pub use proxy::CorsProxy;
pub use runner::AttemptRunner;
pub use session::Session;
pub use surface::{MediaSurface, SurfaceEvent};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() {
    tracing::info!(version = VERSION, "Playchain Core initialized");
}
