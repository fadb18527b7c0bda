//! Headless playback
//!
//! A media surface and both streaming libraries realized with HTTP probes,
//! so the orchestrator can run outside a browser. "Playing" here means the
//! source was reachable and its framing or playlist checked out.

mod adaptive;
pub mod probe;
mod segmented;
mod surface;
#[cfg(test)]
pub(crate) mod test_server;

pub use adaptive::HttpAdaptiveLibrary;
pub use segmented::HttpSegmentedLibrary;
pub use surface::HeadlessSurface;

use crate::{
    config::FallbackConfig,
    orchestrator::{FallbackOrchestrator, Presenter},
    planner::StrategyPlanner,
    proxy::CorsProxy,
    runner::AttemptRunner,
    Result,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Wire a complete orchestrator around a [`HeadlessSurface`]
pub fn headless_orchestrator(
    config: &FallbackConfig,
    presenter: Arc<dyn Presenter>,
) -> Result<FallbackOrchestrator> {
    config.validate()?;

    let client = Client::builder()
        .timeout(Duration::from_millis(config.headless.request_timeout_ms))
        .build()?;

    let surface = Arc::new(HeadlessSurface::new(client.clone(), config.headless.clone()));
    let segmented = Arc::new(HttpSegmentedLibrary::new(
        client.clone(),
        config.headless.probe_bytes,
    ));
    let adaptive = Arc::new(HttpAdaptiveLibrary::new(client));

    let runner = AttemptRunner::with_libraries(surface, config, segmented, adaptive);
    let planner = StrategyPlanner::new(CorsProxy::new(config.proxy_base.clone()));

    Ok(FallbackOrchestrator::new(planner, runner, presenter))
}
