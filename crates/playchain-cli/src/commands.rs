//! CLI command implementations

use crate::output::{format_plan, format_play, OutputFormat, PlanReport, PlayReport};
use console::style;
use playchain_core::headless::headless_orchestrator;
use playchain_core::{
    extension_hint, AttemptSpec, CorsProxy, FallbackConfig, FallbackOrchestrator, Presenter,
    StrategyPlanner,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Status lines on stderr; command output stays on stdout
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn show_surface(&self) {
        tracing::debug!("Surface shown");
    }

    fn notify_playing(&self, spec: &AttemptSpec) {
        eprintln!(
            "{} Video loaded successfully via {}",
            style("✓").green().bold(),
            style(spec).cyan()
        );
    }

    fn notify_failure(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), style(message).red());
    }
}

fn orchestrator(config: &FallbackConfig) -> anyhow::Result<Arc<FallbackOrchestrator>> {
    Ok(Arc::new(headless_orchestrator(config, Arc::new(ConsolePresenter))?))
}

/// Show the attempt plan for a URL
pub fn plan(url: &str, config: &FallbackConfig, format: &str) -> anyhow::Result<()> {
    let planner = StrategyPlanner::new(CorsProxy::new(config.proxy_base.clone()));
    let Some(attempts) = planner.plan_input(url) else {
        anyhow::bail!("URL is empty");
    };

    let trimmed = url.trim();
    let extension = extension_hint(trimmed);
    let report = PlanReport {
        url: trimmed,
        extension: &extension,
        attempts: &attempts,
    };
    print!("{}", format_plan(&report, OutputFormat::from(format)));

    Ok(())
}

/// Play a URL. Returns whether any attempt confirmed playback.
pub async fn play(url: &str, config: &FallbackConfig, format: &str) -> anyhow::Result<bool> {
    if url.trim().is_empty() {
        anyhow::bail!("URL is empty");
    }

    let orchestrator = orchestrator(config)?;
    let outcome = orchestrator.submit(url).await;

    let report = PlayReport::new(url, &outcome);
    print!("{}", format_play(&report, OutputFormat::from(format)));

    Ok(outcome.is_played())
}

/// Read URLs from stdin. Each non-blank line replaces the previous request.
pub async fn interactive(config: &FallbackConfig, format: &str) -> anyhow::Result<()> {
    let orchestrator = orchestrator(config)?;
    let format = OutputFormat::from(format);

    eprintln!(
        "{}",
        style("Enter a video URL per line (Ctrl-D to quit)").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current: Option<JoinHandle<()>> = None;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let orchestrator = Arc::clone(&orchestrator);
        // Submitting cancels whatever attempt the previous request has in flight
        current = Some(tokio::spawn(async move {
            let outcome = orchestrator.submit(&line).await;
            let report = PlayReport::new(&line, &outcome);
            print!("{}", format_play(&report, format));
        }));
    }

    if let Some(last) = current {
        last.await?;
    }
    orchestrator.reset().await;

    Ok(())
}
