//! Headless playback example
//!
//! Prints the attempt plan for a URL, then runs it against the HTTP-probing
//! headless surface.
//!
//! Run with: cargo run -p playchain-core --example headless_play -- <url>

use playchain_core::headless::headless_orchestrator;
use playchain_core::{FallbackConfig, LogPresenter, PlaybackOutcome};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> playchain_core::Result<()> {
    playchain_core::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8".to_string());

    println!("Playchain Core - Headless Playback Example");
    println!("==========================================\n");

    let config = FallbackConfig::default();
    let orchestrator = headless_orchestrator(&config, Arc::new(LogPresenter))?;

    println!("Plan for {}:", url);
    println!("-----------");
    match orchestrator.planner().plan_input(&url) {
        Some(plan) => {
            for (i, spec) in plan.iter().enumerate() {
                println!("  {}. {}  {}", i + 1, spec, spec.url);
            }
        }
        None => {
            println!("  (blank input, nothing to do)");
            return Ok(());
        }
    }
    println!();

    match orchestrator.submit(&url).await {
        PlaybackOutcome::Played { index, spec } => {
            println!("Playing via attempt {} ({})", index + 1, spec);
        }
        PlaybackOutcome::Exhausted { failures } => {
            println!("Every attempt failed:");
            for (spec, err) in failures {
                println!("  {:<32} {}", spec.to_string(), err);
            }
        }
        other => println!("Request ended as {:?}", other),
    }

    Ok(())
}
