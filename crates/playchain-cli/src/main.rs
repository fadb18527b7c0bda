//! Playchain CLI - play a URL through the backend fallback chain
//!
//! Features:
//! - Attempt plan preview for any URL
//! - Headless playback with per-attempt diagnostics
//! - Interactive mode where each entered URL replaces the previous one

use clap::{Parser, Subcommand};
use playchain_core::FallbackConfig;
use std::path::PathBuf;

mod commands;
mod output;

/// Playchain CLI - Backend fallback video playback
#[derive(Parser)]
#[command(name = "playchain")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Play a video URL by trying playback backends until one works", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CORS proxy prefix used for proxied attempts
    #[arg(long)]
    proxy: Option<String>,

    /// Deadline for native attempts, in milliseconds
    #[arg(long)]
    native_deadline_ms: Option<u64>,

    /// Deadline for streaming-library attempts, in milliseconds
    #[arg(long)]
    streaming_deadline_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the attempt plan for a URL without playing it
    Plan {
        /// Video URL
        url: String,
    },

    /// Play a URL, exiting non-zero when every attempt fails
    Play {
        /// Video URL
        url: String,
    },

    /// Read URLs from stdin, one per line
    Interactive,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<FallbackConfig> {
        let mut config = match &self.config {
            Some(path) => FallbackConfig::from_file(path)?,
            None => FallbackConfig::default(),
        };

        if let Some(proxy) = &self.proxy {
            config.proxy_base = proxy.clone();
        }
        if let Some(ms) = self.native_deadline_ms {
            config.native_deadline_ms = ms;
        }
        if let Some(ms) = self.streaming_deadline_ms {
            config.streaming_deadline_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    playchain_core::init();
    let config = cli.load_config()?;

    match &cli.command {
        Commands::Plan { url } => {
            commands::plan(url, &config, &cli.format)?;
        }
        Commands::Play { url } => {
            let played = commands::play(url, &config, &cli.format).await?;
            if !played {
                std::process::exit(1);
            }
        }
        Commands::Interactive => {
            commands::interactive(&config, &cli.format).await?;
        }
    }

    Ok(())
}
