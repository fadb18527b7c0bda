//! Output formatting for CLI

use playchain_core::{AttemptSpec, PlaybackOutcome};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

/// Attempt plan for one URL
#[derive(Debug, Serialize)]
pub struct PlanReport<'a> {
    pub url: &'a str,
    pub extension: &'a str,
    pub attempts: &'a [AttemptSpec],
}

#[derive(Debug, Serialize)]
pub struct FailureEntry {
    pub backend: String,
    pub variant: String,
    pub url: String,
    pub code: &'static str,
    pub reason: String,
}

/// How a playback request ended
#[derive(Debug, Serialize)]
pub struct PlayReport {
    pub url: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playing: Option<AttemptSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureEntry>,
}

impl PlayReport {
    pub fn new(url: &str, outcome: &PlaybackOutcome) -> Self {
        let mut report = PlayReport {
            url: url.trim().to_string(),
            outcome: "ignored",
            playing: None,
            attempt: None,
            failures: Vec::new(),
        };

        match outcome {
            PlaybackOutcome::Played { index, spec } => {
                report.outcome = "played";
                report.playing = Some(spec.clone());
                report.attempt = Some(index + 1);
            }
            PlaybackOutcome::Exhausted { failures } => {
                report.outcome = "exhausted";
                report.failures = failures
                    .iter()
                    .map(|(spec, err)| FailureEntry {
                        backend: spec.backend.to_string(),
                        variant: spec.variant.to_string(),
                        url: spec.url.clone(),
                        code: err.error_code(),
                        reason: err.to_string(),
                    })
                    .collect();
            }
            PlaybackOutcome::Superseded => report.outcome = "superseded",
            PlaybackOutcome::Ignored => {}
        }

        report
    }
}

/// Render a plan in the selected format
pub fn format_plan(report: &PlanReport<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Text => {
            let hint = if report.extension.is_empty() {
                "(none)"
            } else {
                report.extension
            };
            let mut out = format!("Plan for {}\n  Extension: {}\n", report.url, hint);
            for (i, spec) in report.attempts.iter().enumerate() {
                out.push_str(&format!("  {}. {} -> {}\n", i + 1, spec, spec.url));
            }
            out
        }
        OutputFormat::Table => {
            let mut out = format!("{:<3} {:<22} {:<9} {}\n", "#", "BACKEND", "VARIANT", "URL");
            for (i, spec) in report.attempts.iter().enumerate() {
                out.push_str(&format!(
                    "{:<3} {:<22} {:<9} {}\n",
                    i + 1,
                    spec.backend.to_string(),
                    spec.variant.to_string(),
                    spec.url
                ));
            }
            out
        }
    }
}

/// Render a playback report in the selected format
pub fn format_play(report: &PlayReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Text | OutputFormat::Table => {
            let mut out = format!("{}: {}\n", report.url, report.outcome);
            if let (Some(spec), Some(attempt)) = (&report.playing, report.attempt) {
                out.push_str(&format!("  Playing via attempt {} ({})\n", attempt, spec));
            }
            for (i, failure) in report.failures.iter().enumerate() {
                out.push_str(&format!(
                    "  {}. {}({}) [{}] {}\n",
                    i + 1,
                    failure.backend,
                    failure.variant,
                    failure.code,
                    failure.reason
                ));
            }
            out
        }
    }
}

fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}
