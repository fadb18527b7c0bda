//! Fallback configuration
//!
//! Deadlines, proxy base and backend tuning. Loadable from JSON; every
//! field has a default so partial files are fine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default CORS relay; the original URL is percent-encoded after it
pub const DEFAULT_PROXY_BASE: &str = "https://corsproxy.io/?";

/// Seek strategy for the segmented-transport backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeekType {
    /// HTTP range requests
    Range,
    /// Query-parameter based seeking
    Param,
}

/// Live playback tuning for the segmented-transport backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentedTuning {
    /// Demux in a worker
    pub enable_worker: bool,
    /// Lazy-load window (seconds)
    pub lazy_load_max_duration: f64,
    pub seek_type: SeekType,
    /// Jump forward when latency grows
    pub latency_chasing: bool,
    /// Latency that triggers a catch-up jump (seconds)
    pub max_latency: f64,
    /// Buffer kept after a catch-up jump (seconds)
    pub min_remain: f64,
}

impl Default for SegmentedTuning {
    fn default() -> Self {
        Self {
            enable_worker: true,
            lazy_load_max_duration: 3.0 * 60.0,
            seek_type: SeekType::Range,
            latency_chasing: true,
            max_latency: 15.0,
            min_remain: 0.3,
        }
    }
}

/// Options for the adaptive-streaming backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveOptions {
    pub enable_worker: bool,
    pub low_latency_mode: bool,
}

impl Default for AdaptiveOptions {
    fn default() -> Self {
        Self {
            enable_worker: true,
            low_latency_mode: true,
        }
    }
}

/// Settings for the headless surface and HTTP-probing backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Bytes fetched when sniffing a container
    pub probe_bytes: usize,
    /// Start stream sources as soon as enough is buffered.
    ///
    /// The adaptive-streaming backend never calls `play()` itself, so its
    /// attempts can only reach playing with this on. Validation rejects `false`.
    pub autoplay: bool,
    /// Buffered media needed before a stream source starts (seconds)
    pub start_threshold: f64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 8000,
            probe_bytes: 4096,
            autoplay: true,
            start_threshold: 0.5,
        }
    }
}

/// Fallback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Prefix for proxy-rewritten URLs
    pub proxy_base: String,
    /// Deadline for native attempts in milliseconds
    pub native_deadline_ms: u64,
    /// Deadline for segmented-transport and adaptive-streaming attempts in milliseconds
    pub streaming_deadline_ms: u64,
    pub segmented: SegmentedTuning,
    pub adaptive: AdaptiveOptions,
    pub headless: HeadlessConfig,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
            native_deadline_ms: 5000,
            streaming_deadline_ms: 10000,
            segmented: SegmentedTuning::default(),
            adaptive: AdaptiveOptions::default(),
            headless: HeadlessConfig::default(),
        }
    }
}

impl FallbackConfig {
    /// Parse from JSON and validate
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FallbackConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.proxy_base.trim().is_empty() {
            return Err(Error::InvalidConfig("proxy_base must not be empty".into()));
        }
        if self.native_deadline_ms == 0 || self.streaming_deadline_ms == 0 {
            return Err(Error::InvalidConfig("deadlines must be non-zero".into()));
        }
        // Native attempts get the shorter wait
        if self.native_deadline_ms >= self.streaming_deadline_ms {
            return Err(Error::InvalidConfig(format!(
                "native deadline ({}ms) must be shorter than streaming deadline ({}ms)",
                self.native_deadline_ms, self.streaming_deadline_ms
            )));
        }
        if self.segmented.max_latency <= self.segmented.min_remain {
            return Err(Error::InvalidConfig(
                "segmented max_latency must exceed min_remain".into(),
            ));
        }
        if !self.headless.autoplay {
            return Err(Error::InvalidConfig(
                "headless autoplay is required for adaptive-streaming attempts".into(),
            ));
        }
        Ok(())
    }

    pub fn native_deadline(&self) -> Duration {
        Duration::from_millis(self.native_deadline_ms)
    }

    pub fn streaming_deadline(&self) -> Duration {
        Duration::from_millis(self.streaming_deadline_ms)
    }
}
