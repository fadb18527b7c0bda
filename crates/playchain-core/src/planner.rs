//! Strategy planner
//!
//! Maps a request to the ordered list of attempts. Pure: no I/O, same
//! input always gives the same plan.
//!
//! | Extension           | Attempts                                                         |
//! |---------------------|------------------------------------------------------------------|
//! | `m3u8`              | adaptive(original), adaptive(proxied)                            |
//! | `ts`, `flv`         | segmented(original), native(original)                            |
//! | `mp4` `mkv` `webm` `mov` | native(original), native(proxied)                           |
//! | anything else       | native, segmented, adaptive (original), native, adaptive (proxied) |

use crate::proxy::CorsProxy;
use crate::types::{AttemptSpec, BackendKind, PlaybackRequest, UrlVariant};
use url::Url;

use BackendKind::{AdaptiveStreaming, Native, SegmentedTransport};
use UrlVariant::{Original, Proxied};

const ADAPTIVE_PLAN: &[(BackendKind, UrlVariant)] =
    &[(AdaptiveStreaming, Original), (AdaptiveStreaming, Proxied)];

const SEGMENTED_PLAN: &[(BackendKind, UrlVariant)] =
    &[(SegmentedTransport, Original), (Native, Original)];

const NATIVE_PLAN: &[(BackendKind, UrlVariant)] = &[(Native, Original), (Native, Proxied)];

const UNKNOWN_PLAN: &[(BackendKind, UrlVariant)] = &[
    (Native, Original),
    (SegmentedTransport, Original),
    (AdaptiveStreaming, Original),
    (Native, Proxied),
    (AdaptiveStreaming, Proxied),
];

/// Lowercase extension of the URL's path component.
///
/// Unparseable URLs and paths without a dot in their last segment give an
/// empty hint.
pub fn extension_hint(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    let last_segment = parsed.path().rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Ordered (backend, URL form) pairs for an extension hint
pub fn strategy_for(extension: &str) -> &'static [(BackendKind, UrlVariant)] {
    match extension {
        "m3u8" => ADAPTIVE_PLAN,
        "ts" | "flv" => SEGMENTED_PLAN,
        "mp4" | "mkv" | "webm" | "mov" => NATIVE_PLAN,
        _ => UNKNOWN_PLAN,
    }
}

/// Builds attempt plans
#[derive(Debug, Clone, Default)]
pub struct StrategyPlanner {
    proxy: CorsProxy,
}

impl StrategyPlanner {
    pub fn new(proxy: CorsProxy) -> Self {
        Self { proxy }
    }

    pub fn proxy(&self) -> &CorsProxy {
        &self.proxy
    }

    /// Resolve the plan for a request
    pub fn plan(&self, request: &PlaybackRequest) -> Vec<AttemptSpec> {
        strategy_for(request.extension())
            .iter()
            .map(|&(backend, variant)| AttemptSpec {
                backend,
                variant,
                url: match variant {
                    Original => request.url().to_string(),
                    Proxied => self.proxy.rewrite(request.url()),
                },
            })
            .collect()
    }

    /// Plan straight from raw input; blank input yields no plan
    pub fn plan_input(&self, input: &str) -> Option<Vec<AttemptSpec>> {
        PlaybackRequest::new(input).ok().map(|request| self.plan(&request))
    }
}
