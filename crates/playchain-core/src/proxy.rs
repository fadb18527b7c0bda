//! CORS proxy URL rewriting

use crate::config::DEFAULT_PROXY_BASE;

/// Rewrites URLs through a cross-origin relay: `base + percent-encoded(url)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsProxy {
    base: String,
}

impl CorsProxy {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn rewrite(&self, url: &str) -> String {
        format!("{}{}", self.base, urlencoding::encode(url))
    }
}

impl Default for CorsProxy {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_BASE)
    }
}
