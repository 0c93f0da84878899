// src/crawl/config.rs
// =============================================================================
// Settings that control what a crawl follows and prints.
//
// CrawlConfig groups the traversal knobs (seeds, depth, delay) and owns a
// FilterConfig that the filter engine reads for every candidate link.
// Both use the `with_*` builder style so tests can spell out only what
// they care about.
// =============================================================================

use regex::Regex;
use std::time::Duration;
use url::Url;

/// Default maximum depth: the seeds plus the links printed from them
pub const DEFAULT_MAX_DEPTH: u32 = 1;

/// Default pause between page visits
pub const DEFAULT_DELAY: Duration = Duration::ZERO;

/// Which URL host/path filters compare a candidate against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Anchor {
    /// The seed URL that started this branch of the crawl
    #[default]
    Origin,
    /// The page the link was found on
    Page,
}

/// Link filtering rules
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Links must match this pattern (if set)
    pub allow: Option<Regex>,
    /// Links matching this pattern are dropped, even if `allow` matches
    pub disallow: Option<Regex>,
    /// Only links on the anchor's host
    pub same_host_only: bool,
    /// Only links on the anchor's host, below the anchor's path
    pub child_only: bool,
    pub anchor: Anchor,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow(mut self, pattern: Option<Regex>) -> Self {
        self.allow = pattern;
        self
    }

    pub fn with_disallow(mut self, pattern: Option<Regex>) -> Self {
        self.disallow = pattern;
        self
    }

    pub fn with_same_host_only(mut self, enabled: bool) -> Self {
        self.same_host_only = enabled;
        self
    }

    pub fn with_child_only(mut self, enabled: bool) -> Self {
        self.child_only = enabled;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Everything the traversal driver needs besides a renderer
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seeds: Vec<Url>,
    /// Deepest level that will be fetched (seeds are level 1)
    pub max_depth: u32,
    /// Pause between page visits
    pub delay: Duration,
    pub filter: FilterConfig,
}

impl CrawlConfig {
    pub fn new(seeds: Vec<Url>) -> Self {
        Self {
            seeds,
            max_depth: DEFAULT_MAX_DEPTH,
            delay: DEFAULT_DELAY,
            filter: FilterConfig::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }
}
