// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling from one or more seed URLs
// - Depth limit, --allow/--disallow patterns, host and child-path scoping
// - Every discovered link printed once, in discovery order
// - Polite crawling with a configurable delay between pages
//
// Submodules:
// - config: what to crawl and how to filter
// - state: frontier queue and the visited / printed registries
// - links: URL resolution helpers
// - filter: the link admission rules
// - output: writes discovered links
// - driver: the crawl loop tying it all together
// =============================================================================

mod config;
mod driver;
mod filter;
mod links;
mod output;
mod state;

// Re-export the pieces main.rs needs
pub use config::{Anchor, CrawlConfig, FilterConfig};
pub use driver::Crawler;
pub use output::{Emitter, OutputFormat};
