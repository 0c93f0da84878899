// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   crawl-links [OPTIONS] <URLS>...
//
// Values are validated while parsing (URLs, regex patterns, numbers), so a
// bad invocation is rejected with a usage error before anything is fetched.
// `Cli` then converts itself into the crawl and renderer settings.
// =============================================================================

use clap::Parser;
use regex::Regex;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

use crate::crawl::{Anchor, CrawlConfig, FilterConfig, OutputFormat};
use crate::render::{
    RenderOptions, RendererKind, ResourceKind, DEFAULT_USER_AGENT, DEFAULT_WEBDRIVER_URL,
};

#[derive(Parser, Debug)]
#[command(
    name = "crawl-links",
    version = "0.1.0",
    about = "Crawl websites breadth-first and list the links found",
    long_about = "crawl-links visits the given URLs in a real browser, prints every link it finds \
                  (once each), and optionally follows them to a given depth. Links go to stdout, \
                  progress and warnings to stderr."
)]
pub struct Cli {
    /// Seed URLs to start crawling from
    #[arg(required = true, value_parser = parse_seed)]
    pub urls: Vec<Url>,

    /// Only follow links on the same host
    #[arg(long)]
    pub same_host: bool,

    /// Only follow links whose path is below the anchor URL's path
    #[arg(long, visible_alias = "child")]
    pub children: bool,

    /// Regex pattern URLs must match to be listed
    #[arg(long, value_name = "PATTERN", value_parser = parse_pattern)]
    pub allow: Option<Regex>,

    /// Regex pattern for URLs to skip (wins over --allow)
    #[arg(long, value_name = "PATTERN", value_parser = parse_pattern)]
    pub disallow: Option<Regex>,

    /// Seconds to wait between page visits (fractions allowed)
    #[arg(long, value_name = "SECONDS", default_value = "0", value_parser = parse_seconds)]
    pub delay: Duration,

    /// Maximum depth of the crawl (1 = only the seed pages are visited)
    #[arg(long, value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub depth: u32,

    /// Do not run JavaScript on visited pages
    #[arg(long)]
    pub disable_javascript: bool,

    /// Compare host/path filters against the seed URL or the current page
    #[arg(long, value_enum, default_value_t = Anchor::Origin)]
    pub anchor: Anchor,

    /// How pages are loaded
    #[arg(long, value_enum, default_value_t = RendererKind::Webdriver)]
    pub renderer: RendererKind,

    /// WebDriver server to drive the browser through
    #[arg(long, value_name = "URL", env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Resource kinds the browser should not load (repeatable)
    #[arg(long = "block", value_name = "KIND", value_enum)]
    pub blocked: Vec<ResourceKind>,

    /// User agent string sent with every request
    #[arg(long, value_name = "UA", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Seconds before a single page load is given up on
    #[arg(long, value_name = "SECONDS", default_value = "30", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Print one JSON object per link instead of bare URLs
    #[arg(long)]
    pub json: bool,

    /// Show debug output on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        let filter = FilterConfig::new()
            .with_allow(self.allow.clone())
            .with_disallow(self.disallow.clone())
            .with_same_host_only(self.same_host)
            .with_child_only(self.children)
            .with_anchor(self.anchor);

        CrawlConfig::new(self.urls.clone())
            .with_max_depth(self.depth)
            .with_delay(self.delay)
            .with_filter(filter)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            execute_scripts: !self.disable_javascript,
            blocked: self.blocked.iter().copied().collect::<BTreeSet<_>>(),
            user_agent: self.user_agent.clone(),
            headless: !self.headed,
            navigation_timeout: self.timeout,
            webdriver_url: self.webdriver_url.clone(),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }
}

// Seeds are parsed like any other link: absolute, fragment dropped
fn parse_seed(value: &str) -> Result<Url, String> {
    let mut url = Url::parse(value).map_err(|e| format!("invalid URL '{}': {}", value, e))?;
    url.set_fragment(None);
    Ok(url)
}

fn parse_pattern(value: &str) -> Result<Regex, String> {
    Regex::new(value).map_err(|e| e.to_string())
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    Duration::try_from_secs_f64(seconds).map_err(|_| format!("'{}' must be a non-negative number", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("crawl-links").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["https://ex.com/docs/#intro"]).unwrap();
        let config = cli.crawl_config();

        assert_eq!(config.seeds[0].as_str(), "https://ex.com/docs/");
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.delay, Duration::ZERO);
        assert!(config.filter.allow.is_none());
        assert!(!config.filter.same_host_only);
        assert_eq!(config.filter.anchor, Anchor::Origin);
        assert_eq!(cli.renderer, RendererKind::Webdriver);
        assert!(cli.render_options().execute_scripts);
        assert_eq!(cli.output_format(), OutputFormat::Plain);
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "https://a.com/",
            "https://b.com/",
            "--same-host",
            "--child",
            "--allow",
            "docs",
            "--disallow",
            r"\.pdf$",
            "--delay",
            "1.5",
            "--depth",
            "3",
            "--disable-javascript",
            "--anchor",
            "page",
            "--block",
            "images",
            "--block",
            "popups",
            "--headed",
            "--json",
        ])
        .unwrap();

        let config = cli.crawl_config();
        assert_eq!(config.seeds.len(), 2);
        assert!(config.filter.same_host_only);
        assert!(config.filter.child_only);
        assert!(config.filter.allow.unwrap().is_match("https://a.com/docs"));
        assert!(config.filter.disallow.unwrap().is_match("https://a.com/x.pdf"));
        assert_eq!(config.delay, Duration::from_millis(1500));
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.filter.anchor, Anchor::Page);

        let options = cli.render_options();
        assert!(!options.execute_scripts);
        assert!(!options.headless);
        assert_eq!(options.blocked.len(), 2);
        assert!(options.blocked.contains(&ResourceKind::Images));
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_usage_errors() {
        // No seeds
        assert!(parse(&[]).is_err());
        assert!(parse(&["--same-host"]).is_err());
        // Bad values
        assert!(parse(&["not a url"]).is_err());
        assert!(parse(&["https://ex.com/", "--allow", "("]).is_err());
        assert!(parse(&["https://ex.com/", "--delay", "-1"]).is_err());
        assert!(parse(&["https://ex.com/", "--delay", "soon"]).is_err());
        assert!(parse(&["https://ex.com/", "--depth", "0"]).is_err());
    }
}
