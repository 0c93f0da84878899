// src/render/mod.rs
// =============================================================================
// The rendering engine boundary.
//
// The crawler never talks to a browser or HTTP client directly. It talks to
// a `Renderer`, which can:
//   1. navigate to a URL and wait until the page has settled
//   2. hand back the href of every <a> on the current page
//   3. shut down
//
// Implementations:
// - webdriver: a real Chrome driven over WebDriver (runs JavaScript)
// - http: a plain GET + HTML parse (fast, no JavaScript)
//
// The trait returns boxed futures so it can be used as `Box<dyn Renderer>`
// and picked at runtime from the command line. Tests plug in a fake.
// =============================================================================

mod http;
mod webdriver;

pub use http::HttpRenderer;
pub use webdriver::WebDriverRenderer;

use futures::future::BoxFuture;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// User agent the crawler presents unless told otherwise (desktop Chrome)
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Per-navigation timeout (page load and scripts)
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the rendering engine
///
/// `Navigation` and `Extraction` only affect a single page; the crawler logs
/// them and moves on. `Init` and `Teardown` abort the whole crawl.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to start renderer: {0}")]
    Init(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("could not read links from page: {0}")]
    Extraction(String),
    #[error("failed to shut down renderer: {0}")]
    Teardown(String),
}

impl RenderError {
    /// True for errors that only affect the current page
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RenderError::Navigation(_) | RenderError::Extraction(_))
    }
}

/// Kinds of sub-resources the browser can be told not to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum ResourceKind {
    Images,
    Plugins,
    Popups,
    Notifications,
    Geolocation,
}

/// Which renderer implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RendererKind {
    /// Chrome over WebDriver
    #[default]
    Webdriver,
    /// Plain HTTP GET, no JavaScript
    Http,
}

/// How the renderer should be set up
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub execute_scripts: bool,
    pub blocked: BTreeSet<ResourceKind>,
    pub user_agent: String,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub webdriver_url: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            execute_scripts: true,
            blocked: BTreeSet::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
        }
    }
}

/// Outcome of a successful navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// HTTP status of the main document, if the engine exposes it
    pub status: Option<u16>,
    /// Document URL after redirects
    pub url: Url,
}

impl Navigation {
    /// Unknown status counts as success; only a known non-2xx is reported
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |code| (200..300).contains(&code))
    }
}

pub trait Renderer: Send {
    /// Loads `url` and waits until the page has settled
    fn navigate<'a>(&'a mut self, url: &'a Url) -> BoxFuture<'a, Result<Navigation, RenderError>>;

    /// Href of every anchor on the current page, in document order
    ///
    /// Values are absolute when the engine resolves them (honouring
    /// `<base href>`); the driver resolves anything still relative.
    fn extract_anchor_hrefs(&mut self) -> BoxFuture<'_, Result<Vec<String>, RenderError>>;

    /// Releases the underlying session
    fn close(&mut self) -> BoxFuture<'_, Result<(), RenderError>>;
}

// Starts the selected renderer with the given options.
//
// Options are applied at startup because WebDriver sessions can't change
// most of them (JavaScript, content settings, user agent) once created.
pub async fn initialize(
    kind: RendererKind,
    options: &RenderOptions,
) -> Result<Box<dyn Renderer>, RenderError> {
    match kind {
        RendererKind::Webdriver => Ok(Box::new(WebDriverRenderer::connect(options).await?)),
        RendererKind::Http => Ok(Box::new(HttpRenderer::new(options)?)),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BoxFuture instead of `async fn` in the trait?
//    - We want `Box<dyn Renderer>` so the renderer can be chosen at runtime
//    - Trait objects need every method's return type to be known, so each
//      async method returns a pinned, boxed future instead
//
// 2. What does thiserror do?
//    - #[derive(Error)] implements std::error::Error for our enum
//    - #[error("...")] becomes the Display message
//    - anyhow can then wrap RenderError with `?` in the driver
// -----------------------------------------------------------------------------
