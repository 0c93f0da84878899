// src/render/webdriver.rs
// =============================================================================
// Renders pages in a real Chrome, driven over WebDriver with fantoccini.
//
// Requires a WebDriver server (chromedriver, selenium, ...) listening at
// --webdriver-url. One browser session is used for the whole crawl.
//
// Waiting for "network idle":
//   WebDriver's navigation returns once the document has loaded, but pages
//   often keep fetching (XHR, lazy images, late scripts) and add links as
//   they go. After navigation we poll the Resource Timing buffer and wait
//   until the number of loaded resources stops changing for a short quiet
//   window, giving up after the navigation timeout.
// =============================================================================

use fantoccini::{Client, ClientBuilder, Locator};
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace, warn};
use url::Url;

use super::{Navigation, RenderError, RenderOptions, Renderer, ResourceKind};

/// How often the resource count is sampled while waiting for idle
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How long the resource count must stay unchanged to count as idle
const IDLE_QUIET_WINDOW: Duration = Duration::from_millis(500);

const RESOURCE_COUNT_SCRIPT: &str = "return performance.getEntriesByType('resource').length;";

const STATUS_SCRIPT: &str = "const e = performance.getEntriesByType('navigation')[0]; \
    return e && e.responseStatus ? e.responseStatus : null;";

// `a.href` is resolved by the browser, honouring <base href>
const ANCHORS_SCRIPT: &str = "return Array.from(document.querySelectorAll('a')) \
    .map(a => a.href) \
    .filter(h => typeof h === 'string' && h);";

pub struct WebDriverRenderer {
    client: Client,
    idle_timeout: Duration,
}

impl WebDriverRenderer {
    // Opens a browser session configured from `options`.
    //
    // Fails with RenderError::Init if the WebDriver server is unreachable
    // or refuses the session.
    pub async fn connect(options: &RenderOptions) -> Result<Self, RenderError> {
        debug!("Connecting to WebDriver at {}", options.webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(capabilities(options))
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| {
                RenderError::Init(format!(
                    "could not open a session at {}: {}",
                    options.webdriver_url, e
                ))
            })?;

        Ok(Self {
            client,
            idle_timeout: options.navigation_timeout,
        })
    }

    async fn load(&mut self, url: &Url) -> Result<Navigation, RenderError> {
        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        self.wait_for_network_idle().await;

        let status = match self.client.execute(STATUS_SCRIPT, vec![]).await {
            Ok(value) => value.as_u64().and_then(|code| u16::try_from(code).ok()),
            Err(e) => {
                trace!("Status not available for {}: {}", url, e);
                None
            }
        };

        let current = match self.client.current_url().await {
            Ok(current) => current,
            Err(e) => {
                debug!("Could not read current URL, using {}: {}", url, e);
                url.clone()
            }
        };

        Ok(Navigation { status, url: current })
    }

    async fn wait_for_network_idle(&self) {
        let deadline = Instant::now() + self.idle_timeout;
        let mut last_count = None;
        let mut quiet_since = Instant::now();

        loop {
            let count = match self.client.execute(RESOURCE_COUNT_SCRIPT, vec![]).await {
                Ok(value) => value.as_u64(),
                Err(e) => {
                    // Can't observe the network (e.g. scripts blocked), treat as settled
                    trace!("Resource timing unavailable: {}", e);
                    return;
                }
            };

            let now = Instant::now();
            if count != last_count {
                last_count = count;
                quiet_since = now;
            } else if now.duration_since(quiet_since) >= IDLE_QUIET_WINDOW {
                trace!("Network idle after {:?} resources", count);
                return;
            }

            if now >= deadline {
                warn!("Page did not reach network idle within {:?}", self.idle_timeout);
                return;
            }

            sleep(IDLE_POLL_INTERVAL).await;
        }
    }

    async fn anchors(&mut self) -> Result<Vec<String>, RenderError> {
        match self.client.execute(ANCHORS_SCRIPT, vec![]).await {
            Ok(value) => serde_json::from_value(value)
                .map_err(|e| RenderError::Extraction(e.to_string())),
            Err(e) => {
                debug!("Script extraction failed ({}), reading elements instead", e);
                self.anchors_from_elements().await
            }
        }
    }

    // Slower path: one WebDriver round trip per anchor
    async fn anchors_from_elements(&mut self) -> Result<Vec<String>, RenderError> {
        let elements = self
            .client
            .find_all(Locator::Css("a[href]"))
            .await
            .map_err(|e| RenderError::Extraction(e.to_string()))?;

        let mut hrefs = Vec::with_capacity(elements.len());
        for element in elements {
            match element.prop("href").await {
                Ok(Some(href)) if !href.is_empty() => hrefs.push(href),
                Ok(_) => {}
                // Element went stale while we were reading; skip it
                Err(e) => trace!("Skipping anchor: {}", e),
            }
        }
        Ok(hrefs)
    }
}

impl Renderer for WebDriverRenderer {
    fn navigate<'a>(&'a mut self, url: &'a Url) -> BoxFuture<'a, Result<Navigation, RenderError>> {
        Box::pin(self.load(url))
    }

    fn extract_anchor_hrefs(&mut self) -> BoxFuture<'_, Result<Vec<String>, RenderError>> {
        Box::pin(self.anchors())
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), RenderError>> {
        let client = self.client.clone();
        Box::pin(async move {
            client
                .close()
                .await
                .map_err(|e| RenderError::Teardown(e.to_string()))
        })
    }
}

// Builds the W3C + Chrome capabilities for a session.
//
// - JavaScript and blocked resource kinds -> Chrome content settings
// - headless and user agent -> Chrome command-line arguments
// - page load / script timeouts -> the standard "timeouts" capability
fn capabilities(options: &RenderOptions) -> Map<String, Value> {
    let mut caps = Map::new();

    let timeout_ms = u64::try_from(options.navigation_timeout.as_millis()).unwrap_or(u64::MAX);
    caps.insert("pageLoadStrategy".to_string(), json!("normal"));
    caps.insert(
        "timeouts".to_string(),
        json!({ "pageLoad": timeout_ms, "script": timeout_ms }),
    );

    let args: Vec<Value> = chrome_arguments(options)
        .into_iter()
        .map(Value::String)
        .collect();

    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "prefs": Value::Object(chrome_preferences(options)),
        }),
    );

    caps
}

fn chrome_arguments(options: &RenderOptions) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-gpu".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        "--mute-audio".to_string(),
        format!("--user-agent={}", options.user_agent),
    ];
    if options.headless {
        args.push("--headless=new".to_string());
    }
    args
}

// Chrome content settings: 1 = allow, 2 = block
fn chrome_preferences(options: &RenderOptions) -> Map<String, Value> {
    let mut prefs = Map::new();

    let javascript = if options.execute_scripts { 1 } else { 2 };
    prefs.insert(
        "profile.managed_default_content_settings.javascript".to_string(),
        javascript.into(),
    );

    for kind in &options.blocked {
        prefs.insert(
            format!("profile.managed_default_content_settings.{}", content_setting(*kind)),
            2.into(),
        );
    }

    prefs
}

fn content_setting(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Images => "images",
        ResourceKind::Plugins => "plugins",
        ResourceKind::Popups => "popups",
        ResourceKind::Notifications => "notifications",
        ResourceKind::Geolocation => "geolocation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capabilities() {
        let caps = capabilities(&RenderOptions::default());

        assert_eq!(caps["timeouts"]["pageLoad"], 30_000);
        let chrome = &caps["goog:chromeOptions"];
        let args = chrome["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless=new")));
        assert!(args
            .iter()
            .any(|a| a.as_str().unwrap().starts_with("--user-agent=Mozilla/5.0")));
        assert_eq!(
            chrome["prefs"]["profile.managed_default_content_settings.javascript"],
            1
        );
    }

    #[test]
    fn test_anchor_script_reads_resolved_href() {
        assert!(ANCHORS_SCRIPT.contains("a => a.href"));
        assert!(!ANCHORS_SCRIPT.contains("getAttribute"));
        // Empty and non-string (SVG) hrefs are dropped
        assert!(ANCHORS_SCRIPT.contains("typeof h === 'string' && h"));
    }

    #[test]
    fn test_disabled_javascript_and_blocked_resources() {
        let options = RenderOptions {
            execute_scripts: false,
            blocked: [ResourceKind::Images, ResourceKind::Popups].into_iter().collect(),
            headless: false,
            ..RenderOptions::default()
        };

        let prefs = chrome_preferences(&options);
        assert_eq!(prefs["profile.managed_default_content_settings.javascript"], 2);
        assert_eq!(prefs["profile.managed_default_content_settings.images"], 2);
        assert_eq!(prefs["profile.managed_default_content_settings.popups"], 2);
        assert!(!prefs.contains_key("profile.managed_default_content_settings.plugins"));

        assert!(!chrome_arguments(&options).contains(&"--headless=new".to_string()));
    }
}
