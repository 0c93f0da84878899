// src/crawl/driver.rs
// =============================================================================
// The crawl loop: breadth-first over the frontier, one page at a time.
//
// How it works:
// 1. Push every seed into the frontier at depth 1
// 2. Pop the oldest entry (FIFO = breadth-first)
// 3. Skip it if it's too deep or already visited (no request made)
// 4. Mark it visited and ask the renderer to load it
// 5. Filter the page's links; print the new ones right away
// 6. If we still have depth budget, queue the links at depth + 1
// 7. Wait --delay before the next page (only if more work is queued),
//    also after a page that failed to load
// 8. When the frontier is empty, close the renderer
//
// A page that fails to load is logged and skipped; the crawl goes on.
// Only renderer startup/shutdown failures (or a broken output stream)
// stop the whole run.
// =============================================================================

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info, trace, warn};
use url::Url;

use super::config::CrawlConfig;
use super::filter::admit;
use super::output::Emitter;
use super::state::{CrawlState, FrontierEntry};
use crate::render::Renderer;

/// Counters reported at the end of a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Pages the renderer loaded successfully
    pub pages: usize,
    /// Pages that failed to load
    pub failures: usize,
    /// Links written to the output
    pub printed: usize,
}

pub struct Crawler<W: Write> {
    config: CrawlConfig,
    renderer: Box<dyn Renderer>,
    emitter: Emitter<W>,
    state: CrawlState,
    summary: CrawlSummary,
}

impl<W: Write> Crawler<W> {
    pub fn new(config: CrawlConfig, renderer: Box<dyn Renderer>, emitter: Emitter<W>) -> Self {
        Self {
            config,
            renderer,
            emitter,
            state: CrawlState::new(),
            summary: CrawlSummary::default(),
        }
    }

    // Runs the crawl to completion and shuts the renderer down.
    //
    // The renderer is closed even when the crawl itself fails, and a crawl
    // error is reported in preference to a shutdown error.
    //
    // Returns: the crawl summary and the output writer
    pub async fn run(mut self) -> Result<(CrawlSummary, W)> {
        let crawled = self.crawl().await;
        let closed = self.renderer.close().await;

        crawled?;
        closed.context("Renderer shutdown failed")?;

        info!(
            "Done: {} page(s) visited, {} failed, {} link(s) found",
            self.summary.pages, self.summary.failures, self.summary.printed
        );
        Ok((self.summary, self.emitter.into_inner()))
    }

    async fn crawl(&mut self) -> Result<()> {
        for seed in &self.config.seeds {
            self.state.frontier.push(FrontierEntry::seed(seed.clone()));
        }

        while let Some(entry) = self.state.frontier.pop() {
            if entry.depth > self.config.max_depth || self.state.visited.contains(&entry.url) {
                trace!("Skipping {} (depth {})", entry.url, entry.depth);
                continue;
            }

            // Paced even when the page failed: the request still went out
            self.visit(&entry).await?;

            if !self.state.frontier.is_empty() && !self.config.delay.is_zero() {
                trace!("Waiting {:?} before next page", self.config.delay);
                tokio::time::sleep(self.config.delay).await;
            }
        }

        Ok(())
    }

    // Processes one frontier entry.
    //
    // A page that fails to load is counted and skipped; Err is only returned
    // for things that should end the crawl
    async fn visit(&mut self, entry: &FrontierEntry) -> Result<()> {
        self.state.visited.insert(&entry.url);

        if self.config.max_depth > 1 {
            info!("Visiting: {} (depth: {})", entry.url, entry.depth);
        } else {
            info!("Visiting: {}", entry.url);
        }

        let (page, hrefs) = match self.render(&entry.url).await? {
            Some(rendered) => rendered,
            None => {
                self.summary.failures += 1;
                return Ok(());
            }
        };
        self.summary.pages += 1;

        // A redirect target is the same page; don't expand or print it again
        self.state.visited.insert(&page);

        let links = self.admissible_links(&hrefs, &page, &entry.origin);
        debug!("{} of {} link(s) admitted on {}", links.len(), hrefs.len(), page);

        for link in &links {
            if self.state.printed.insert(link) {
                self.emitter.emit(link, entry.depth, &page, &entry.origin)?;
                self.summary.printed += 1;
            }
        }

        if entry.depth < self.config.max_depth {
            for link in links {
                self.state.frontier.push(entry.child(link));
            }
            trace!("{} page(s) queued", self.state.frontier.len());
        }

        Ok(())
    }

    // Loads a page and reads its links.
    //
    // Returns: Some((document URL, hrefs)), or None when the page failed
    // and should be skipped. Non-recoverable renderer errors are returned.
    async fn render(&mut self, url: &Url) -> Result<Option<(Url, Vec<String>)>> {
        let navigation = match self.renderer.navigate(url).await {
            Ok(navigation) => navigation,
            Err(e) if e.is_recoverable() => {
                warn!("Failed to fetch {}: {}", url, e);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if !navigation.is_success() {
            if let Some(status) = navigation.status {
                warn!("{} returned status {}", url, status);
            }
        }
        if navigation.url != *url {
            debug!("{} ended up at {}", url, navigation.url);
        }

        match self.renderer.extract_anchor_hrefs().await {
            Ok(hrefs) => Ok(Some((navigation.url, hrefs))),
            Err(e) if e.is_recoverable() => {
                warn!("Failed to fetch {}: {}", url, e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    // Runs every href through the filter, dropping duplicates but keeping
    // the order in which links appear on the page
    fn admissible_links(&self, hrefs: &[String], page: &Url, origin: &Url) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for href in hrefs {
            match admit(href, page, origin, &self.config.filter, &self.state.visited) {
                Ok(link) => {
                    if seen.insert(link.clone()) {
                        links.push(link);
                    }
                }
                Err(reason) => trace!("Rejected {:?}: {}", href, reason),
            }
        }

        links
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is `visited` updated when a page is popped, not when it's queued?
//    - A URL can be queued twice before either copy is popped
//    - Marking on pop means whichever copy comes first does the work
//    - The later copy finds it visited and is dropped without a request
//
// 2. Why print links before they are visited?
//    - Output is "every link we found", not "every page we loaded"
//    - With --depth 1 the linked pages are never loaded at all
//
// 3. What is Box<dyn Renderer>?
//    - A trait object: "some type that implements Renderer"
//    - main.rs picks WebDriver or HTTP at runtime; tests pass a fake
//
// 4. Why `while let Some(entry) = self.state.frontier.pop()`?
//    - Loops until the queue is empty
//    - New links are pushed to the back while we run, so level 2 is only
//      reached after every level 1 page is done (breadth-first)
// -----------------------------------------------------------------------------
