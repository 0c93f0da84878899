// src/crawl/state.rs
// =============================================================================
// Everything a single crawl remembers while it runs.
//
// - Frontier: FIFO queue of pages waiting to be visited
// - VisitedRegistry: pages we've started processing (expanded at most once)
// - PrintedRegistry: links we've already written out (printed at most once)
//
// A link can be printed long before it is dequeued; it is still expanded
// exactly once, when its turn comes.
//
// None of this is global. A `CrawlState` belongs to one crawl, so tests (or a
// future caller) can run several crawls side by side.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A page waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    /// The seed this branch of the crawl started from
    pub origin: Url,
    /// Hops from the seed; seeds are depth 1
    pub depth: u32,
}

impl FrontierEntry {
    /// Creates a depth-1 entry whose origin is itself
    pub fn seed(url: Url) -> Self {
        Self {
            origin: url.clone(),
            url,
            depth: 1,
        }
    }

    /// Creates the entry for a link found on this entry's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            origin: self.origin.clone(),
            depth: self.depth + 1,
        }
    }
}

// Queue of pending pages.
//
// May hold the same URL more than once (two parents can discover it before
// either copy is dequeued). The driver drops the extra copies when it pops
// them and finds the URL already visited.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Set of URLs whose processing has begun
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: HashSet<Url>,
}

impl VisitedRegistry {
    /// Returns true if the URL was not visited before
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.clone())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url)
    }
}

/// Set of URLs already written to the output
#[derive(Debug, Default)]
pub struct PrintedRegistry {
    urls: HashSet<Url>,
}

impl PrintedRegistry {
    /// Returns true if the URL was not printed before
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.clone())
    }
}

/// All mutable state of one crawl run
#[derive(Debug, Default)]
pub struct CrawlState {
    pub frontier: Frontier,
    pub visited: VisitedRegistry,
    pub printed: PrintedRegistry,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }
}
