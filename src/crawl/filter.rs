// src/crawl/filter.rs
// =============================================================================
// Decides whether a link found on a page should be printed / followed.
//
// `admit` runs the checks in a fixed order and stops at the first failure:
//   1. resolve against the page (malformed -> rejected, silently)
//   2. drop the fragment
//   3. --allow must match (if given)
//   4. --disallow must not match (wins over --allow)
//   5. --same-host: same host as the anchor
//   6. --children: same host as the anchor AND below the anchor's path
//   7. not already visited
//
// Nothing here mutates state. The driver owns the registries and hands the
// visited set in by reference.
// =============================================================================

use std::fmt;
use url::Url;

use super::config::{Anchor, FilterConfig};
use super::links::{directory_path, resolve_link, same_host};
use super::state::VisitedRegistry;

/// Why a link was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Empty or unparseable href
    Malformed,
    /// `--allow` was given and did not match
    NotAllowed,
    /// `--disallow` matched
    Disallowed,
    /// `--same-host` and the host differs from the anchor
    ForeignHost,
    /// `--children` and the link is not below the anchor
    NotChild,
    /// The page has already been visited
    Visited,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::Malformed => "not a valid URL",
            Rejection::NotAllowed => "does not match --allow",
            Rejection::Disallowed => "matches --disallow",
            Rejection::ForeignHost => "different host",
            Rejection::NotChild => "not a child path",
            Rejection::Visited => "already visited",
        };
        f.write_str(reason)
    }
}

// Filters a single href.
//
// Parameters:
//   href: raw attribute value from the page (may be relative or empty)
//   page: URL of the page the href was found on
//   origin: seed URL of the current crawl branch
//   config: the filter rules
//   visited: pages already processed in this crawl
//
// Returns: the absolute, fragment-free URL, or the reason it was rejected
pub fn admit(
    href: &str,
    page: &Url,
    origin: &Url,
    config: &FilterConfig,
    visited: &VisitedRegistry,
) -> Result<Url, Rejection> {
    let candidate = resolve_link(page, href).ok_or(Rejection::Malformed)?;

    if let Some(allow) = &config.allow {
        if !allow.is_match(candidate.as_str()) {
            return Err(Rejection::NotAllowed);
        }
    }

    if let Some(disallow) = &config.disallow {
        if disallow.is_match(candidate.as_str()) {
            return Err(Rejection::Disallowed);
        }
    }

    let anchor = match config.anchor {
        Anchor::Page => page,
        Anchor::Origin => origin,
    };

    if config.same_host_only && !same_host(&candidate, anchor) {
        return Err(Rejection::ForeignHost);
    }

    if config.child_only
        && !(same_host(&candidate, anchor) && candidate.path().starts_with(&directory_path(anchor)))
    {
        return Err(Rejection::NotChild);
    }

    if visited.contains(&candidate) {
        return Err(Rejection::Visited);
    }

    Ok(candidate)
}
