// src/crawl/links.rs
// =============================================================================
// Small URL helpers shared by the filter engine and the driver.
//
// - resolve_link: turn a raw href (maybe relative) into an absolute URL
//   with the fragment removed, so "/a#top" and "/a#bottom" are one page
// - same_host: host comparison that also looks at an explicit port
// - directory_path: "/docs" -> "/docs/" for child-path checks
// =============================================================================

use url::Url;

// Resolves an href against the page it was found on.
//
// Returns None for empty hrefs and anything the URL parser rejects.
// These are simply "not links" and are never reported.
//
// Examples:
//   base = "https://example.com/docs/page"
//   href = "intro"      -> "https://example.com/docs/intro"
//   href = "/about#me"  -> "https://example.com/about"
//   href = "#top"       -> "https://example.com/docs/page"
//   href = ""           -> None
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    if href.trim().is_empty() {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

/// True if both URLs share host and port (`example.com` != `example.com:8080`)
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str().is_some() && a.host_str() == b.host_str() && a.port() == b.port()
}

/// The URL's path, guaranteed to end in `/`
pub fn directory_path(url: &Url) -> String {
    let path = url.path();
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_resolve_absolute_link() {
        let base = url("https://example.com/page");
        let result = resolve_link(&base, "https://other.com");
        assert_eq!(result, Some(url("https://other.com/")));
    }

    #[test]
    fn test_resolve_relative_link() {
        let base = url("https://example.com/docs/page");
        assert_eq!(
            resolve_link(&base, "intro"),
            Some(url("https://example.com/docs/intro"))
        );
        assert_eq!(
            resolve_link(&base, "../about"),
            Some(url("https://example.com/about"))
        );
    }

    #[test]
    fn test_fragments_collapse_to_one_url() {
        let base = url("https://example.com/page");
        let a = resolve_link(&base, "/a#top").unwrap();
        let b = resolve_link(&base, "/a#bottom").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://example.com/a");

        // A bare fragment points back at the page itself
        assert_eq!(resolve_link(&base, "#section"), Some(base.clone()));
    }

    #[test]
    fn test_empty_and_malformed_hrefs_are_not_links() {
        let base = url("https://example.com/page");
        assert_eq!(resolve_link(&base, ""), None);
        assert_eq!(resolve_link(&base, "   "), None);
        assert_eq!(resolve_link(&base, "http://[::1"), None);
        assert_eq!(resolve_link(&base, "https://exa mple.com/"), None);
    }

    #[test]
    fn test_same_host_compares_ports() {
        assert!(same_host(&url("https://ex.com/a"), &url("https://ex.com/b")));
        assert!(same_host(&url("https://ex.com:443/a"), &url("https://ex.com/b")));
        assert!(!same_host(&url("https://ex.com:8443/a"), &url("https://ex.com/b")));
        assert!(!same_host(&url("https://ex.org/"), &url("https://ex.com/")));
        assert!(!same_host(&url("mailto:me@ex.com"), &url("https://ex.com/")));
    }

    #[test]
    fn test_directory_path() {
        assert_eq!(directory_path(&url("https://ex.com/docs")), "/docs/");
        assert_eq!(directory_path(&url("https://ex.com/docs/")), "/docs/");
        assert_eq!(directory_path(&url("https://ex.com")), "/");
    }
}
