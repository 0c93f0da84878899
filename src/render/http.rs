// src/render/http.rs
// =============================================================================
// A renderer that doesn't render: it downloads the HTML with reqwest and
// reads the anchors with scraper.
//
// Pages that build their links with JavaScript will come back with fewer
// (or no) links than a browser would see.
//
// Notes:
// - Redirects are followed; the final URL is reported back so relative
//   links resolve against the page that was actually served
// - Hrefs come back absolute, resolved against <base href> when the page
//   has one (what a browser's `a.href` gives)
// - Non-HTML responses (PDFs, images, ...) navigate fine but yield no links
// - "Network idle" is trivially reached once the body has been read
// =============================================================================

use futures::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::{Navigation, RenderError, RenderOptions, Renderer};

pub struct HttpRenderer {
    client: Client,
    // Document URL and body of the last page navigated to
    body: Option<(Url, String)>,
}

impl HttpRenderer {
    pub fn new(options: &RenderOptions) -> Result<Self, RenderError> {
        if options.execute_scripts {
            debug!("HTTP renderer never executes JavaScript");
        }

        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.navigation_timeout)
            .build()
            .map_err(|e| RenderError::Init(e.to_string()))?;

        Ok(Self { client, body: None })
    }

    async fn fetch(&mut self, url: &Url) -> Result<Navigation, RenderError> {
        self.body = None;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, is_html);

        if html {
            let text = response
                .text()
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;
            trace!("Read {} bytes from {}", text.len(), final_url);
            self.body = Some((final_url.clone(), text));
        } else {
            debug!("Not parsing non-HTML response from {}", final_url);
        }

        Ok(Navigation {
            status: Some(status),
            url: final_url,
        })
    }
}

impl Renderer for HttpRenderer {
    fn navigate<'a>(&'a mut self, url: &'a Url) -> BoxFuture<'a, Result<Navigation, RenderError>> {
        Box::pin(self.fetch(url))
    }

    fn extract_anchor_hrefs(&mut self) -> BoxFuture<'_, Result<Vec<String>, RenderError>> {
        let hrefs = match &self.body {
            Some((page, html)) => extract_hrefs(html, page),
            None => Ok(Vec::new()),
        };
        Box::pin(async move { hrefs })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), RenderError>> {
        self.body = None;
        Box::pin(async { Ok(()) })
    }
}

// Collects the href of every <a href> in document order.
//
// Hrefs are resolved against the first <base href> (itself relative to the
// page), or the page URL when there is none. Empty hrefs are dropped; hrefs
// that don't resolve are passed through unchanged for the filter to reject.
fn extract_hrefs(html: &str, page: &Url) -> Result<Vec<String>, RenderError> {
    let anchors = Selector::parse("a[href]")
        .map_err(|_| RenderError::Extraction("invalid anchor selector".to_string()))?;
    let base_tag = Selector::parse("base[href]")
        .map_err(|_| RenderError::Extraction("invalid base selector".to_string()))?;

    let document = Html::parse_document(html);
    let base = document
        .select(&base_tag)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page.join(href).ok())
        .unwrap_or_else(|| page.clone());

    Ok(document
        .select(&anchors)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .map(|href| match base.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => href.to_string(),
        })
        .collect())
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extract_hrefs_in_document_order() {
        let html = r##"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs#intro">Docs</a>
            <a href="../about">About</a>
            <a name="no-href">Anchor</a>
            <a href="">Empty</a>
        "##;
        let hrefs = extract_hrefs(html, &page("https://ex.com/guide/start")).unwrap();
        assert_eq!(
            hrefs,
            vec![
                "https://rust-lang.org/",
                "https://ex.com/docs#intro",
                "https://ex.com/about",
            ]
        );
    }

    #[test]
    fn test_extract_hrefs_honours_base_tag() {
        let html = r#"
            <head><base href="/sub/"><base href="/ignored/"></head>
            <body><a href="x">X</a><a href="/root">Root</a></body>
        "#;
        let hrefs = extract_hrefs(html, &page("https://ex.com/page")).unwrap();
        assert_eq!(hrefs, vec!["https://ex.com/sub/x", "https://ex.com/root"]);
    }

    #[test]
    fn test_unresolvable_href_passed_through() {
        let html = r#"<a href="http://[oops">Bad</a>"#;
        let hrefs = extract_hrefs(html, &page("https://ex.com/")).unwrap();
        assert_eq!(hrefs, vec!["http://[oops"]);
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("Application/XHTML+XML"));
        assert!(!is_html("application/pdf"));
        assert!(!is_html("image/png"));
    }

    #[tokio::test]
    async fn test_navigate_and_extract() {
        let mut server = mockito::Server::new_async().await;
        let _page = server
            .mock("GET", "/docs/")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(r#"<html><body><a href="a">A</a><a href="/other">O</a></body></html>"#)
            .create_async()
            .await;

        let mut renderer = HttpRenderer::new(&RenderOptions::default()).unwrap();
        let url = Url::parse(&format!("{}/docs/", server.url())).unwrap();

        let nav = renderer.navigate(&url).await.unwrap();
        assert_eq!(nav.status, Some(200));
        assert_eq!(nav.url, url);

        let hrefs = renderer.extract_anchor_hrefs().await.unwrap();
        assert_eq!(
            hrefs,
            vec![format!("{}/docs/a", server.url()), format!("{}/other", server.url())]
        );
        renderer.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_base_tag_served_page() {
        let mut server = mockito::Server::new_async().await;
        let _page = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<html><head><base href="/sub/"></head><body><a href="x">X</a></body></html>"#)
            .create_async()
            .await;

        let mut renderer = HttpRenderer::new(&RenderOptions::default()).unwrap();
        let url = Url::parse(&format!("{}/page", server.url())).unwrap();

        renderer.navigate(&url).await.unwrap();
        let hrefs = renderer.extract_anchor_hrefs().await.unwrap();
        assert_eq!(hrefs, vec![format!("{}/sub/x", server.url())]);
    }

    #[tokio::test]
    async fn test_error_status_still_yields_links() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/gone")
            .with_status(404)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/home">Home</a>"#)
            .create_async()
            .await;

        let mut renderer = HttpRenderer::new(&RenderOptions::default()).unwrap();
        let url = Url::parse(&format!("{}/gone", server.url())).unwrap();

        let nav = renderer.navigate(&url).await.unwrap();
        assert_eq!(nav.status, Some(404));
        assert!(!nav.is_success());
        assert_eq!(
            renderer.extract_anchor_hrefs().await.unwrap(),
            vec![format!("{}/home", server.url())]
        );
    }

    #[tokio::test]
    async fn test_non_html_has_no_links() {
        let mut server = mockito::Server::new_async().await;
        let _pdf = server
            .mock("GET", "/file.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4 <a href=\"/nope\">")
            .create_async()
            .await;

        let mut renderer = HttpRenderer::new(&RenderOptions::default()).unwrap();
        let url = Url::parse(&format!("{}/file.pdf", server.url())).unwrap();

        renderer.navigate(&url).await.unwrap();
        assert!(renderer.extract_anchor_hrefs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_navigation_error() {
        let mut renderer = HttpRenderer::new(&RenderOptions::default()).unwrap();
        // Port 9 (discard) on localhost is essentially never listening
        let url = Url::parse("http://127.0.0.1:9/").unwrap();

        let err = renderer.navigate(&url).await.unwrap_err();
        assert!(matches!(err, RenderError::Navigation(_)));
        assert!(err.is_recoverable());
    }
}
