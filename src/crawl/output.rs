// src/crawl/output.rs
// =============================================================================
// Writes discovered links to the output stream (normally stdout).
//
// Two formats:
// - Plain: one URL per line, easy to pipe into other tools
// - Json: one JSON object per line with where/when the link was found
//
// Every line is flushed immediately so that output survives a crash later
// in the run, and so `crawl-links ... | head` sees results right away.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// A single discovered link, as written in JSON mode
#[derive(Debug, Clone, Serialize)]
pub struct Discovery<'a> {
    pub url: &'a str,
    /// Depth of the page the link was found on
    pub depth: u32,
    /// Page the link was found on
    pub source: &'a str,
    /// Seed of the branch the link was found in
    pub origin: &'a str,
}

pub struct Emitter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    // Writes one link and flushes.
    //
    // Errors here (e.g. a closed pipe) end the crawl.
    pub fn emit(&mut self, url: &Url, depth: u32, source: &Url, origin: &Url) -> Result<()> {
        let written = match self.format {
            OutputFormat::Plain => writeln!(self.out, "{}", url),
            OutputFormat::Json => {
                let line = serde_json::to_string(&Discovery {
                    url: url.as_str(),
                    depth,
                    source: source.as_str(),
                    origin: origin.as_str(),
                })?;
                writeln!(self.out, "{}", line)
            }
        };

        written
            .and_then(|_| self.out.flush())
            .context("Failed to write to output")
    }

    /// Gives the underlying writer back
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_plain_output_is_one_url_per_line() {
        let mut emitter = Emitter::new(Vec::new(), OutputFormat::Plain);
        let seed = url("https://ex.com/");
        emitter.emit(&url("https://ex.com/a"), 1, &seed, &seed).unwrap();
        emitter.emit(&url("https://ex.com/b"), 1, &seed, &seed).unwrap();

        let text = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(text, "https://ex.com/a\nhttps://ex.com/b\n");
    }

    #[test]
    fn test_json_output() {
        let mut emitter = Emitter::new(Vec::new(), OutputFormat::Json);
        let seed = url("https://ex.com/");
        let page = url("https://ex.com/docs/");
        emitter.emit(&url("https://ex.com/docs/a"), 2, &page, &seed).unwrap();

        let text = String::from_utf8(emitter.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["url"], "https://ex.com/docs/a");
        assert_eq!(value["depth"], 2);
        assert_eq!(value["source"], "https://ex.com/docs/");
        assert_eq!(value["origin"], "https://ex.com/");
    }
}
