//! URL list loading
//!
//! Reads crawl results (one URL per line) or sitemap XML documents and applies
//! the configured `max_urls` cap before anything reaches the index.

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::infrastructure::traits::FileSystem;

/// Detected shape of a URL source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// One URL per line, `#` comments allowed
    PlainList,
    /// `<urlset>` or `<sitemapindex>` document
    Sitemap,
}

/// URLs read from a source, already capped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUrls {
    pub urls: Vec<String>,
    pub format: SourceFormat,
    /// Entries cut off by the cap
    pub truncated: usize,
}

/// Service for reading URL collections from files.
pub struct UrlListLoader {
    fs: Arc<dyn FileSystem>,
    max_urls: usize,
}

impl UrlListLoader {
    pub fn new(fs: Arc<dyn FileSystem>, max_urls: usize) -> Self {
        Self { fs, max_urls }
    }

    /// Read `path`, detect its format, and return at most `max_urls` entries.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<LoadedUrls> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("url source not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read url source", path)?;
        self.parse(&content)
    }

    /// Parse already-read content.
    pub fn parse(&self, content: &str) -> ApplicationResult<LoadedUrls> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let format = detect_format(content);
        let mut urls = match format {
            SourceFormat::PlainList => parse_plain_list(content),
            SourceFormat::Sitemap => parse_sitemap(content)?,
        };

        let truncated = urls.len().saturating_sub(self.max_urls);
        if truncated > 0 {
            warn!(
                max_urls = self.max_urls,
                truncated, "url source exceeds cap, extra entries ignored"
            );
            urls.truncate(self.max_urls);
        }

        debug!(count = urls.len(), ?format, "loaded urls");
        Ok(LoadedUrls {
            urls,
            format,
            truncated,
        })
    }
}

/// Sitemaps may open with a declaration, comments or a DOCTYPE, so the root
/// element is searched anywhere; a URL list never starts with `<`.
fn detect_format(content: &str) -> SourceFormat {
    if content.trim_start().starts_with('<')
        || content.contains("<urlset")
        || content.contains("<sitemapindex")
    {
        SourceFormat::Sitemap
    } else {
        SourceFormat::PlainList
    }
}

fn parse_plain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn pattern_err(e: regex::Error) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: "compile sitemap pattern".to_string(),
        source: Box::new(e),
    }
}

fn parse_sitemap(content: &str) -> ApplicationResult<Vec<String>> {
    let loc = Regex::new(r"(?is)<loc>\s*(?:<!\[CDATA\[(.*?)\]\]>|(.*?))\s*</loc>")
        .map_err(pattern_err)?;
    let entity = Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|(lt|gt|quot|apos|amp));")
        .map_err(pattern_err)?;

    Ok(loc
        .captures_iter(content)
        .filter_map(|caps| match (caps.get(1), caps.get(2)) {
            // CDATA content is taken verbatim
            (Some(cdata), _) => Some(cdata.as_str().trim().to_string()),
            (None, Some(text)) => Some(unescape_xml(text.as_str().trim(), &entity)),
            (None, None) => None,
        })
        .filter(|url| !url.is_empty())
        .collect())
}

/// Decode numeric character references and the five predefined entities in
/// one pass, so decoded text is never decoded again.
fn unescape_xml(s: &str, entity: &Regex) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    entity
        .replace_all(s, |caps: &regex::Captures<'_>| {
            let decoded = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(hex), _, _) => u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32),
                (_, Some(dec), _) => dec.as_str().parse::<u32>().ok().and_then(char::from_u32),
                (_, _, Some(name)) => match name.as_str() {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "amp" => Some('&'),
                    _ => None,
                },
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
