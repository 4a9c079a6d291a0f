//! URL identity parsing.
//!
//! A [`PathKey`] is the `(host, cumulative path)` identity of a URL. Node ids in
//! the tree are derived from it and nothing else, so the builder and the
//! expansion chain always agree on which node holds a given URL.

use tracing::trace;
use url::Url;

use crate::domain::error::{DomainError, DomainResult};

/// Id of the synthetic tree root.
pub const ROOT_ID: &str = "root";

/// Label and path of a host's own root document.
pub const ROOT_PATH: &str = "/";

/// Parsed identity of an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathKey {
    /// Lowercase host used for bucketing
    pub host: String,
    /// Host as spelled in the input, used for display
    pub host_label: String,
    /// Non-empty path segments, in order
    pub segments: Vec<String>,
}

impl PathKey {
    /// Parse an absolute URL.
    ///
    /// Relative references, strings that are not URLs at all, and URLs without
    /// a host (`mailto:`, `data:`, `file:///`) are rejected.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let url = Url::parse(input.trim()).map_err(|e| DomainError::InvalidUrl {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_lowercase(),
            _ => return Err(DomainError::MissingHost(input.to_string())),
        };

        let host_label = raw_host(input)
            .filter(|raw| raw.eq_ignore_ascii_case(&host))
            .map(str::to_string)
            .unwrap_or_else(|| host.clone());

        let segments = url
            .path_segments()
            .map(|parts| {
                parts
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        trace!(input, %host, "parsed url");
        Ok(Self {
            host,
            host_label,
            segments,
        })
    }

    /// Id of the host node: `host:<hostname>`.
    pub fn host_id(&self) -> String {
        host_id(&self.host)
    }

    /// `true` for the bare root document of a host (`https://a.com/`).
    pub fn is_root_document(&self) -> bool {
        self.segments.is_empty()
    }

    /// Cumulative path of the full URL (`/` for the root document).
    pub fn path(&self) -> String {
        if self.segments.is_empty() {
            ROOT_PATH.to_string()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }

    /// Id of the node that holds this URL.
    pub fn node_id(&self) -> String {
        path_id(&self.host_id(), &self.path())
    }

    /// All ids from the root down to the node that holds this URL.
    ///
    /// `["root", "host:<h>", "host:<h>:/p1", "host:<h>:/p1/p2", ...]`
    pub fn chain(&self) -> Vec<String> {
        let host_id = self.host_id();
        let mut chain = Vec::with_capacity(self.segments.len() + 2);
        chain.push(ROOT_ID.to_string());
        chain.push(host_id.clone());

        if self.segments.is_empty() {
            chain.push(path_id(&host_id, ROOT_PATH));
            return chain;
        }

        let mut cumulative = String::new();
        for segment in &self.segments {
            cumulative.push('/');
            cumulative.push_str(segment);
            chain.push(path_id(&host_id, &cumulative));
        }
        chain
    }
}

/// Build a host node id.
pub fn host_id(host: &str) -> String {
    format!("host:{host}")
}

/// Build a path node id under a host id.
pub fn path_id(host_id: &str, cumulative_path: &str) -> String {
    format!("{host_id}:{cumulative_path}")
}

/// Ids that reveal `url`, re-derived without consulting any tree.
///
/// Returns just `["root"]` when the URL does not parse.
pub fn expand_chain(url: &str) -> Vec<String> {
    match PathKey::parse(url) {
        Ok(key) => key.chain(),
        Err(e) => {
            trace!(url, error = %e, "expand chain falls back to root");
            vec![ROOT_ID.to_string()]
        }
    }
}

/// Host as written in the input, before WHATWG normalization lowercases it.
fn raw_host(input: &str) -> Option<&str> {
    let (_, rest) = input.trim().split_once("://")?;
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    if host_port.starts_with('[') {
        return host_port.find(']').map(|end| &host_port[..=end]);
    }
    Some(host_port.rsplit_once(':').map_or(host_port, |(h, _)| h))
}
