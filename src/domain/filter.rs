//! Filtered views over the canonical URL list.

use tracing::{debug, instrument};

use crate::domain::arena::UrlTree;
use crate::domain::builder::{PageLookup, TreeBuilder};
use crate::domain::expansion::ExpansionState;

/// Case-insensitive substring matcher over full URL strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFilter {
    query: String,
    needle: String,
}

impl UrlFilter {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            needle: query.to_lowercase(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// An empty (or whitespace-only) query matches everything.
    pub fn is_empty(&self) -> bool {
        self.needle.trim().is_empty()
    }

    pub fn matches(&self, url: &str) -> bool {
        self.is_empty() || url.to_lowercase().contains(&self.needle)
    }

    /// Matching entries, original relative order preserved.
    pub fn apply<'a, S: AsRef<str>>(&self, urls: &'a [S]) -> Vec<&'a str> {
        urls.iter()
            .map(AsRef::as_ref)
            .filter(|url| self.matches(url))
            .collect()
    }
}

/// A disposable tree built from the filtered subset, with its own expansion
/// state. The canonical tree is never touched.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub filter: UrlFilter,
    pub tree: UrlTree,
    pub expansion: ExpansionState,
    /// Number of entries that matched the query
    pub matched: usize,
}

impl FilteredView {
    #[instrument(level = "debug", skip(urls, pages))]
    pub fn build<S, P>(query: &str, urls: &[S], pages: &P) -> Self
    where
        S: AsRef<str>,
        P: PageLookup + ?Sized,
    {
        let filter = UrlFilter::new(query);
        let subset = filter.apply(urls);
        let matched = subset.len();
        let tree = TreeBuilder::new().build_with_pages(subset, pages);
        debug!(query, matched, leaves = tree.leaf_count(), "built filtered view");

        Self {
            filter,
            tree,
            expansion: ExpansionState::new(),
            matched,
        }
    }
}
