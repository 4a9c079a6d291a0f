//! Tree builder for turning flat URL lists into host/path hierarchies.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument, trace};

use crate::domain::aggregate::aggregate_leaf_counts;
use crate::domain::arena::UrlTree;
use crate::domain::ordering::sort_children;
use crate::domain::path_key::{path_id, PathKey, ROOT_PATH};

/// Lookup from a URL to an externally owned page record.
///
/// The builder only asks whether a page exists and stores the returned key;
/// the page data itself stays with its owner.
pub trait PageLookup {
    fn page_key(&self, url: &str) -> Option<String>;
}

/// Lookup that never attaches a page key (sitemap browsing).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPages;

impl PageLookup for NoPages {
    fn page_key(&self, _url: &str) -> Option<String> {
        None
    }
}

impl<V> PageLookup for HashMap<String, V> {
    fn page_key(&self, url: &str) -> Option<String> {
        self.get_key_value(url).map(|(k, _)| k.clone())
    }
}

impl<V> PageLookup for BTreeMap<String, V> {
    fn page_key(&self, url: &str) -> Option<String> {
        self.get_key_value(url).map(|(k, _)| k.clone())
    }
}

/// Counters from the last build pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    /// Entries that parsed and were placed in the tree
    pub accepted: usize,
    /// Entries dropped because they did not parse as absolute URLs with a host
    pub dropped: usize,
}

/// Constructs URL trees: parse, insert, aggregate, sort.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stats: BuildStats,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters from the most recent [`build`](Self::build) call.
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Build a tree without page keys.
    pub fn build<I, S>(&mut self, urls: I) -> UrlTree
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.build_with_pages(urls, &NoPages)
    }

    /// Build a tree, attaching a page key wherever `pages` knows the URL.
    ///
    /// Entries are inserted in input order. Unparseable entries are skipped.
    /// When two entries resolve to the same node the later one wins.
    #[instrument(level = "debug", skip_all)]
    pub fn build_with_pages<I, S, P>(&mut self, urls: I, pages: &P) -> UrlTree
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: PageLookup + ?Sized,
    {
        let urls = urls.into_iter();
        let mut tree = UrlTree::with_capacity(urls.size_hint().0);
        self.stats = BuildStats::default();

        for entry in urls {
            let url = entry.as_ref();
            match PathKey::parse(url) {
                Ok(key) => {
                    insert(&mut tree, &key, url, pages);
                    self.stats.accepted += 1;
                }
                Err(e) => {
                    trace!(url, error = %e, "dropping entry");
                    self.stats.dropped += 1;
                }
            }
        }

        aggregate_leaf_counts(&mut tree);
        sort_children(&mut tree);

        debug!(
            accepted = self.stats.accepted,
            dropped = self.stats.dropped,
            nodes = tree.len(),
            leaves = tree.leaf_count(),
            "built url tree"
        );
        tree
    }
}

/// Walk host then path segments, creating nodes on demand, and mark the last
/// one with the URL.
fn insert<P: PageLookup + ?Sized>(tree: &mut UrlTree, key: &PathKey, url: &str, pages: &P) {
    let host_id = key.host_id();
    let host_idx = tree.ensure_child(tree.root(), host_id.clone(), &key.host_label);

    let target = if key.is_root_document() {
        tree.ensure_child(host_idx, path_id(&host_id, ROOT_PATH), ROOT_PATH)
    } else {
        let mut parent = host_idx;
        let mut cumulative = String::with_capacity(url.len());
        for segment in &key.segments {
            cumulative.push('/');
            cumulative.push_str(segment);
            parent = tree.ensure_child(parent, path_id(&host_id, &cumulative), segment);
        }
        parent
    };

    if let Some(node) = tree.get_node_mut(target) {
        node.url = Some(url.to_string());
        node.page_key = pages.page_key(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_urls_when_building_then_counts_accepted_and_dropped() {
        let mut builder = TreeBuilder::new();
        let tree = builder.build(["https://a.com/x", "nope", "https://b.com/"]);
        assert_eq!(
            builder.stats(),
            BuildStats {
                accepted: 2,
                dropped: 1
            }
        );
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn given_page_map_when_building_then_attaches_page_keys() {
        let mut pages = HashMap::new();
        pages.insert("https://a.com/x".to_string(), 42u32);

        let tree = TreeBuilder::new().build_with_pages(["https://a.com/x", "https://a.com/y"], &pages);

        assert_eq!(
            tree.get("host:a.com:/x").unwrap().page_key.as_deref(),
            Some("https://a.com/x")
        );
        assert_eq!(tree.get("host:a.com:/y").unwrap().page_key, None);
    }

    #[test]
    fn given_duplicate_url_when_building_then_collapses_to_one_node() {
        let tree = TreeBuilder::new().build(["https://a.com/x", "https://a.com/x"]);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.get("host:a.com").unwrap().children.len(), 1);
    }

    #[test]
    fn given_same_identity_twice_when_building_then_last_write_wins() {
        let tree = TreeBuilder::new().build(["https://a.com/p?v=1", "https://a.com/p?v=2"]);
        assert_eq!(
            tree.get("host:a.com:/p").unwrap().url.as_deref(),
            Some("https://a.com/p?v=2")
        );
    }
}
