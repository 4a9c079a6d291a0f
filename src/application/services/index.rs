//! URL index service
//!
//! Owns the canonical URL snapshot, the tree built from it, the expansion
//! state, and an optional filtered view. All state is passed around
//! explicitly; there is no shared singleton tree.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::{
    visible_rows, BuildStats, DomainError, DomainResult, ExpansionSnapshot, ExpansionState,
    FilteredView, NoPages, PageLookup, RenderPlan, TreeBuilder, TreeEvent, TreeNode, UrlTree,
    VirtualizationPolicy, VisibleRow,
};
use crate::infrastructure::traits::EventSink;

/// Claim on a pending rebuild. Only the newest ticket may install a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Service tying the index core to its collaborators.
pub struct IndexService {
    sink: Arc<dyn EventSink>,
    pages: Arc<dyn PageLookup + Send + Sync>,
    policy: VirtualizationPolicy,
    urls: Vec<String>,
    tree: UrlTree,
    expansion: ExpansionState,
    filtered: Option<FilteredView>,
    requested: u64,
    installed: u64,
}

impl IndexService {
    /// Create an empty index.
    pub fn new(sink: Arc<dyn EventSink>, policy: VirtualizationPolicy) -> Self {
        Self {
            sink,
            pages: Arc::new(NoPages),
            policy,
            urls: Vec::new(),
            tree: UrlTree::new(),
            expansion: ExpansionState::new(),
            filtered: None,
            requested: 0,
            installed: 0,
        }
    }

    /// Attach page keys from `pages` on every subsequent build.
    pub fn with_pages(mut self, pages: Arc<dyn PageLookup + Send + Sync>) -> Self {
        self.pages = pages;
        self
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Start a rebuild. Any ticket issued earlier becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.requested += 1;
        RefreshTicket {
            generation: self.requested,
        }
    }

    /// Build a tree for `urls` with this service's page lookup.
    ///
    /// Pure with respect to the service, so it may run while other events are
    /// handled; install the result with [`complete_refresh`](Self::complete_refresh).
    pub fn build_tree(&self, urls: &[String]) -> (UrlTree, BuildStats) {
        let mut builder = TreeBuilder::new();
        let tree = builder.build_with_pages(urls, self.pages.as_ref());
        (tree, builder.stats())
    }

    /// Install a finished build if `ticket` is still the newest request.
    ///
    /// Resets expansion to `{"root"}` and rebuilds an active filter against
    /// the new data. Returns `false` and discards the tree for a stale ticket.
    #[instrument(level = "debug", skip(self, urls, tree))]
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, urls: Vec<String>, tree: UrlTree) -> bool {
        if ticket.generation != self.requested || ticket.generation <= self.installed {
            debug!(
                ticket = ticket.generation,
                newest = self.requested,
                "discarding stale build"
            );
            return false;
        }

        self.installed = ticket.generation;
        self.urls = urls;
        self.tree = tree;
        self.expansion.reset();

        if let Some(query) = self.filtered.as_ref().map(|view| view.filter.query().to_string()) {
            self.filtered = Some(FilteredView::build(&query, &self.urls, self.pages.as_ref()));
        }

        info!(
            generation = self.installed,
            urls = self.urls.len(),
            leaves = self.tree.leaf_count(),
            "installed url tree"
        );
        true
    }

    /// Replace the URL collection and rebuild synchronously.
    pub fn replace_urls(&mut self, urls: Vec<String>) -> BuildStats {
        let ticket = self.begin_refresh();
        let (tree, stats) = self.build_tree(&urls);
        self.complete_refresh(ticket, urls, tree);
        stats
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Show only URLs containing `query` (case-insensitive).
    ///
    /// An empty query clears the filter. Re-filtering keeps the previous
    /// filtered expansion, since node ids do not depend on the query.
    pub fn set_filter(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.clear_filter();
            return;
        }
        let previous = self.filtered.take().map(|view| view.expansion);
        let mut view = FilteredView::build(query, &self.urls, self.pages.as_ref());
        if let Some(expansion) = previous {
            view.expansion = expansion;
        }
        self.filtered = Some(view);
    }

    pub fn clear_filter(&mut self) {
        self.filtered = None;
    }

    pub fn filter(&self) -> Option<&FilteredView> {
        self.filtered.as_ref()
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn canonical_tree(&self) -> &UrlTree {
        &self.tree
    }

    pub fn canonical_expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    /// Tree currently shown: the filtered one if a filter is active.
    pub fn active_tree(&self) -> &UrlTree {
        self.filtered.as_ref().map_or(&self.tree, |view| &view.tree)
    }

    pub fn active_expansion(&self) -> &ExpansionState {
        self.filtered
            .as_ref()
            .map_or(&self.expansion, |view| &view.expansion)
    }

    fn active_parts_mut(&mut self) -> (&UrlTree, &mut ExpansionState) {
        match self.filtered.as_mut() {
            Some(view) => (&view.tree, &mut view.expansion),
            None => (&self.tree, &mut self.expansion),
        }
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        visible_rows(self.active_tree(), self.active_expansion())
    }

    // ------------------------------------------------------------------
    // Interaction
    // ------------------------------------------------------------------

    /// Expand or collapse `id` in the active view.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, id: &str) -> DomainResult<bool> {
        let (tree, expansion) = self.active_parts_mut();
        if tree.get(id).is_none() {
            return Err(DomainError::NodeNotFound(id.to_string()));
        }
        let expanded = expansion.toggle(id);
        self.sink.emit(&TreeEvent::NodeToggled {
            id: id.to_string(),
            expanded,
        });
        Ok(expanded)
    }

    /// Select a url-bearing node of the active view.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&self, id: &str) -> DomainResult<TreeEvent> {
        let node = self
            .active_tree()
            .get(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        let url = node
            .url
            .clone()
            .ok_or_else(|| DomainError::NotLeafBearing(id.to_string()))?;
        let event = TreeEvent::NodeSelected {
            url,
            page_key: node.page_key.clone(),
        };
        self.sink.emit(&event);
        Ok(event)
    }

    /// Expand the ancestors of `url` in the active view.
    ///
    /// Previously expanded nodes stay expanded. Returns the applied chain.
    pub fn reveal(&mut self, url: &str) -> Vec<String> {
        let (_, expansion) = self.active_parts_mut();
        expansion.reveal(url)
    }

    pub fn expand_all(&mut self) {
        let (tree, expansion) = self.active_parts_mut();
        expansion.expand_all(tree);
    }

    pub fn expansion_snapshot(&self) -> ExpansionSnapshot {
        self.active_expansion().snapshot()
    }

    pub fn restore_expansion(&mut self, snapshot: ExpansionSnapshot) {
        let (_, expansion) = self.active_parts_mut();
        expansion.restore(snapshot);
    }

    // ------------------------------------------------------------------
    // Rendering policy
    // ------------------------------------------------------------------

    pub fn policy(&self) -> VirtualizationPolicy {
        self.policy
    }

    /// Swap thresholds at runtime; only display density changes.
    pub fn set_policy(&mut self, policy: VirtualizationPolicy) {
        self.policy = policy;
    }

    /// How the children of `id` should be drawn at `scroll_offset_px`.
    pub fn render_plan(&self, id: &str, scroll_offset_px: u64) -> DomainResult<RenderPlan> {
        let node: &TreeNode = self
            .active_tree()
            .get(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        Ok(self.policy.plan(node.children.len(), scroll_offset_px))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::MemoryEventSink;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_two_tickets_when_older_completes_last_then_it_is_discarded() {
        let mut service = IndexService::new(Arc::new(MemoryEventSink::new()), VirtualizationPolicy::default());

        let old = service.begin_refresh();
        let new = service.begin_refresh();

        let new_urls = urls(&["https://new.com/"]);
        let (new_tree, _) = service.build_tree(&new_urls);
        assert!(service.complete_refresh(new, new_urls, new_tree));

        let old_urls = urls(&["https://old.com/"]);
        let (old_tree, _) = service.build_tree(&old_urls);
        assert!(!service.complete_refresh(old, old_urls, old_tree));

        assert!(service.canonical_tree().get("host:new.com").is_some());
        assert!(service.canonical_tree().get("host:old.com").is_none());
    }

    #[test]
    fn given_ticket_when_completed_twice_then_second_is_rejected() {
        let mut service = IndexService::new(Arc::new(MemoryEventSink::new()), VirtualizationPolicy::default());
        let ticket = service.begin_refresh();
        assert!(service.complete_refresh(ticket, Vec::new(), UrlTree::new()));
        assert!(!service.complete_refresh(ticket, Vec::new(), UrlTree::new()));
    }

    #[test]
    fn given_expanded_nodes_when_replacing_urls_then_expansion_resets() {
        let mut service = IndexService::new(Arc::new(MemoryEventSink::new()), VirtualizationPolicy::default());
        service.replace_urls(urls(&["https://a.com/x"]));
        service.toggle("host:a.com").unwrap();

        service.replace_urls(urls(&["https://a.com/x", "https://a.com/y"]));

        assert_eq!(service.canonical_expansion(), &ExpansionState::new());
    }
}
