//! Expansion state: which node ids are shown expanded.

use std::collections::HashSet;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::UrlTree;
use crate::domain::path_key::{expand_chain, ROOT_ID};

/// Set of expanded node ids. Starts as `{"root"}`.
///
/// Nothing is ever expanded implicitly: only [`toggle`](Self::toggle),
/// [`ensure_expanded`](Self::ensure_expanded), and [`reveal`](Self::reveal)
/// add ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable form of an [`ExpansionState`], sorted for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionSnapshot {
    pub expanded: Vec<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self {
            expanded: HashSet::from([ROOT_ID.to_string()]),
        }
    }

    /// Flip membership of `id`; returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Union `ids` into the set without collapsing anything.
    pub fn ensure_expanded<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expanded.extend(ids.into_iter().map(Into::into));
    }

    /// Expand every ancestor of `url` and return the chain that was applied.
    #[instrument(level = "debug", skip(self))]
    pub fn reveal(&mut self, url: &str) -> Vec<String> {
        let chain = expand_chain(url);
        self.ensure_expanded(chain.iter().cloned());
        chain
    }

    /// Back to `{"root"}` after a full data reset.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.expanded.insert(ROOT_ID.to_string());
    }

    /// Expand every node of `tree` that has children.
    pub fn expand_all(&mut self, tree: &UrlTree) {
        let ids = tree
            .iter()
            .filter(|(_, node)| !node.children.is_empty())
            .map(|(_, node)| node.id.clone());
        self.expanded.extend(ids);
        debug!(expanded = self.expanded.len(), "expanded all");
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    pub fn snapshot(&self) -> ExpansionSnapshot {
        let mut expanded: Vec<String> = self.expanded.iter().cloned().collect();
        expanded.sort();
        ExpansionSnapshot { expanded }
    }

    /// Replace the set with a snapshot; the root stays expanded.
    pub fn restore(&mut self, snapshot: ExpansionSnapshot) {
        self.expanded = snapshot.expanded.into_iter().collect();
        self.expanded.insert(ROOT_ID.to_string());
    }
}

/// One row of the flattened, currently visible tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub index: Index,
    /// Hosts are depth 0
    pub depth: usize,
}

/// Flatten `tree` in display order, descending only into expanded nodes.
///
/// The synthetic root is not a row. If the root is collapsed nothing is
/// visible.
pub fn visible_rows(tree: &UrlTree, expansion: &ExpansionState) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    if !expansion.is_expanded(ROOT_ID) {
        return rows;
    }

    let mut stack: Vec<(Index, usize)> = tree
        .root_node()
        .children
        .iter()
        .rev()
        .map(|&c| (c, 0))
        .collect();

    while let Some((idx, depth)) = stack.pop() {
        let Some(node) = tree.get_node(idx) else {
            continue;
        };
        rows.push(VisibleRow { index: idx, depth });
        if expansion.is_expanded(&node.id) {
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeBuilder;

    #[test]
    fn given_new_state_when_checking_then_only_root_expanded() {
        let state = ExpansionState::new();
        assert!(state.is_expanded("root"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn given_id_when_toggling_twice_then_returns_to_collapsed() {
        let mut state = ExpansionState::new();
        assert!(state.toggle("host:a.com"));
        assert!(state.is_expanded("host:a.com"));
        assert!(!state.toggle("host:a.com"));
        assert!(!state.is_expanded("host:a.com"));
    }

    #[test]
    fn given_expanded_nodes_when_revealing_then_keeps_previous_expansion() {
        let mut state = ExpansionState::new();
        state.toggle("host:b.com");
        let chain = state.reveal("https://a.com/blog/post");

        assert_eq!(chain.last().map(String::as_str), Some("host:a.com:/blog/post"));
        assert!(state.is_expanded("host:b.com"));
        assert!(state.is_expanded("host:a.com:/blog"));
    }

    #[test]
    fn given_expanded_nodes_when_resetting_then_only_root_remains() {
        let mut state = ExpansionState::new();
        state.ensure_expanded(["host:a.com", "host:a.com:/x"]);
        state.reset();
        assert_eq!(state.snapshot().expanded, vec!["root"]);
    }

    #[test]
    fn given_snapshot_when_restoring_then_root_always_present() {
        let mut state = ExpansionState::new();
        state.restore(ExpansionSnapshot {
            expanded: vec!["host:a.com".into()],
        });
        assert!(state.is_expanded("root"));
        assert!(state.is_expanded("host:a.com"));
    }

    #[test]
    fn given_collapsed_hosts_when_listing_rows_then_only_hosts_visible() {
        let tree = TreeBuilder::new().build(["https://a.com/x", "https://b.com/y"]);
        let mut state = ExpansionState::new();
        assert_eq!(visible_rows(&tree, &state).len(), 2);

        state.toggle("host:a.com");
        let rows = visible_rows(&tree, &state);
        let ids: Vec<_> = rows
            .iter()
            .map(|r| tree.get_node(r.index).unwrap().id.as_str())
            .collect();
        assert_eq!(ids, vec!["host:a.com", "host:a.com:/x", "host:b.com"]);
        assert_eq!(rows[1].depth, 1);
    }
}
