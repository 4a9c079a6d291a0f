//! Conversion of URL trees into printable `termtree` trees.

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{ExpansionState, TreeNode, UrlTree, VirtualizationPolicy};

pub trait TreeNodeConvert {
    /// Render the part of the tree a user would currently see.
    ///
    /// Collapsed nodes show no children. Windowed child lists show the first
    /// window followed by a marker counting the hidden remainder.
    fn to_tree_string(&self, expansion: &ExpansionState, policy: &VirtualizationPolicy)
        -> Tree<String>;
}

impl TreeNodeConvert for UrlTree {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(
        &self,
        expansion: &ExpansionState,
        policy: &VirtualizationPolicy,
    ) -> Tree<String> {
        fn build(
            tree: &UrlTree,
            idx: Index,
            expansion: &ExpansionState,
            policy: &VirtualizationPolicy,
        ) -> Option<Tree<String>> {
            let node = tree.get_node(idx)?;
            let mut out = Tree::new(node_label(node, expansion));
            if node.children.is_empty() || !expansion.is_expanded(&node.id) {
                return Some(out);
            }

            let count = node.children.len();
            let range = policy.plan(count, 0).range(count);
            if range.start > 0 {
                out.push(Tree::new(format!("… {} above", range.start)));
            }
            for &child in &node.children[range.clone()] {
                if let Some(sub) = build(tree, child, expansion, policy) {
                    out.push(sub);
                }
            }
            if range.end < count {
                out.push(Tree::new(format!("… {} more", count - range.end)));
            }
            Some(out)
        }

        build(self, self.root(), expansion, policy)
            .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
    }
}

/// `label (leaves)` with a marker for url-bearing nodes and collapsed branches.
fn node_label(node: &TreeNode, expansion: &ExpansionState) -> String {
    let marker = match (node.children.is_empty(), expansion.is_expanded(&node.id)) {
        (true, _) => "",
        (false, true) => "▾ ",
        (false, false) => "▸ ",
    };
    let mut parts = vec![format!("{marker}{}", node.label)];
    if !node.children.is_empty() || node.leaf_count > 1 {
        parts.push(format!("({})", node.leaf_count));
    }
    if node.is_leaf_bearing() {
        parts.push("*".to_string());
    }
    parts.iter().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeBuilder;

    fn build(urls: &[&str]) -> UrlTree {
        TreeBuilder::new().build(urls.iter().copied())
    }

    #[test]
    fn given_collapsed_root_when_rendering_then_only_root_shown() {
        let tree = build(&["https://a.com/x"]);
        let mut expansion = ExpansionState::new();
        expansion.toggle("root");

        let rendered = tree
            .to_tree_string(&expansion, &VirtualizationPolicy::default())
            .to_string();

        assert_eq!(rendered.trim_end(), "▸ root (1)");
    }

    #[test]
    fn given_expanded_host_when_rendering_then_children_in_order() {
        let tree = build(&["https://a.com/", "https://a.com/blog/x"]);
        let mut expansion = ExpansionState::new();
        expansion.toggle("host:a.com");

        let rendered = tree
            .to_tree_string(&expansion, &VirtualizationPolicy::default())
            .to_string();

        let blog = rendered.find("blog").unwrap();
        let slash = rendered.find("/ *").unwrap();
        assert!(blog < slash, "{rendered}");
        assert!(rendered.contains("▾ a.com (2)"));
    }

    #[test]
    fn given_many_children_when_rendering_then_window_and_remainder_marker() {
        let urls: Vec<String> = (0..20).map(|i| format!("https://a.com/p{i:02}")).collect();
        let tree = TreeBuilder::new().build(&urls);
        let mut expansion = ExpansionState::new();
        expansion.toggle("host:a.com");
        let policy = VirtualizationPolicy {
            children_threshold: 5,
            viewport_height_px: 120,
            row_height_px: 24,
            overscan_rows: 1,
        };

        let rendered = tree.to_tree_string(&expansion, &policy).to_string();

        // 5 visible rows plus 1 overscan below
        assert!(rendered.contains("p05"));
        assert!(!rendered.contains("p06"));
        assert!(rendered.contains("… 14 more"));
    }
}
