//! Sibling ordering.
//!
//! Directories (nodes without a url) come first, url-bearing nodes after.
//! Inside each group labels compare case-insensitively with
//! [`lexical_sort::lexical_cmp`], falling back to a plain byte comparison so
//! `Blog` and `blog` still have a fixed relative order.

use std::cmp::Ordering;

use generational_arena::Index;
use lexical_sort::lexical_cmp;
use tracing::instrument;

use crate::domain::arena::{TreeNode, UrlTree};

/// Compare two siblings for display.
pub fn compare_siblings(a: &TreeNode, b: &TreeNode) -> Ordering {
    a.is_leaf_bearing()
        .cmp(&b.is_leaf_bearing())
        .then_with(|| lexical_cmp(&a.label, &b.label))
        .then_with(|| a.label.cmp(&b.label))
}

/// Sort the children of every node in place.
///
/// Each child list is sorted independently, so visiting order does not
/// matter; `sort_by` is stable and keeps input order for true ties.
#[instrument(level = "debug", skip_all)]
pub fn sort_children(tree: &mut UrlTree) {
    let parents: Vec<Index> = tree
        .iter()
        .filter(|(_, node)| node.children.len() > 1)
        .map(|(idx, _)| idx)
        .collect();
    let arena = tree.arena_mut();

    for idx in parents {
        let mut children = std::mem::take(&mut arena[idx].children);
        children.sort_by(|&a, &b| match (arena.get(a), arena.get(b)) {
            (Some(a), Some(b)) => compare_siblings(a, b),
            _ => Ordering::Equal,
        });
        arena[idx].children = children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeBuilder;

    fn labels(tree: &UrlTree, id: &str) -> Vec<String> {
        let idx = tree.index_of(id).unwrap();
        tree.children(idx).map(|(_, n)| n.label.clone()).collect()
    }

    #[test]
    fn given_directories_and_pages_when_sorting_then_directories_first() {
        let tree = TreeBuilder::new().build([
            "https://a.com/zeta",
            "https://a.com/alpha/page",
            "https://a.com/beta",
        ]);
        assert_eq!(labels(&tree, "host:a.com"), vec!["alpha", "beta", "zeta"]);

        let tree = TreeBuilder::new().build(["https://a.com/alpha", "https://a.com/zeta/page"]);
        assert_eq!(labels(&tree, "host:a.com"), vec!["zeta", "alpha"]);
    }

    #[test]
    fn given_mixed_case_labels_when_sorting_then_ignores_case() {
        let tree = TreeBuilder::new().build([
            "https://a.com/Charlie",
            "https://a.com/alpha",
            "https://a.com/Bravo",
        ]);
        assert_eq!(labels(&tree, "host:a.com"), vec!["alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn given_labels_differing_only_in_case_when_sorting_then_order_is_fixed() {
        let forward = TreeBuilder::new().build(["https://a.com/blog", "https://a.com/Blog"]);
        let backward = TreeBuilder::new().build(["https://a.com/Blog", "https://a.com/blog"]);
        assert_eq!(labels(&forward, "host:a.com"), labels(&backward, "host:a.com"));
    }
}
