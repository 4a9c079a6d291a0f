//! Bottom-up leaf counting.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::UrlTree;

/// Recompute `leaf_count` for every node.
///
/// `leaf_count(n) = (n carries a url ? 1 : 0) + Σ leaf_count(child)`.
/// Runs over a post-order snapshot, so children are always finished before
/// their parent is summed.
#[instrument(level = "debug", skip_all)]
pub fn aggregate_leaf_counts(tree: &mut UrlTree) {
    let order: Vec<Index> = tree.iter_postorder().map(|(idx, _)| idx).collect();
    let arena = tree.arena_mut();

    for idx in order {
        let own = usize::from(arena[idx].url.is_some());
        let nested: usize = arena[idx]
            .children
            .iter()
            .filter_map(|&c| arena.get(c))
            .map(|c| c.leaf_count)
            .sum();
        arena[idx].leaf_count = own + nested;
    }
}
