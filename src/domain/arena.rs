use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::instrument;

use crate::domain::path_key::ROOT_ID;

/// One node of the URL index: the root, a host, or a path prefix.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Deterministic id derived from host and cumulative path
    pub id: String,
    /// Hostname for host nodes, single path segment for path nodes
    pub label: String,
    /// Set when some input URL resolves exactly to this node
    pub url: Option<String>,
    /// Non-owning key into an external page store
    pub page_key: Option<String>,
    /// Number of url-bearing nodes in this subtree, itself included
    pub leaf_count: usize,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

impl TreeNode {
    fn new(id: String, label: String, parent: Option<Index>) -> Self {
        Self {
            id,
            label,
            url: None,
            page_key: None,
            leaf_count: 0,
            parent,
            children: Vec::new(),
        }
    }

    /// `true` if this node corresponds to an input URL.
    pub fn is_leaf_bearing(&self) -> bool {
        self.url.is_some()
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Arena-backed URL tree.
///
/// Every node lives in one generational arena; an id index gives O(1) lookups
/// by node id. A tree is produced wholesale by [`crate::domain::TreeBuilder`]
/// and is never patched afterwards.
#[derive(Debug, Clone)]
pub struct UrlTree {
    arena: Arena<TreeNode>,
    root: Index,
    ids: HashMap<String, Index>,
}

impl Default for UrlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlTree {
    /// A tree holding only the synthetic root.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Arena::with_capacity(capacity.max(1));
        let root = arena.insert(TreeNode::new(ROOT_ID.to_string(), ROOT_ID.to_string(), None));
        let mut ids = HashMap::with_capacity(capacity.max(1));
        ids.insert(ROOT_ID.to_string(), root);
        Self { arena, root, ids }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.arena[self.root]
    }

    /// Return the node with `id` under `parent`, creating it if absent.
    ///
    /// Ids encode the whole path from the root, so an existing node is always
    /// already attached to `parent`.
    pub(crate) fn ensure_child(&mut self, parent: Index, id: String, label: &str) -> Index {
        if let Some(&existing) = self.ids.get(&id) {
            debug_assert_eq!(
                self.arena[existing].parent,
                Some(parent),
                "node {id} reached under a different parent"
            );
            return existing;
        }

        let idx = self
            .arena
            .insert(TreeNode::new(id.clone(), label.to_string(), Some(parent)));
        self.arena[parent].children.push(idx);
        self.ids.insert(id, idx);
        idx
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena<TreeNode> {
        &mut self.arena
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub(crate) fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.ids.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    /// Node that holds `url`, if the URL was indexed.
    pub fn find_url(&self, url: &str) -> Option<&TreeNode> {
        let key = crate::domain::PathKey::parse(url).ok()?;
        self.get(&key.node_id())
            .filter(|node| node.is_leaf_bearing())
    }

    /// Children of `idx`, in their current order.
    pub fn children(&self, idx: Index) -> impl Iterator<Item = (Index, &TreeNode)> + '_ {
        self.arena
            .get(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&child| self.arena.get(child).map(|n| (child, n)))
    }

    pub fn parent(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)?.parent.and_then(|p| self.arena.get(p))
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// `true` when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.arena[self.root].children.is_empty()
    }

    /// Number of url-bearing nodes in the whole tree.
    pub fn leaf_count(&self) -> usize {
        self.arena[self.root].leaf_count
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Depth in levels; a root-only tree has depth 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
        max_depth
    }

    /// All indexed URLs in display order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_urls(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|(_, node)| node.url.as_deref())
            .collect()
    }

    /// All node ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|(_, node)| node.id.as_str()).collect()
    }
}

/// Pre-order traversal with an explicit stack.
pub struct TreeIterator<'a> {
    tree: &'a UrlTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a UrlTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Post-order traversal with an explicit stack; children before parents.
pub struct PostOrderIterator<'a> {
    tree: &'a UrlTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a UrlTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root(), false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

/// Borrowed view used to serialize a subtree as nested JSON.
pub struct NodeView<'a> {
    tree: &'a UrlTree,
    idx: Index,
}

impl<'a> NodeView<'a> {
    pub fn new(tree: &'a UrlTree, idx: Index) -> Self {
        Self { tree, idx }
    }
}

// Serialization recurses once per level; URL depth is small even when the
// number of hosts and pages is not.
impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = match self.tree.get_node(self.idx) {
            Some(node) => node,
            None => return serializer.serialize_none(),
        };
        let children: Vec<NodeView<'_>> = node
            .children
            .iter()
            .map(|&c| NodeView::new(self.tree, c))
            .collect();

        let mut s = serializer.serialize_struct("TreeNode", 6)?;
        s.serialize_field("id", &node.id)?;
        s.serialize_field("label", &node.label)?;
        s.serialize_field("url", &node.url)?;
        s.serialize_field("pageKey", &node.page_key)?;
        s.serialize_field("leafCount", &node.leaf_count)?;
        s.serialize_field("children", &children)?;
        s.end()
    }
}

impl Serialize for UrlTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeView::new(self, self.root).serialize(serializer)
    }
}
