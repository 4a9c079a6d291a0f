//! Domain layer: the URL index core
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod arena;
pub mod builder;
pub mod error;
pub mod events;
pub mod expansion;
pub mod filter;
pub mod ordering;
pub mod path_key;
pub mod virtualization;

pub use aggregate::aggregate_leaf_counts;
pub use arena::{NodeView, TreeNode, UrlTree};
pub use builder::{BuildStats, NoPages, PageLookup, TreeBuilder};
pub use error::{DomainError, DomainResult};
pub use events::TreeEvent;
pub use expansion::{visible_rows, ExpansionSnapshot, ExpansionState, VisibleRow};
pub use filter::{FilteredView, UrlFilter};
pub use ordering::{compare_siblings, sort_children};
pub use path_key::{expand_chain, PathKey, ROOT_ID};
pub use virtualization::{ChildWindow, RenderPlan, VirtualizationPolicy};
