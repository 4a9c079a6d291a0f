//! sitetree: a hierarchical index over URL collections.
//!
//! URLs are grouped into a host → path-segment tree with leaf counts,
//! deterministic ordering, expansion state, substring filtering, and
//! windowed rendering of wide child lists.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
