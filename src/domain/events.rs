//! Events handed to navigation and persistence collaborators.

use serde::{Deserialize, Serialize};

/// Something the user did to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TreeEvent {
    /// A url-bearing node was selected
    #[serde(rename_all = "camelCase")]
    NodeSelected {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        page_key: Option<String>,
    },
    /// A node was expanded or collapsed
    #[serde(rename_all = "camelCase")]
    NodeToggled { id: String, expanded: bool },
}
