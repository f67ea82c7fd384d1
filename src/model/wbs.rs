use serde::{Deserialize, Serialize};

/// A single node in the work-breakdown structure.
///
/// The WBS arrives as a flat list with parent pointers; the engine builds
/// its own child indexes per flatten pass rather than linking nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbsNode {
    pub id: String,
    pub name: String,
    /// Parent node id. `None`, an empty string and the literal `"root"`
    /// all mean top-level.
    pub parent_id: Option<String>,
}

impl WbsNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
        }
    }

    /// True when the parent pointer designates the tree root.
    pub fn is_root_ref(parent_id: Option<&str>) -> bool {
        matches!(parent_id, None | Some("") | Some("root"))
    }
}
