//! Block store abstraction.
//!
//! The outliner that ultimately owns the blocks is an external collaborator.
//! Everything the engine needs from it goes through [`DocumentStore`], so the
//! conversion workflows can run against [`MemoryStore`] in tests and in the CLI.

pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::MemoryStore;

/// Opaque identity of a stored block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A block with its content and ordered children.
///
/// Nodes built from outline text have no `id` until a store materialises them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        self.children = children;
        self
    }
}

/// A page in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
}

/// Where a new block goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeParent<'a> {
    /// Appended at the root of the named page.
    Document(&'a str),
    /// Appended as the last child of an existing block.
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertOptions {
    /// Insert next to the previously created root block instead of as its child.
    ///
    /// Only a hint for hosts whose page-level insert would otherwise nest under
    /// the last block. [`MemoryStore`] always appends to the page's root list,
    /// so it ignores this flag.
    pub sibling: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    DocumentNotFound(String),
    #[error("Block not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Store error: {0}")]
    Backend(String),
}

/// Access to the outliner's pages and blocks.
///
/// `create_node` must append, so that creation order becomes sibling order.
pub trait DocumentStore {
    fn current_document(&self) -> Result<Option<Document>, StoreError>;

    fn block_forest(&self, document: &str) -> Result<Option<Vec<ContentNode>>, StoreError>;

    fn delete_node(&mut self, id: NodeId) -> Result<(), StoreError>;

    fn create_node(
        &mut self,
        parent: NodeParent<'_>,
        content: &str,
        options: InsertOptions,
    ) -> Result<NodeId, StoreError>;
}
