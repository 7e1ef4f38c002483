use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    ContentNode, Document, DocumentStore, InsertOptions, NodeId, NodeParent, StoreError,
};

/// In-memory [`DocumentStore`] that (de)serialises as JSON.
///
/// Pages are keyed by name and hold their blocks as nested [`ContentNode`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current: Option<String>,
    #[serde(default)]
    pages: BTreeMap<String, Vec<ContentNode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a page and makes it current.
    pub fn with_page(mut self, name: &str, blocks: Vec<ContentNode>) -> Self {
        self.insert_page(name, blocks);
        self.current = Some(name.to_string());
        self
    }

    pub fn insert_page(&mut self, name: &str, mut blocks: Vec<ContentNode>) {
        assign_missing_ids(&mut blocks);
        self.pages.insert(name.to_string(), blocks);
    }

    /// Makes `name` the current page. Returns false if no such page exists.
    pub fn open(&mut self, name: &str) -> bool {
        if self.pages.contains_key(name) {
            self.current = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn page(&self, name: &str) -> Option<&[ContentNode]> {
        self.pages.get(name).map(Vec::as_slice)
    }

    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Gives every block loaded without an identity a fresh one.
    pub fn ensure_ids(&mut self) {
        for blocks in self.pages.values_mut() {
            assign_missing_ids(blocks);
        }
    }
}

impl DocumentStore for MemoryStore {
    fn current_document(&self) -> Result<Option<Document>, StoreError> {
        Ok(self
            .current
            .as_ref()
            .filter(|name| self.pages.contains_key(*name))
            .map(|name| Document { name: name.clone() }))
    }

    fn block_forest(&self, document: &str) -> Result<Option<Vec<ContentNode>>, StoreError> {
        Ok(self.pages.get(document).cloned())
    }

    fn delete_node(&mut self, id: NodeId) -> Result<(), StoreError> {
        let removed = self
            .pages
            .values_mut()
            .any(|blocks| remove_node(blocks, id));
        if removed {
            log::debug!("Deleted block {id}");
            Ok(())
        } else {
            Err(StoreError::NodeNotFound(id))
        }
    }

    fn create_node(
        &mut self,
        parent: NodeParent<'_>,
        content: &str,
        options: InsertOptions,
    ) -> Result<NodeId, StoreError> {
        let id = NodeId::new();
        let node = ContentNode::new(content).with_id(id);

        let siblings = match parent {
            NodeParent::Document(name) => self
                .pages
                .get_mut(name)
                .ok_or_else(|| StoreError::DocumentNotFound(name.to_string()))?,
            NodeParent::Node(parent_id) => {
                &mut self
                    .pages
                    .values_mut()
                    .find_map(|blocks| find_node_mut(blocks, parent_id))
                    .ok_or(StoreError::NodeNotFound(parent_id))?
                    .children
            }
        };
        siblings.push(node);

        log::debug!("Created block {id} under {parent:?} (sibling: {})", options.sibling);
        Ok(id)
    }
}

fn assign_missing_ids(blocks: &mut [ContentNode]) {
    for node in blocks {
        if node.id.is_none() {
            node.id = Some(NodeId::new());
        }
        assign_missing_ids(&mut node.children);
    }
}

fn find_node_mut(blocks: &mut [ContentNode], id: NodeId) -> Option<&mut ContentNode> {
    for node in blocks {
        if node.id == Some(id) {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove_node(blocks: &mut Vec<ContentNode>, id: NodeId) -> bool {
    if let Some(pos) = blocks.iter().position(|node| node.id == Some(id)) {
        blocks.remove(pos);
        return true;
    }
    blocks
        .iter_mut()
        .any(|node| remove_node(&mut node.children, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contents(blocks: &[ContentNode]) -> Vec<&str> {
        blocks.iter().map(|b| b.content.as_str()).collect()
    }

    #[test]
    fn current_document_requires_existing_page() {
        let store = MemoryStore::new();
        assert_eq!(store.current_document().unwrap(), None);

        let store = MemoryStore::new().with_page("notes", vec![]);
        assert_eq!(
            store.current_document().unwrap(),
            Some(Document {
                name: "notes".to_string()
            })
        );
    }

    #[test]
    fn loaded_blocks_get_ids() {
        let store = MemoryStore::new().with_page(
            "p",
            vec![ContentNode::new("a").with_children(vec![ContentNode::new("b")])],
        );
        let page = store.page("p").unwrap();
        assert!(page[0].id.is_some());
        assert!(page[0].children[0].id.is_some());
    }

    #[test]
    fn create_appends_in_order() {
        // Given an empty page
        let mut store = MemoryStore::new().with_page("p", vec![]);

        // When creating a root with two children
        let root = store
            .create_node(NodeParent::Document("p"), "root", InsertOptions::default())
            .unwrap();
        store
            .create_node(NodeParent::Node(root), "first", InsertOptions::default())
            .unwrap();
        store
            .create_node(NodeParent::Node(root), "second", InsertOptions::default())
            .unwrap();

        // Then children keep creation order
        let page = store.page("p").unwrap();
        assert_eq!(contents(page), vec!["root"]);
        assert_eq!(contents(&page[0].children), vec!["first", "second"]);
        assert_eq!(page[0].id, Some(root));
    }

    #[test]
    fn root_inserts_append_whatever_the_sibling_hint() {
        let mut store = MemoryStore::new().with_page("p", vec![]);

        for (content, sibling) in [("a", false), ("b", true), ("c", false)] {
            store
                .create_node(NodeParent::Document("p"), content, InsertOptions { sibling })
                .unwrap();
        }

        let page = store.page("p").unwrap();
        assert_eq!(contents(page), vec!["a", "b", "c"]);
        assert!(page.iter().all(|node| node.children.is_empty()));
    }

    #[test]
    fn create_under_missing_parent_fails() {
        let mut store = MemoryStore::new().with_page("p", vec![]);
        let missing = NodeId::new();

        let err = store
            .create_node(NodeParent::Node(missing), "x", InsertOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NodeNotFound(id) if id == missing));

        let err = store
            .create_node(NodeParent::Document("nope"), "x", InsertOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(_)));
    }

    #[test]
    fn delete_removes_subtree() {
        let mut store = MemoryStore::new().with_page(
            "p",
            vec![
                ContentNode::new("keep"),
                ContentNode::new("drop").with_children(vec![ContentNode::new("child")]),
            ],
        );
        let drop_id = store.page("p").unwrap()[1].id.unwrap();

        store.delete_node(drop_id).unwrap();

        assert_eq!(contents(store.page("p").unwrap()), vec!["keep"]);
        assert!(store.delete_node(drop_id).is_err());
    }

    #[test]
    fn delete_nested_block() {
        let mut store = MemoryStore::new().with_page(
            "p",
            vec![ContentNode::new("a").with_children(vec![ContentNode::new("b")])],
        );
        let nested = store.page("p").unwrap()[0].children[0].id.unwrap();

        store.delete_node(nested).unwrap();

        assert!(store.page("p").unwrap()[0].children.is_empty());
    }

    #[test]
    fn json_roundtrip_keeps_current_page() {
        let json = r#"{
            "current": "journal",
            "pages": { "journal": [ { "content": "hello", "children": [ { "content": "world" } ] } ] }
        }"#;

        let mut store: MemoryStore = serde_json::from_str(json).unwrap();
        store.ensure_ids();

        assert_eq!(store.current_document().unwrap().unwrap().name, "journal");
        let page = store.page("journal").unwrap();
        assert_eq!(page[0].children[0].content, "world");
        assert!(page[0].children[0].id.is_some());

        let back: MemoryStore =
            serde_json::from_str(&serde_json::to_string(&store).unwrap()).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn open_switches_current_page() {
        let mut store = MemoryStore::new()
            .with_page("a", vec![])
            .with_page("b", vec![]);
        assert!(store.open("a"));
        assert!(!store.open("missing"));
        assert_eq!(store.current_document().unwrap().unwrap().name, "a");
        assert_eq!(store.page_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
