//! Outline → tree reconstruction.
//!
//! Indentation decides parentage: an item's parent is the item most recently
//! opened one level up. An item indented deeper than any open ancestor has no
//! parent and is attached at the root rather than dropped.

pub mod parse;

pub use parse::{OutlineItem, parse_outline};

use crate::store::{ContentNode, DocumentStore, InsertOptions, NodeId, NodeParent, StoreError};

/// Most recently opened item at each depth.
#[derive(Debug)]
struct OpenLevels<T> {
    slots: Vec<Option<T>>,
}

impl<T: Clone> OpenLevels<T> {
    fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Closes everything at `depth` or deeper and returns the parent for a new
    /// item at `depth`, if one is open.
    fn parent_for(&mut self, depth: usize) -> Option<T> {
        self.slots.truncate(depth);
        let parent_depth = depth.checked_sub(1)?;
        self.slots.get(parent_depth).cloned().flatten()
    }

    fn any_open(&self) -> bool {
        !self.slots.is_empty()
    }

    fn open(&mut self, depth: usize, value: T) {
        if self.slots.len() <= depth {
            self.slots.resize(depth + 1, None);
        }
        self.slots[depth] = Some(value);
    }
}

/// Builds an owned forest from outline text without touching any store.
pub fn build_forest(outline: &str) -> Vec<ContentNode> {
    let items = parse_outline(outline);

    // Parents always precede their children, so indices are assigned in
    // document order and children always carry a larger index.
    let mut levels: OpenLevels<usize> = OpenLevels::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut roots = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match levels.parent_for(item.depth) {
            Some(parent) => children[parent].push(index),
            None => roots.push(index),
        }
        levels.open(item.depth, index);
    }

    let mut slots: Vec<Option<ContentNode>> = vec![None; items.len()];
    for (index, item) in items.into_iter().enumerate().rev() {
        let kids = children[index]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        slots[index] = Some(ContentNode::new(item.content).with_children(kids));
    }

    roots
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}

/// Creates one block per outline item in `document`, parents before children.
///
/// Creation is strictly sequential because a child needs its parent's id.
/// A failure part way leaves the blocks created so far in place.
pub fn materialize<S: DocumentStore + ?Sized>(
    store: &mut S,
    document: &str,
    outline: &str,
) -> Result<Vec<NodeId>, StoreError> {
    let mut levels = OpenLevels::new();
    let mut created = Vec::new();

    for item in parse_outline(outline) {
        let parent = levels.parent_for(item.depth);
        let options = InsertOptions {
            sibling: parent.is_none() && levels.any_open(),
        };
        let target = match parent {
            Some(id) => NodeParent::Node(id),
            None => NodeParent::Document(document),
        };

        let id = store.create_node(target, &item.content, options)?;
        levels.open(item.depth, id);
        created.push(id);
    }

    log::debug!("Materialised {} blocks into {document}", created.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn node(content: &str, children: Vec<ContentNode>) -> ContentNode {
        ContentNode::new(content).with_children(children)
    }

    fn leaf(content: &str) -> ContentNode {
        ContentNode::new(content)
    }

    #[test]
    fn builds_nested_forest() {
        let forest = build_forest("# Title\n\t- ## A\n\t\t- a1\n\t\t- a2\n\t- ## B\n# Next");
        assert_eq!(
            forest,
            vec![
                node(
                    "# Title",
                    vec![
                        node("## A", vec![leaf("a1"), leaf("a2")]),
                        leaf("## B"),
                    ]
                ),
                leaf("# Next"),
            ]
        );
    }

    #[test]
    fn orphan_is_attached_at_root() {
        // Given a line two levels deeper than any open ancestor
        let forest = build_forest("- a\n\t\t\t- too deep\n\t- child");

        // Then it becomes a root, and later items still find their parent
        assert_eq!(
            forest,
            vec![node("a", vec![leaf("child")]), leaf("too deep")]
        );
    }

    #[test]
    fn children_of_orphan_attach_to_it() {
        let forest = build_forest("\t\t- orphan\n\t\t\t- child");
        assert_eq!(forest, vec![node("orphan", vec![leaf("child")])]);
    }

    #[test]
    fn atomic_spans_become_single_nodes() {
        let forest = build_forest("# A\n\t- ```sh\n\tls\n\t```\n\t- | x |\n\t| y |");
        assert_eq!(
            forest,
            vec![node("# A", vec![leaf("```sh\nls\n```"), leaf("| x |\n| y |")])]
        );
    }

    #[test]
    fn code_node_keeps_whitespace_only_lines() {
        let outline = crate::convert_to_outline("# A\n```\nx\n    \ny\n```");
        let forest = build_forest(&outline);
        assert_eq!(forest[0].children[0].content, "```\nx\n    \ny\n```");
    }

    #[test]
    fn empty_outline_builds_nothing() {
        assert!(build_forest("").is_empty());
        assert!(build_forest("\n\t\n").is_empty());
    }

    #[test]
    fn materialize_mirrors_build_forest() {
        let outline = "# A\n\t- b\n\t\t- c\n\t- d\n- e";
        let mut store = MemoryStore::new().with_page("p", vec![]);

        let created = materialize(&mut store, "p", outline).unwrap();

        assert_eq!(created.len(), 5);
        let mut stored = store.page("p").unwrap().to_vec();
        strip_ids(&mut stored);
        assert_eq!(stored, build_forest(outline));
    }

    #[test]
    fn materialize_stops_at_first_failure() {
        let mut store = MemoryStore::new();
        let err = materialize(&mut store, "missing", "- a").unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(_)));
    }

    fn strip_ids(nodes: &mut [ContentNode]) {
        for n in nodes {
            n.id = None;
            strip_ids(&mut n.children);
        }
    }
}
