//! Tree → flat text.
//!
//! Both exports walk the forest depth first, parents before children, and drop
//! the hierarchy. The walk uses an explicit worklist guarded by a depth limit
//! and a set of the identities on the current path, because a store may hand
//! back the same block more than once along a branch.

use std::collections::HashSet;

use crate::outline::classify::{MARKER, is_fence, strip_marker};
use crate::store::{ContentNode, NodeId};

/// Horizontal rule blocks are dropped from Markdown exports.
const RULE: &str = "---";

/// Guard rails for walking a store-supplied forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Nodes deeper than this (roots are depth 0) are skipped with their subtrees.
    pub max_depth: usize,
}

impl TraversalLimits {
    pub const DEFAULT_MAX_DEPTH: usize = 10;

    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DEPTH)
    }
}

enum Step<'a> {
    Enter(&'a ContentNode, usize),
    Leave(NodeId),
}

/// Visits nodes in pre-order, truncating runaway branches.
///
/// `visit` returns whether to descend into the node's children.
fn walk<'a>(
    forest: &'a [ContentNode],
    limits: TraversalLimits,
    mut visit: impl FnMut(&'a ContentNode) -> bool,
) {
    let mut on_path: HashSet<NodeId> = HashSet::new();
    let mut work: Vec<Step<'a>> = forest.iter().rev().map(|n| Step::Enter(n, 0)).collect();

    while let Some(step) = work.pop() {
        let (node, depth) = match step {
            Step::Leave(id) => {
                on_path.remove(&id);
                continue;
            }
            Step::Enter(node, depth) => (node, depth),
        };

        if depth > limits.max_depth {
            log::warn!(
                "Maximum traversal depth {} reached, skipping branch",
                limits.max_depth
            );
            continue;
        }

        if let Some(id) = node.id {
            if !on_path.insert(id) {
                log::warn!("Block {id} appears inside itself, skipping cycle");
                continue;
            }
            work.push(Step::Leave(id));
        }

        if !visit(node) {
            continue;
        }
        work.extend(node.children.iter().rev().map(|c| Step::Enter(c, depth + 1)));
    }
}

/// Exports a forest as flat Markdown, one block per line group.
///
/// Outliner markers are stripped and inside fenced code only the marker is
/// removed so the code keeps its whitespace. A horizontal rule block is dropped
/// together with everything nested under it.
pub fn tree_to_markdown(forest: &[ContentNode]) -> String {
    tree_to_markdown_with(forest, TraversalLimits::default())
}

pub fn tree_to_markdown_with(forest: &[ContentNode], limits: TraversalLimits) -> String {
    let mut writer = MarkdownWriter::default();
    walk(forest, limits, |node| {
        if is_rule(&node.content) {
            return false;
        }
        writer.push(&node.content);
        true
    });
    writer.out
}

/// Concatenates block contents with their leading marker removed.
///
/// This is the raw text fed to the outline converter, so no fence or rule
/// handling happens here.
pub fn extract_text(forest: &[ContentNode], limits: TraversalLimits) -> String {
    let mut out = String::new();
    walk(forest, limits, |node| {
        if node.content.is_empty() {
            return true;
        }
        let content = node
            .content
            .strip_prefix(MARKER)
            .unwrap_or(&node.content);
        out.push_str(content);
        out.push('\n');
        true
    });
    out
}

fn is_rule(content: &str) -> bool {
    strip_marker(content) == RULE
}

#[derive(Debug, Default)]
struct MarkdownWriter {
    in_code_block: bool,
    out: String,
}

impl MarkdownWriter {
    fn push(&mut self, content: &str) {
        if content.is_empty() {
            return;
        }

        let content = content.trim();
        let fences = content
            .lines()
            .filter(|line| is_fence(strip_marker(line)))
            .count();
        if fences % 2 == 1 {
            self.in_code_block = !self.in_code_block;
        }

        let text = match content.strip_prefix(MARKER) {
            Some(rest) if self.in_code_block || fences > 0 => rest,
            Some(rest) => rest.trim(),
            None => content,
        };


        self.out.push_str(text);
        self.out.push('\n');
    }
}
