pub mod flatten;
pub mod host;
pub mod io;
pub mod outline;
pub mod store;
pub mod tree;
pub mod workflow;

// Re-export key types for easier usage
pub use flatten::{TraversalLimits, extract_text, tree_to_markdown, tree_to_markdown_with};
pub use host::{HostError, LogNotifier, MessageLevel, Notifier, Presenter, ResultView};
pub use outline::{OutlineLine, convert_to_outline, outline_lines};
pub use store::{
    ContentNode, Document, DocumentStore, InsertOptions, MemoryStore, NodeId, NodeParent,
    StoreError,
};
pub use tree::{OutlineItem, build_forest, materialize, parse_outline};
pub use workflow::{MARKDOWN_VIEW, OUTLINE_VIEW, PageCommands, WorkflowError};
