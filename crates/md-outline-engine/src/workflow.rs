//! Page-level commands that tie the store, the converters and the user together.
//!
//! Each command reports progress and outcome through the [`Notifier`]. Missing
//! input aborts before any conversion runs; store or presenter failures abort
//! with the underlying message. Nothing is rolled back.

use crate::flatten::{TraversalLimits, extract_text, tree_to_markdown_with};
use crate::host::{HostError, MessageLevel, Notifier, Presenter, ResultView};
use crate::outline::convert_to_outline;
use crate::store::{ContentNode, Document, DocumentStore, NodeId, StoreError};
use crate::tree::materialize;

/// View key for the outline conversion result.
pub const OUTLINE_VIEW: &str = "converted-result-modal";
/// View key for the Markdown export result.
pub const MARKDOWN_VIEW: &str = "markdown-result-modal";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("No current page")]
    NoCurrentPage,
    #[error("Page '{0}' has no blocks")]
    EmptyPage(String),
    #[error("Page '{0}' has no text content")]
    BlankContent(String),
    #[error("Store access failed: {0}")]
    Store(#[from] StoreError),
    #[error("Could not show result: {0}")]
    Host(#[from] HostError),
}

impl WorkflowError {
    /// How loudly this failure is reported.
    pub fn level(&self) -> MessageLevel {
        match self {
            WorkflowError::EmptyPage(_) | WorkflowError::BlankContent(_) => MessageLevel::Warning,
            WorkflowError::NoCurrentPage | WorkflowError::Store(_) | WorkflowError::Host(_) => {
                MessageLevel::Error
            }
        }
    }
}

/// The commands available on the current page.
pub struct PageCommands<'h, S: ?Sized, P: ?Sized, N: ?Sized> {
    store: &'h mut S,
    presenter: &'h mut P,
    notifier: &'h N,
    limits: TraversalLimits,
}

impl<'h, S, P, N> PageCommands<'h, S, P, N>
where
    S: DocumentStore + ?Sized,
    P: Presenter + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(store: &'h mut S, presenter: &'h mut P, notifier: &'h N) -> Self {
        Self {
            store,
            presenter,
            notifier,
            limits: TraversalLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Converts the current page's text to outline form and shows it.
    pub fn convert_to_outline(&mut self) -> Result<String, WorkflowError> {
        self.notifier
            .notify("Processing current page...", MessageLevel::Info);

        let result = self.run_convert_to_outline();
        self.report(result, "Conversion complete, copy the result from the viewer")
    }

    /// Exports the current page's block tree as flat Markdown and shows it.
    pub fn export_markdown(&mut self) -> Result<String, WorkflowError> {
        self.notifier
            .notify("Converting page to Markdown...", MessageLevel::Info);

        let result = self.run_export_markdown();
        self.report(result, "Markdown export complete")
    }

    /// Replaces every block on the current page with the blocks described by
    /// `outline`.
    pub fn replace_with_outline(&mut self, outline: &str) -> Result<Vec<NodeId>, WorkflowError> {
        self.notifier
            .notify("Replacing page content...", MessageLevel::Info);

        let result = self.run_replace_with_outline(outline);
        if result.is_ok() {
            self.presenter.dismiss(OUTLINE_VIEW);
        }
        self.report(result, "Page content replaced")
    }

    fn run_convert_to_outline(&mut self) -> Result<String, WorkflowError> {
        let (page, blocks) = self.current_blocks()?;

        let text = extract_text(&blocks, self.limits);
        if text.trim().is_empty() {
            return Err(WorkflowError::BlankContent(page.name));
        }

        let outline = convert_to_outline(&text);
        log::debug!("Converted page {} to outline:\n{outline}", page.name);

        self.presenter.show(&ResultView {
            key: OUTLINE_VIEW,
            title: "Conversion result",
            hint: "Copy the content below into a new page",
            body: &outline,
        })?;
        Ok(outline)
    }

    fn run_export_markdown(&mut self) -> Result<String, WorkflowError> {
        let (_, blocks) = self.current_blocks()?;

        let markdown = tree_to_markdown_with(&blocks, self.limits);

        self.presenter.show(&ResultView {
            key: MARKDOWN_VIEW,
            title: "Markdown",
            hint: "Copy the Markdown below",
            body: &markdown,
        })?;
        Ok(markdown)
    }

    fn run_replace_with_outline(&mut self, outline: &str) -> Result<Vec<NodeId>, WorkflowError> {
        let page = self.current_page()?;

        let existing = self.store.block_forest(&page.name)?.unwrap_or_default();
        for id in existing.iter().filter_map(|block| block.id) {
            self.store.delete_node(id)?;
        }

        Ok(materialize(&mut *self.store, &page.name, outline)?)
    }

    fn current_page(&self) -> Result<Document, WorkflowError> {
        self.store
            .current_document()?
            .ok_or(WorkflowError::NoCurrentPage)
    }

    fn current_blocks(&self) -> Result<(Document, Vec<ContentNode>), WorkflowError> {
        let page = self.current_page()?;
        match self.store.block_forest(&page.name)? {
            Some(blocks) if !blocks.is_empty() => Ok((page, blocks)),
            _ => Err(WorkflowError::EmptyPage(page.name)),
        }
    }

    fn report<T>(
        &self,
        result: Result<T, WorkflowError>,
        success: &str,
    ) -> Result<T, WorkflowError> {
        match &result {
            Ok(_) => self.notifier.notify(success, MessageLevel::Success),
            Err(e) => self.notifier.notify(&e.to_string(), e.level()),
        }
        result
    }
}
