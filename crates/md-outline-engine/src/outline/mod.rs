//! Markdown → outline conversion.
//!
//! A single pass over the document's lines infers a nesting depth for every
//! line from heading markers, pseudo-heading labels, code fences and tables,
//! then writes that depth out as leading tabs in front of a `- ` marker.

pub mod classify;
pub mod depth;

use std::fmt;

use classify::{LineKind, MARKER, classify, strip_code_marker, strip_marker};
use depth::{DepthTracker, HeadingPlacement};

/// One emitted row of outline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    pub depth: usize,
    pub marker: bool,
    pub text: String,
}

impl OutlineLine {
    /// An outline item: tabs, marker, text.
    pub fn item(depth: usize, text: &str) -> Self {
        Self {
            depth,
            marker: true,
            text: text.to_string(),
        }
    }

    /// A continuation row of an atomic span (fence body, table row).
    pub fn continuation(depth: usize, text: &str) -> Self {
        Self {
            depth,
            marker: false,
            text: text.to_string(),
        }
    }

    /// A row kept exactly as written, at the root.
    pub fn verbatim(text: &str) -> Self {
        Self::continuation(0, text)
    }

    pub fn blank() -> Self {
        Self::verbatim("")
    }

    pub fn is_blank(&self) -> bool {
        !self.marker && self.text.is_empty()
    }
}

impl fmt::Display for OutlineLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str("\t")?;
        }
        if self.marker {
            f.write_str(MARKER)?;
        }
        f.write_str(&self.text)
    }
}

/// Converts Markdown text into tab-indented outline text.
///
/// Never fails: unbalanced fences or odd headings produce best-effort nesting.
pub fn convert_to_outline(markdown: &str) -> String {
    outline_lines(markdown)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same as [`convert_to_outline`] but returns the structured rows.
pub fn outline_lines(markdown: &str) -> Vec<OutlineLine> {
    let text = markdown.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut converter = OutlineConverter::default();
    for line in text.split('\n') {
        converter.push(line);
    }
    converter.finish()
}

#[derive(Debug, Default)]
struct OutlineConverter {
    depth: DepthTracker,
    /// Depth captured when the open code fence started.
    code_block: Option<usize>,
    /// Depth captured when the open table started.
    table: Option<usize>,
    out: Vec<OutlineLine>,
}

impl OutlineConverter {
    fn push(&mut self, raw: &str) {
        let stripped = strip_marker(raw);
        let kind = classify(stripped);

        if kind == LineKind::CodeFence {
            self.toggle_fence(stripped);
            return;
        }

        if let Some(depth) = self.code_block {
            self.push_code_line(depth, raw);
            return;
        }

        if kind == LineKind::TableRow {
            self.push_table_row(stripped);
            return;
        }

        // Anything else ends an open table
        self.table = None;

        match kind {
            LineKind::Blank => self.out.push(OutlineLine::blank()),
            LineKind::RealHeading { level } => {
                let line = match self.depth.enter_heading(level) {
                    HeadingPlacement::Verbatim => OutlineLine::verbatim(stripped),
                    HeadingPlacement::Nested(depth) => OutlineLine::item(depth, stripped),
                };
                self.out.push(line);
            }
            LineKind::PseudoHeading { kind } => {
                let depth = self.depth.enter_pseudo(kind);
                self.out.push(OutlineLine::item(depth, stripped));
            }
            LineKind::PlainText => {
                let depth = self.depth.text_depth();
                self.out.push(OutlineLine::item(depth, stripped));
            }
            LineKind::CodeFence | LineKind::TableRow => {}
        }
    }

    fn toggle_fence(&mut self, stripped: &str) {
        match self.code_block.take() {
            Some(depth) => self.out.push(OutlineLine::continuation(depth, stripped)),
            None => {
                let depth = self.depth.base_depth();
                self.table = None;
                self.code_block = Some(depth);
                self.out.push(OutlineLine::item(depth, stripped));
            }
        }
    }

    fn push_code_line(&mut self, depth: usize, raw: &str) {
        let code = strip_code_marker(raw);
        if code.is_empty() {
            self.out.push(OutlineLine::blank());
        } else {
            self.out.push(OutlineLine::continuation(depth, &code));
        }
    }

    fn push_table_row(&mut self, stripped: &str) {
        match self.table {
            Some(depth) => self.out.push(OutlineLine::continuation(depth, stripped)),
            None => {
                let depth = self.depth.base_depth();
                self.table = Some(depth);
                self.out.push(OutlineLine::item(depth, stripped));
            }
        }
    }

    fn finish(self) -> Vec<OutlineLine> {
        self.out
    }
}
