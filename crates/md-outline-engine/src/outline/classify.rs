use std::sync::OnceLock;

use regex::Regex;

/// Bullet marker an outliner puts in front of every item.
pub const MARKER: &str = "- ";
/// Opening and closing delimiter of a fenced code block.
pub const FENCE: &str = "```";

/// Styling of a pseudo-heading label.
///
/// Bold labels outrank code labels when both appear under the same real heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoKind {
    /// `**Label**：`
    Bold,
    /// `` `name`： `` or `` `a`/`b`： ``
    Code,
}

/// Classification of a single line containing only local facts.
///
/// Whether the line sits inside an open fence or table is decided by the
/// caller; this only looks at the marker-stripped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    CodeFence,
    TableRow,
    RealHeading { level: usize },
    PseudoHeading { kind: PseudoKind },
    PlainText,
}

/// Trims the line and removes one leading outliner marker, if present.
pub fn strip_marker(line: &str) -> &str {
    let trimmed = line.trim();
    match trimmed.strip_prefix(MARKER) {
        Some(rest) => rest.trim(),
        None => trimmed,
    }
}

/// Removes a marker from a code line while keeping the code's own indentation.
pub fn strip_code_marker(line: &str) -> String {
    let indent = line.len() - line.trim_start().len();
    match line[indent..].strip_prefix(MARKER) {
        Some(rest) => format!("{}{rest}", &line[..indent]),
        None => line.to_string(),
    }
}

pub fn is_fence(stripped: &str) -> bool {
    stripped.starts_with(FENCE)
}

/// Counts leading `#` characters, skipping whitespace between them.
pub fn heading_level(stripped: &str) -> usize {
    let mut level = 0;
    let mut rest = stripped;
    while let Some(tail) = rest.strip_prefix('#') {
        level += 1;
        rest = tail.trim();
    }
    level
}

/// Detects a bold or code-styled label line ending in a full-width colon.
pub fn pseudo_kind(stripped: &str) -> Option<PseudoKind> {
    static BOLD_TITLE: OnceLock<Regex> = OnceLock::new();
    static CODE_TITLE: OnceLock<Regex> = OnceLock::new();

    let bold = BOLD_TITLE
        .get_or_init(|| Regex::new(r"^\*\*[^*]+\*\*：").expect("Invalid bold title regex"));
    let code = CODE_TITLE.get_or_init(|| {
        Regex::new(r"^`[^`]+`(?:/`[^`]+`)*：").expect("Invalid code title regex")
    });

    if bold.is_match(stripped) {
        Some(PseudoKind::Bold)
    } else if code.is_match(stripped) {
        Some(PseudoKind::Code)
    } else {
        None
    }
}

/// Classifies a marker-stripped line.
pub fn classify(stripped: &str) -> LineKind {
    if is_fence(stripped) {
        return LineKind::CodeFence;
    }
    if stripped.contains('|') {
        return LineKind::TableRow;
    }
    if stripped.is_empty() {
        return LineKind::Blank;
    }
    match heading_level(stripped) {
        0 => match pseudo_kind(stripped) {
            Some(kind) => LineKind::PseudoHeading { kind },
            None => LineKind::PlainText,
        },
        level => LineKind::RealHeading { level },
    }
}
