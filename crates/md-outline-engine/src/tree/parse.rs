use crate::outline::classify::{FENCE, MARKER};

/// One outline item after atomic spans have been merged back together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Number of leading tabs on the item's first line.
    pub depth: usize,
    pub content: String,
}

/// Splits outline text into items.
///
/// Blank lines are skipped. A fenced code block or a run of table rows becomes
/// a single item, however many lines it spans.
pub fn parse_outline(text: &str) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    let mut lines = text.split('\n').peekable();

    while let Some(line) = lines.next() {
        let depth = leading_tabs(line);
        let content = item_content(line);
        if content.is_empty() {
            continue;
        }

        let content = if content.starts_with(FENCE) {
            let mut block = vec![content.to_string()];
            for next in lines.by_ref() {
                block.push(strip_tabs(next, depth).to_string());
                if next.trim().starts_with(FENCE) {
                    break;
                }
            }
            block.join("\n").trim().to_string()
        } else if content.contains('|') {
            let mut rows = vec![content.to_string()];
            while let Some(&next) = lines.peek() {
                let row = item_content(next);
                if row.is_empty() || !row.contains('|') {
                    break;
                }
                rows.push(row.to_string());
                lines.next();
            }
            rows.join("\n")
        } else {
            content.to_string()
        };

        items.push(OutlineItem { depth, content });
    }

    items
}

fn leading_tabs(line: &str) -> usize {
    line.chars().take_while(|&c| c == '\t').count()
}

/// Removes indentation and the item marker, then trims.
fn item_content(line: &str) -> &str {
    let unindented = line.trim_start_matches('\t');
    unindented.strip_prefix(MARKER).unwrap_or(line).trim()
}

/// Removes at most `depth` leading tabs, leaving the code's own indentation.
fn strip_tabs(line: &str, depth: usize) -> &str {
    let tabs = leading_tabs(line).min(depth);
    &line[tabs..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(depth: usize, content: &str) -> OutlineItem {
        OutlineItem {
            depth,
            content: content.to_string(),
        }
    }

    #[test]
    fn reads_depth_and_content() {
        let items = parse_outline("# A\n\t- b\n\t\t- c\n\n\t- d");
        assert_eq!(
            items,
            vec![item(0, "# A"), item(1, "b"), item(2, "c"), item(1, "d")]
        );
    }

    #[test]
    fn unmarked_line_is_trimmed() {
        assert_eq!(parse_outline("\t  loose text  "), vec![item(1, "loose text")]);
    }

    #[test]
    fn code_block_is_one_item() {
        let items = parse_outline("\t- ```rust\n\tfn main() {\n\n\t    body();\n\t}\n\t```\n\t- after");
        assert_eq!(
            items,
            vec![
                item(1, "```rust\nfn main() {\n\n    body();\n}\n```"),
                item(1, "after"),
            ]
        );
    }

    #[test]
    fn unclosed_code_block_runs_to_end() {
        let items = parse_outline("- ```\nline\n- not an item");
        assert_eq!(items, vec![item(0, "```\nline\n- not an item")]);
    }

    #[test]
    fn table_rows_are_one_item() {
        let items = parse_outline("\t- | a | b |\n\t|---|---|\n\t| 1 | 2 |\n\t- after");
        assert_eq!(
            items,
            vec![item(1, "| a | b |\n|---|---|\n| 1 | 2 |"), item(1, "after")]
        );
    }

    #[test]
    fn table_stops_at_blank_line() {
        let items = parse_outline("- | a |\n\n- | b |");
        assert_eq!(items, vec![item(0, "| a |"), item(0, "| b |")]);
    }

    #[test]
    fn stray_line_between_tables_stays_separate() {
        // A single non-table line between two table-like runs splits them
        let items = parse_outline("- | a |\n- stray\n- | b |\n| c |");
        assert_eq!(
            items,
            vec![item(0, "| a |"), item(0, "stray"), item(0, "| b |\n| c |")]
        );
    }
}
