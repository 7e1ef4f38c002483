use super::classify::PseudoKind;

/// The most recently emitted pseudo-heading and its synthetic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PseudoHeader {
    pub kind: PseudoKind,
    pub level: usize,
}

/// Where a real heading lands in the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingPlacement {
    /// Level-1 headings are kept verbatim at the root.
    Verbatim,
    /// Any deeper heading becomes an item at this depth.
    Nested(usize),
}

/// Nesting state carried across lines while converting a document.
///
/// `header_stack` holds one entry per open real heading. Pseudo-headings never
/// enter the stack; their depth is expressed relative to the last real heading.
#[derive(Debug, Default)]
pub struct DepthTracker {
    header_stack: Vec<usize>,
    last_real_level: usize,
    pseudo: Option<PseudoHeader>,
}

impl DepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of items directly under the innermost open heading.
    pub fn base_depth(&self) -> usize {
        self.header_stack.len()
    }

    pub fn header_stack(&self) -> &[usize] {
        &self.header_stack
    }

    pub fn last_real_level(&self) -> usize {
        self.last_real_level
    }

    pub fn pseudo(&self) -> Option<PseudoHeader> {
        self.pseudo
    }

    /// Opens a real heading, closing any open heading at the same or a deeper level.
    pub fn enter_heading(&mut self, level: usize) -> HeadingPlacement {
        self.last_real_level = level;
        self.pseudo = None;

        if level == 1 {
            self.header_stack.clear();
            self.header_stack.push(1);
            return HeadingPlacement::Verbatim;
        }

        while self.header_stack.last().is_some_and(|&top| top >= level) {
            self.header_stack.pop();
        }
        self.header_stack.push(level);
        HeadingPlacement::Nested(self.header_stack.len() - 1)
    }

    /// Assigns a synthetic level to a pseudo-heading and returns its depth.
    ///
    /// Bold labels always sit one level under the last real heading. Code labels
    /// stay level with a preceding code label and drop one level under a bold one.
    pub fn enter_pseudo(&mut self, kind: PseudoKind) -> usize {
        let under_real = self.last_real_level + 1;
        let level = match (self.pseudo, kind) {
            (None, _) | (Some(_), PseudoKind::Bold) => under_real,
            (Some(prior), PseudoKind::Code) if prior.kind == PseudoKind::Code => prior.level,
            (Some(prior), PseudoKind::Code) => prior.level + 1,
        };
        self.pseudo = Some(PseudoHeader { kind, level });

        self.base_depth() + (level - under_real)
    }

    /// Depth of ordinary content under the current heading or pseudo-heading.
    pub fn text_depth(&self) -> usize {
        let pseudo_offset = self
            .pseudo
            .map_or(0, |p| p.level.saturating_sub(self.last_real_level));
        self.base_depth() + pseudo_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_one_resets_stack() {
        let mut tracker = DepthTracker::new();
        tracker.enter_heading(2);
        tracker.enter_heading(3);

        assert_eq!(tracker.enter_heading(1), HeadingPlacement::Verbatim);
        assert_eq!(tracker.header_stack(), &[1]);
        assert_eq!(tracker.last_real_level(), 1);
    }

    #[test]
    fn sibling_headings_share_depth() {
        let mut tracker = DepthTracker::new();
        tracker.enter_heading(1);

        assert_eq!(tracker.enter_heading(2), HeadingPlacement::Nested(1));
        assert_eq!(tracker.enter_heading(3), HeadingPlacement::Nested(2));
        assert_eq!(tracker.enter_heading(3), HeadingPlacement::Nested(2));
        assert_eq!(tracker.enter_heading(2), HeadingPlacement::Nested(1));
        assert_eq!(tracker.header_stack(), &[1, 2]);
    }

    #[test]
    fn skipped_levels_still_nest_one_deeper() {
        let mut tracker = DepthTracker::new();
        tracker.enter_heading(1);

        assert_eq!(tracker.enter_heading(4), HeadingPlacement::Nested(1));
        assert_eq!(tracker.enter_heading(6), HeadingPlacement::Nested(2));
        assert_eq!(tracker.enter_heading(5), HeadingPlacement::Nested(2));
    }

    #[test]
    fn heading_without_level_one_parent() {
        let mut tracker = DepthTracker::new();
        assert_eq!(tracker.enter_heading(2), HeadingPlacement::Nested(0));
        assert_eq!(tracker.text_depth(), 1);
    }

    #[test]
    fn bold_after_bold_recomputes_from_real_heading() {
        let mut tracker = DepthTracker::new();
        tracker.enter_heading(1);
        tracker.enter_heading(2);

        assert_eq!(tracker.enter_pseudo(PseudoKind::Bold), 2);
        assert_eq!(tracker.enter_pseudo(PseudoKind::Bold), 2);
        assert_eq!(
            tracker.pseudo(),
            Some(PseudoHeader {
                kind: PseudoKind::Bold,
                level: 3
            })
        );
    }

    #[test]
    fn code_ranks_below_bold() {
        let mut tracker = DepthTracker::new();
        tracker.enter_heading(1);
        tracker.enter_heading(2);

        assert_eq!(tracker.enter_pseudo(PseudoKind::Bold), 2);
        assert_eq!(tracker.enter_pseudo(PseudoKind::Code), 3);
        assert_eq!(tracker.enter_pseudo(PseudoKind::Code), 3);
        assert_eq!(tracker.text_depth(), 4);

        // Bold snaps back to just under the real heading
        assert_eq!(tracker.enter_pseudo(PseudoKind::Bold), 2);
        assert_eq!(tracker.text_depth(), 3);
    }

    #[test]
    fn real_heading_clears_pseudo_state() {
        let mut tracker = DepthTracker::new();
        tracker.enter_heading(1);
        tracker.enter_pseudo(PseudoKind::Code);
        assert_eq!(tracker.text_depth(), 2);

        tracker.enter_heading(2);
        assert_eq!(tracker.pseudo(), None);
        assert_eq!(tracker.text_depth(), 2);
    }
}
