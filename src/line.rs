//! Line packer: accumulates items into one line under width, tab stop and
//! hyphenation constraints.

use std::sync::Arc;

use crate::error::Diagnostic;
use crate::hyphenate::Hyphenator;
use crate::item::{Item, Space};
use crate::style::{Justify, ParagraphStyle, SoftHyphenPolicy, MAX_TAB_STOPS};
use crate::tab_stops::{find_tab_stop, TabAlign, TabStop};

/// Result of offering one item to a line.
#[derive(Debug)]
#[must_use]
pub enum AppendOutcome {
    /// The item was placed (or dropped as leading whitespace).
    Fits,
    /// The line is full; a hyphenated fragment was placed and this remainder
    /// must start the next line.
    EndedWithRemainder(Item),
    /// The line is full; the item was not placed and must be offered to the
    /// next line.
    EndedPlain(Item),
}

impl AppendOutcome {
    pub fn is_fits(&self) -> bool {
        matches!(self, Self::Fits)
    }
}

/// Paragraph-level settings every line of a paragraph packs against.
#[derive(Clone)]
pub struct LineRules {
    pub tab_stops: heapless::Vec<TabStop, MAX_TAB_STOPS>,
    pub hyphenator: Arc<dyn Hyphenator>,
    pub soft_hyphens: SoftHyphenPolicy,
    pub justify: Justify,
}

impl core::fmt::Debug for LineRules {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineRules")
            .field("tab_stops", &self.tab_stops)
            .field("soft_hyphens", &self.soft_hyphens)
            .field("justify", &self.justify)
            .finish()
    }
}

impl LineRules {
    pub fn new(style: &ParagraphStyle, hyphenator: Arc<dyn Hyphenator>) -> Self {
        Self {
            tab_stops: heapless::Vec::from_slice(style.tab_stops()).unwrap_or_default(),
            hyphenator,
            soft_hyphens: style.soft_hyphens,
            justify: style.justify,
        }
    }
}

/// One line being packed.
///
/// Only [`append`](Self::append) grows the line; once packed it is typeset
/// with [`typeset`](Self::typeset) or [`finalize`](Self::finalize).
#[derive(Debug)]
pub struct Line {
    pub(crate) items: Vec<Item>,
    pub(crate) width: f32,
    pub(crate) indent: f32,
    text_width: f32,
    in_tab: Option<usize>,
    pub(crate) rules: LineRules,
    diagnostics: Vec<Diagnostic>,
}

impl Line {
    /// Empty line spanning `available` minus `indent`.
    pub fn new(available: f32, indent: f32, rules: LineRules) -> Self {
        Self {
            items: Vec::with_capacity(16),
            width: available - indent,
            indent,
            text_width: 0.0,
            in_tab: None,
            rules,
            diagnostics: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Width available to content (line width minus indent).
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn indent(&self) -> f32 {
        self.indent
    }

    /// Width charged so far.
    pub fn text_width(&self) -> f32 {
        self.text_width
    }

    /// Remaining budget of the active right/center tab, if any.
    pub fn tab_budget(&self) -> Option<f32> {
        self.in_tab.map(|idx| self.tab_width_at(idx))
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.diagnostics)
    }

    /// Offer `item` to the line.
    pub fn append(&mut self, mut item: Item) -> AppendOutcome {
        if self.items.is_empty() && item.is_stretchable_space() {
            return AppendOutcome::Fits;
        }
        if let Item::Tab(tab) = &mut item {
            let cursor = self.text_width;
            let width = match find_tab_stop(&self.rules.tab_stops, self.width, cursor) {
                Some(resolved) => {
                    let width = resolved.position - cursor;
                    tab.stop = Some(resolved.stop);
                    self.in_tab = match resolved.stop.align {
                        TabAlign::Left => None,
                        TabAlign::Right | TabAlign::Center => Some(self.items.len()),
                    };
                    width
                }
                None => {
                    log::warn!("no tab stop after cursor {:.2}; using a space", cursor);
                    self.diagnostics.push(Diagnostic::UnresolvedTab { cursor });
                    Space::new(tab.style().clone()).width()
                }
            };
            tab.tab_width = Some(width);
            self.push(item, width);
            return AppendOutcome::Fits;
        }

        let width = item.width();
        if let Some(tab_idx) = self.in_tab {
            return self.append_in_tab(tab_idx, item, width);
        }
        if self.text_width + width > self.width {
            if !self.items.is_empty() {
                return self.hyphenate_overflow(item);
            }
            log::warn!(
                "item too long to fit on line (width={:.2} available={:.2})",
                width,
                self.width
            );
            self.diagnostics.push(Diagnostic::UnfittableItem {
                width,
                available: self.width,
            });
        }
        self.push(item, width);
        AppendOutcome::Fits
    }

    fn push(&mut self, item: Item, charged: f32) {
        self.text_width += charged;
        self.items.push(item);
    }

    fn tab_width_at(&self, idx: usize) -> f32 {
        match self.items.get(idx) {
            Some(Item::Tab(tab)) => tab.tab_width.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn tab_align_at(&self, idx: usize) -> TabAlign {
        match self.items.get(idx) {
            Some(Item::Tab(tab)) => tab.stop.map(|stop| stop.align).unwrap_or_default(),
            _ => TabAlign::Left,
        }
    }

    fn shrink_tab(&mut self, idx: usize, amount: f32) {
        if let Some(Item::Tab(tab)) = self.items.get_mut(idx) {
            tab.tab_width = Some(tab.tab_width.unwrap_or(0.0) - amount);
        }
    }

    /// Place `item` inside a deferred tab: its width (half of it for centered
    /// stops) comes out of the tab instead of the line.
    fn append_in_tab(&mut self, tab_idx: usize, item: Item, width: f32) -> AppendOutcome {
        let share = if self.tab_align_at(tab_idx) == TabAlign::Center {
            0.5
        } else {
            1.0
        };
        let budget = self.tab_width_at(tab_idx);
        let charged = width * share;
        if charged > budget {
            if let Item::Text(run) = &item {
                let hyphenator = Arc::clone(&self.rules.hyphenator);
                for (first, rest) in run.hyphenate(hyphenator.as_ref(), self.rules.soft_hyphens) {
                    let first_charged = first.width() * share;
                    if first_charged <= budget && first.width() < run.width() {
                        log::trace!("hyphenated {:?} into tab budget {:.2}", run.text(), budget);
                        self.shrink_tab(tab_idx, first_charged);
                        let first_width = first.width();
                        self.push(Item::Text(first), first_width - first_charged);
                        return AppendOutcome::EndedWithRemainder(Item::Text(rest));
                    }
                }
            }
            return AppendOutcome::EndedPlain(item);
        }
        self.shrink_tab(tab_idx, charged);
        self.push(item, width - charged);
        AppendOutcome::Fits
    }

    fn hyphenate_overflow(&mut self, item: Item) -> AppendOutcome {
        if let Item::Text(run) = &item {
            let available = self.width - self.text_width;
            let hyphenator = Arc::clone(&self.rules.hyphenator);
            for (first, rest) in run.hyphenate(hyphenator.as_ref(), self.rules.soft_hyphens) {
                let first_width = first.width();
                if first_width <= available && first_width < run.width() {
                    log::trace!(
                        "hyphenated {:?} as {:?} + {:?}",
                        run.text(),
                        first.text(),
                        rest.text()
                    );
                    self.push(Item::Text(first), first_width);
                    return AppendOutcome::EndedWithRemainder(Item::Text(rest));
                }
            }
        }
        AppendOutcome::EndedPlain(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyphenate::NoHyphenation;
    use crate::item::{Tab, TextRun};
    use crate::test_support::{fixed_style, FixedHyphenator};

    fn rules(stops: &[TabStop], hyphenator: Arc<dyn Hyphenator>) -> LineRules {
        LineRules {
            tab_stops: stops.iter().copied().collect(),
            hyphenator,
            soft_hyphens: SoftHyphenPolicy::Discretionary,
            justify: Justify::Left,
        }
    }

    fn word(text: &str) -> Item {
        Item::Text(TextRun::new(text, fixed_style(10.0)))
    }

    fn tab() -> Item {
        Item::Tab(Tab::new(fixed_style(10.0)))
    }

    fn texts(line: &Line) -> Vec<String> {
        line.items()
            .iter()
            .filter_map(|item| match item {
                Item::Text(run) => Some(run.text().to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn leading_space_is_dropped() {
        let mut line = Line::new(100.0, 0.0, rules(&[], Arc::new(NoHyphenation)));
        let space = Item::Space(Space::new(fixed_style(10.0)));
        assert!(line.append(space.clone()).is_fits());
        assert!(line.is_empty());
        assert!(line.append(word("ab")).is_fits());
        assert!(line.append(space).is_fits());
        assert_eq!(line.items().len(), 2);
        assert_eq!(line.text_width(), 25.0);
    }

    #[test]
    fn overflow_hyphenates_and_carries_remainder() {
        // 40 + 40 leaves 20; "abcdef" (60) splits as "a-" (20) + "bcdef".
        let hyphenator = Arc::new(FixedHyphenator(vec![1, 4]));
        let mut line = Line::new(100.0, 0.0, rules(&[], hyphenator));
        assert!(line.append(word("wxyz")).is_fits());
        assert!(line.append(word("wxyz")).is_fits());
        match line.append(word("abcdef")) {
            AppendOutcome::EndedWithRemainder(Item::Text(rest)) => {
                assert_eq!(rest.text(), "bcdef");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(texts(&line), vec!["wxyz", "wxyz", "a-"]);
        assert!(line.text_width() <= line.width());
    }

    #[test]
    fn overflow_without_fitting_split_ends_plain() {
        let hyphenator = Arc::new(FixedHyphenator(vec![4]));
        let mut line = Line::new(100.0, 0.0, rules(&[], hyphenator));
        assert!(line.append(word("abcdefgh")).is_fits());
        match line.append(word("abcdef")) {
            AppendOutcome::EndedPlain(Item::Text(run)) => assert_eq!(run.text(), "abcdef"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(texts(&line), vec!["abcdefgh"]);
    }

    #[test]
    fn oversized_item_on_empty_line_is_forced_with_diagnostic() {
        let mut line = Line::new(50.0, 0.0, rules(&[], Arc::new(NoHyphenation)));
        assert!(line.append(word("abcdefghij")).is_fits());
        assert_eq!(line.text_width(), 100.0);
        assert_eq!(
            line.take_diagnostics(),
            vec![Diagnostic::UnfittableItem {
                width: 100.0,
                available: 50.0
            }]
        );
    }

    #[test]
    fn left_tab_is_an_immediate_spacer() {
        let mut line = Line::new(200.0, 0.0, rules(&[TabStop::left(50.0)], Arc::new(NoHyphenation)));
        assert!(line.append(word("abc")).is_fits());
        assert!(line.append(tab()).is_fits());
        let Some(Item::Tab(resolved)) = line.items().get(1) else {
            panic!("tab missing");
        };
        assert_eq!(resolved.tab_width(), Some(20.0));
        assert_eq!(line.tab_budget(), None);
        assert_eq!(line.text_width(), 50.0);
    }

    #[test]
    fn right_tab_defers_following_text() {
        let mut line = Line::new(200.0, 0.0, rules(&[TabStop::right(150.0)], Arc::new(NoHyphenation)));
        assert!(line.append(word("ab")).is_fits());
        assert!(line.append(tab()).is_fits());
        assert_eq!(line.tab_budget(), Some(130.0));
        assert!(line.append(word("END")).is_fits());
        assert_eq!(line.tab_budget(), Some(100.0));
        assert_eq!(line.text_width(), 150.0);
    }

    #[test]
    fn center_tab_charges_half_widths() {
        let mut line = Line::new(200.0, 0.0, rules(&[TabStop::center(100.0)], Arc::new(NoHyphenation)));
        assert!(line.append(tab()).is_fits());
        assert!(line.append(word("abcd")).is_fits());
        assert_eq!(line.tab_budget(), Some(80.0));
        assert_eq!(line.text_width(), 120.0);
    }

    #[test]
    fn deferred_tab_overflow_hyphenates_into_budget() {
        let hyphenator = Arc::new(FixedHyphenator(vec![2, 6]));
        let mut line = Line::new(200.0, 0.0, rules(&[TabStop::right(60.0)], hyphenator));
        assert!(line.append(tab()).is_fits());
        match line.append(word("abcdefgh")) {
            AppendOutcome::EndedWithRemainder(Item::Text(rest)) => assert_eq!(rest.text(), "cdefgh"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(line.tab_budget(), Some(30.0));
    }

    #[test]
    fn deferred_tab_without_split_ends_plain() {
        let mut line = Line::new(200.0, 0.0, rules(&[TabStop::right(60.0)], Arc::new(NoHyphenation)));
        assert!(line.append(tab()).is_fits());
        assert!(matches!(
            line.append(word("abcdefgh")),
            AppendOutcome::EndedPlain(_)
        ));
        assert_eq!(line.tab_budget(), Some(60.0));
    }

    #[test]
    fn tab_without_stop_falls_back_to_space() {
        let mut line = Line::new(200.0, 0.0, rules(&[TabStop::left(20.0)], Arc::new(NoHyphenation)));
        assert!(line.append(word("abc")).is_fits());
        assert!(line.append(tab()).is_fits());
        assert_eq!(line.text_width(), 35.0);
        assert_eq!(
            line.take_diagnostics(),
            vec![Diagnostic::UnresolvedTab { cursor: 30.0 }]
        );
    }
}
