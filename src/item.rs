//! Atomic layout units and the span-to-word splitter.

use core::cell::RefCell;
use smallvec::SmallVec;
use std::rc::Rc;
use std::sync::Arc;

use crate::container::Container;
use crate::error::Diagnostic;
use crate::flowable::Flowable;
use crate::hyphenate::{Hyphenations, Hyphenator, SOFT_HYPHEN};
use crate::metrics::{shape, GlyphId};
use crate::style::{SoftHyphenPolicy, TextStyle};
use crate::tab_stops::TabStop;

/// Shaped run of text in one style.
#[derive(Clone, Debug)]
pub struct TextRun {
    text: String,
    style: TextStyle,
    glyphs: SmallVec<[GlyphId; 16]>,
    advances: SmallVec<[f32; 16]>,
    width: f32,
    discretionary: SmallVec<[usize; 4]>,
    missing: SmallVec<[char; 2]>,
}

impl TextRun {
    /// Shape `text`. Soft hyphens are removed and remembered as break points.
    pub fn new(text: &str, style: TextStyle) -> Self {
        let mut visible = String::with_capacity(text.len());
        let mut discretionary = SmallVec::new();
        let mut chars = 0usize;
        for ch in text.chars() {
            if ch == SOFT_HYPHEN {
                discretionary.push(chars);
            } else {
                visible.push(ch);
                chars += 1;
            }
        }
        Self::shaped(visible, style, discretionary)
    }

    fn shaped(text: String, style: TextStyle, discretionary: SmallVec<[usize; 4]>) -> Self {
        let shaped = shape(&style.font, &text, style.size);
        Self {
            text,
            style,
            glyphs: shaped.glyphs,
            advances: shaped.advances,
            width: shaped.width,
            discretionary,
            missing: shaped.missing,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn glyphs(&self) -> &[GlyphId] {
        &self.glyphs
    }

    pub fn advances(&self) -> &[f32] {
        &self.advances
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.style.size
    }

    /// Character offsets of the soft hyphens removed from the source text.
    pub fn discretionary_breaks(&self) -> &[usize] {
        &self.discretionary
    }

    /// Characters rendered with the font's missing glyph.
    pub fn missing_glyphs(&self) -> &[char] {
        &self.missing
    }

    /// Lazy `(fragment, remainder)` splits, longest fragment first.
    pub fn hyphenate<'a>(
        &'a self,
        hyphenator: &dyn Hyphenator,
        policy: SoftHyphenPolicy,
    ) -> Hyphenations<'a> {
        Hyphenations::new(self, hyphenator, policy)
    }

    /// Split before character `point`; the first half gains a trailing hyphen.
    pub(crate) fn split_at_char(&self, point: usize) -> (TextRun, TextRun) {
        let byte = self
            .text
            .char_indices()
            .nth(point)
            .map_or(self.text.len(), |(byte, _)| byte);
        let mut first = String::with_capacity(byte + 1);
        first.push_str(&self.text[..byte]);
        first.push('-');
        let rest = self.text[byte..].to_string();
        let rest_breaks = self
            .discretionary
            .iter()
            .filter(|&&b| b > point)
            .map(|&b| b - point)
            .collect();
        (
            Self::shaped(first, self.style.clone(), SmallVec::new()),
            Self::shaped(rest, self.style.clone(), rest_breaks),
        )
    }
}

/// Inter-word space, or a fixed blank.
#[derive(Clone, Debug)]
pub struct Space {
    style: TextStyle,
    width: f32,
    fixed: bool,
    glyph: GlyphId,
}

impl Space {
    /// Stretchable space with the natural width of the style's space glyph.
    pub fn new(style: TextStyle) -> Self {
        let lookup = style.font.glyph(' ');
        Self {
            width: lookup.info.advance * style.size,
            glyph: lookup.info.id,
            style,
            fixed: false,
        }
    }

    /// Blank of exactly `width` that justification never stretches.
    pub fn fixed(width: f32, style: TextStyle) -> Self {
        let glyph = style.font.glyph(' ').info.id;
        Self {
            style,
            width,
            fixed: true,
            glyph,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn glyph(&self) -> GlyphId {
        self.glyph
    }
}

/// Custom drawing for an inline box.
pub trait BoxRender: Send + Sync {
    /// Draw at `x` with the line baseline at `baseline`; returns the advance.
    fn render(&self, container: &mut dyn Container, x: f32, baseline: f32) -> f32;
}

/// Fixed-size inline object drawn by its own hook.
#[derive(Clone)]
pub struct InlineBox {
    pub width: f32,
    pub height: f32,
    render: Arc<dyn BoxRender>,
}

impl core::fmt::Debug for InlineBox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InlineBox")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl InlineBox {
    pub fn new(width: f32, height: f32, render: Arc<dyn BoxRender>) -> Self {
        Self {
            width,
            height,
            render,
        }
    }

    pub fn render(&self, container: &mut dyn Container, x: f32, baseline: f32) -> f32 {
        self.render.render(container, x, baseline)
    }
}

/// Tab marker; its stop and width are resolved while packing a line.
#[derive(Clone, Debug)]
pub struct Tab {
    style: TextStyle,
    pub(crate) stop: Option<TabStop>,
    pub(crate) tab_width: Option<f32>,
}

impl Tab {
    pub fn new(style: TextStyle) -> Self {
        Self {
            style,
            stop: None,
            tab_width: None,
        }
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Stop this tab was resolved against.
    pub fn stop(&self) -> Option<&TabStop> {
        self.stop.as_ref()
    }

    /// Resolved width; `None` before the tab has been packed.
    pub fn tab_width(&self) -> Option<f32> {
        self.tab_width
    }
}

/// Information available to a field while it is being resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldContext {
    pub page_number: Option<usize>,
    /// Vertical cursor in the container at resolution time.
    pub cursor: f32,
}

impl FieldContext {
    pub fn from_container(container: &dyn Container) -> Self {
        Self {
            page_number: container.page_number(),
            cursor: container.cursor(),
        }
    }
}

/// Computes a field's content at typeset time.
pub trait FieldResolver: Send + Sync {
    fn resolve(&self, ctx: &FieldContext) -> Vec<Span>;
}

/// Content evaluated lazily, e.g. a page reference.
#[derive(Clone)]
pub struct Field {
    resolver: Arc<dyn FieldResolver>,
}

impl core::fmt::Debug for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Field")
    }
}

impl Field {
    pub fn new(resolver: Arc<dyn FieldResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolve(&self, ctx: &FieldContext) -> Vec<Span> {
        self.resolver.resolve(ctx)
    }
}

/// Block-level flowable nested inside a paragraph.
///
/// The flowable keeps its own resumption state, so it is shared rather than
/// copied.
#[derive(Clone)]
pub struct EmbeddedBlock {
    flowable: Rc<RefCell<dyn Flowable>>,
}

impl core::fmt::Debug for EmbeddedBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("EmbeddedBlock")
    }
}

impl EmbeddedBlock {
    pub fn new<F>(flowable: F) -> Self
    where
        F: Flowable + 'static,
    {
        Self {
            flowable: Rc::new(RefCell::new(flowable)),
        }
    }

    pub fn shared(flowable: Rc<RefCell<dyn Flowable>>) -> Self {
        Self { flowable }
    }

    pub fn flowable(&self) -> &Rc<RefCell<dyn Flowable>> {
        &self.flowable
    }
}

/// Atomic layout unit.
#[derive(Clone, Debug)]
pub enum Item {
    Text(TextRun),
    Space(Space),
    Box(InlineBox),
    Tab(Tab),
    LineBreak,
    Field(Field),
    Block(EmbeddedBlock),
}

impl Item {
    pub fn width(&self) -> f32 {
        match self {
            Self::Text(run) => run.width(),
            Self::Space(space) => space.width(),
            Self::Box(inline) => inline.width,
            Self::Tab(tab) => tab.tab_width.unwrap_or(0.0),
            Self::LineBreak | Self::Field(_) | Self::Block(_) => 0.0,
        }
    }

    pub fn height(&self) -> f32 {
        match self {
            Self::Text(run) => run.height(),
            Self::Space(space) => space.style().size,
            Self::Box(inline) => inline.height,
            Self::Tab(tab) => tab.style().size,
            Self::LineBreak | Self::Field(_) | Self::Block(_) => 0.0,
        }
    }

    /// Space that justification may stretch.
    pub fn is_stretchable_space(&self) -> bool {
        matches!(self, Self::Space(space) if !space.is_fixed())
    }
}

/// Styled input content of a paragraph.
#[derive(Clone, Debug)]
pub enum Span {
    Text { text: String, style: TextStyle },
    Tab(TextStyle),
    LineBreak,
    Box(InlineBox),
    Field(Field),
    Block(EmbeddedBlock),
}

impl Span {
    pub fn text(text: impl Into<String>, style: &TextStyle) -> Self {
        Self::Text {
            text: text.into(),
            style: style.clone(),
        }
    }
}

/// Split spans into words, spaces and control items.
///
/// Runs of spaces collapse into one stretchable space, `\t` becomes a tab and
/// `\n` a line break. Style boundaries are kept: adjacent spans never merge.
/// Fields are only expanded one level deep; with `allow_fields == false`
/// nested fields are dropped.
pub(crate) fn split_words(
    spans: &[Span],
    allow_fields: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Item> {
    let mut words = Vec::with_capacity(spans.len() * 4);
    for span in spans {
        match span {
            Span::Text { text, style } => split_text(text, style, &mut words, diagnostics),
            Span::Tab(style) => words.push(Item::Tab(Tab::new(style.clone()))),
            Span::LineBreak => words.push(Item::LineBreak),
            Span::Box(inline) => words.push(Item::Box(inline.clone())),
            Span::Field(field) if allow_fields => words.push(Item::Field(field.clone())),
            Span::Field(_) => log::warn!("dropping field nested inside a field"),
            Span::Block(block) => words.push(Item::Block(block.clone())),
        }
    }
    words
}

fn split_text(
    text: &str,
    style: &TextStyle,
    words: &mut Vec<Item>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut word = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' | ' ' | '\r' => {
                push_word(&mut word, style, words, diagnostics);
                match ch {
                    '\t' => words.push(Item::Tab(Tab::new(style.clone()))),
                    '\n' => words.push(Item::LineBreak),
                    _ => {
                        if !matches!(words.last(), Some(item) if item.is_stretchable_space()) {
                            words.push(Item::Space(Space::new(style.clone())));
                        }
                    }
                }
            }
            _ => word.push(ch),
        }
    }
    push_word(&mut word, style, words, diagnostics);
}

fn push_word(
    word: &mut String,
    style: &TextStyle,
    words: &mut Vec<Item>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if word.is_empty() {
        return;
    }
    let run = TextRun::new(word, style.clone());
    for &ch in run.missing_glyphs() {
        diagnostics.push(Diagnostic::MissingGlyph {
            font: run.style().font.name().to_string(),
            ch,
        });
    }
    words.push(Item::Text(run));
    word.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixed_style;

    fn describe(items: &[Item]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                Item::Text(run) => run.text().to_string(),
                Item::Space(_) => "_".to_string(),
                Item::Tab(_) => "\\t".to_string(),
                Item::LineBreak => "\\n".to_string(),
                Item::Box(_) => "[box]".to_string(),
                Item::Field(_) => "[field]".to_string(),
                Item::Block(_) => "[block]".to_string(),
            })
            .collect()
    }

    #[test]
    fn splits_on_spaces_and_collapses_runs() {
        let style = fixed_style(10.0);
        let mut diags = Vec::new();
        let words = split_words(
            &[Span::text("hello   world\tend\nnext", &style)],
            true,
            &mut diags,
        );
        assert_eq!(
            describe(&words),
            vec!["hello", "_", "world", "\\t", "end", "\\n", "next"]
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn keeps_style_boundaries_between_spans() {
        let plain = fixed_style(10.0);
        let large = fixed_style(20.0);
        let mut diags = Vec::new();
        let words = split_words(
            &[Span::text("ab", &plain), Span::text("cd ", &large)],
            true,
            &mut diags,
        );
        assert_eq!(describe(&words), vec!["ab", "cd", "_"]);
        assert_eq!(words[1].height(), 20.0);
    }

    #[test]
    fn missing_glyphs_become_diagnostics() {
        let style = fixed_style(10.0);
        let mut diags = Vec::new();
        let words = split_words(&[Span::text("a\u{263A}b", &style)], true, &mut diags);
        assert_eq!(words.len(), 1);
        assert_eq!(
            diags,
            vec![Diagnostic::MissingGlyph {
                font: "Fixed".to_string(),
                ch: '\u{263A}'
            }]
        );
    }

    #[test]
    fn space_widths_follow_the_space_glyph() {
        let style = fixed_style(10.0);
        let space = Space::new(style.clone());
        assert!(!space.is_fixed());
        assert_eq!(space.width(), 5.0);
        let blank = Space::fixed(42.0, style);
        assert!(blank.is_fixed());
        assert!(!Item::Space(blank).is_stretchable_space());
    }

    #[test]
    fn unresolved_tab_has_zero_width() {
        let tab = Tab::new(fixed_style(10.0));
        assert_eq!(tab.tab_width(), None);
        assert_eq!(Item::Tab(tab).width(), 0.0);
    }
}
