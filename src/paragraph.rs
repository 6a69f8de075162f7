//! Resumable paragraph flow: splits spans into words, packs lines and
//! typesets them until the paragraph is complete or the container is full.

use std::rc::Rc;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{ContainerExhausted, Diagnostic};
use crate::flowable::Flowable;
use crate::hyphenate::{Hyphenator, NoHyphenation};
use crate::item::{
    split_words, EmbeddedBlock, Field, FieldContext, FieldResolver, InlineBox, Item, Span,
};
use crate::line::{AppendOutcome, Line, LineRules};
use crate::style::{ParagraphStyle, TextStyle};

/// Position inside the word list of an expanded field.
#[derive(Clone, Debug)]
pub struct FieldCursor {
    words: Rc<[Item]>,
    next: usize,
}

impl FieldCursor {
    /// Index of the next sub-word to hand out.
    pub fn next(&self) -> usize {
        self.next
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Where the controller stands in its word list.
#[derive(Clone, Debug, Default)]
pub enum ControllerState {
    /// Between top-level words.
    #[default]
    Ready,
    /// Handing out the sub-words of the field at the current word index.
    InField(FieldCursor),
    /// Every word has been typeset.
    Done,
}

/// Resumption point of a paragraph.
///
/// A snapshot is taken at every line start; when the container runs out the
/// paragraph rolls back to it, so the next container starts with exactly the
/// line that did not fit.
#[derive(Clone, Debug)]
pub struct FlowCursor {
    word: usize,
    state: ControllerState,
    carry: Option<Item>,
    first_line: bool,
}

impl Default for FlowCursor {
    fn default() -> Self {
        Self {
            word: 0,
            state: ControllerState::Ready,
            carry: None,
            first_line: true,
        }
    }
}

impl FlowCursor {
    /// Index of the next top-level word.
    pub fn word(&self) -> usize {
        self.word
    }

    /// Sub-word index inside the field at [`word`](Self::word), if any.
    pub fn field(&self) -> Option<usize> {
        match &self.state {
            ControllerState::InField(field) => Some(field.next),
            _ => None,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Hyphenation remainder that will start the next line.
    pub fn carry(&self) -> Option<&Item> {
        self.carry.as_ref()
    }

    /// The next line is the paragraph's first and gets the first-line indent.
    pub fn is_first_line(&self) -> bool {
        self.first_line
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, ControllerState::Done)
    }
}

/// A paragraph of styled spans.
pub struct Paragraph {
    spans: Vec<Span>,
    style: ParagraphStyle,
    hyphenator: Arc<dyn Hyphenator>,
    words: Option<Vec<Item>>,
    cursor: FlowCursor,
    diagnostics: Vec<Diagnostic>,
    /// Recorded by word splitting; restored at the start of every pass.
    split_diagnostics: Vec<Diagnostic>,
    /// Recorded since the last committed line; dropped on rollback.
    pending: Vec<Diagnostic>,
}

impl core::fmt::Debug for Paragraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Paragraph")
            .field("spans", &self.spans.len())
            .field("style", &self.style)
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl Paragraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            spans: Vec::new(),
            style,
            hyphenator: Arc::new(NoHyphenation),
            words: None,
            cursor: FlowCursor::default(),
            diagnostics: Vec::new(),
            split_diagnostics: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Paragraph holding `spans` in order.
    pub fn from_spans(style: ParagraphStyle, spans: Vec<Span>) -> Self {
        let mut paragraph = Self::new(style);
        paragraph.spans = spans;
        paragraph
    }

    pub fn with_hyphenator(mut self, hyphenator: Arc<dyn Hyphenator>) -> Self {
        self.hyphenator = hyphenator;
        self
    }

    pub fn push_span(&mut self, span: Span) {
        self.spans.push(span);
        self.words = None;
    }

    pub fn text(mut self, text: impl Into<String>, style: &TextStyle) -> Self {
        self.push_span(Span::text(text, style));
        self
    }

    pub fn tab(mut self, style: &TextStyle) -> Self {
        self.push_span(Span::Tab(style.clone()));
        self
    }

    pub fn line_break(mut self) -> Self {
        self.push_span(Span::LineBreak);
        self
    }

    pub fn inline_box(mut self, inline: InlineBox) -> Self {
        self.push_span(Span::Box(inline));
        self
    }

    pub fn field(mut self, resolver: Arc<dyn FieldResolver>) -> Self {
        self.push_span(Span::Field(Field::new(resolver)));
        self
    }

    pub fn block(mut self, block: EmbeddedBlock) -> Self {
        self.push_span(Span::Block(block));
        self
    }

    pub fn style(&self) -> &ParagraphStyle {
        &self.style
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Current resumption point.
    pub fn cursor(&self) -> &FlowCursor {
        &self.cursor
    }

    /// Problems recorded while splitting and packing during the current pass.
    ///
    /// Only lines that were actually drawn contribute; a line that is rolled
    /// back and packed again is reported once.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.diagnostics)
    }

    /// Top-level words, splitting the spans on first use.
    pub fn words(&mut self) -> &[Item] {
        if self.words.is_none() {
            let mut found = Vec::new();
            let words = split_words(&self.spans, true, &mut found);
            self.diagnostics.extend(found.iter().cloned());
            self.split_diagnostics = found;
            self.words = Some(words);
        }
        self.words.as_deref().unwrap_or(&[])
    }

    /// Rewind to the start of the paragraph and return the fresh cursor.
    ///
    /// Nested blocks are rewound too.
    pub fn begin_pass(&mut self) -> FlowCursor {
        self.cursor = FlowCursor::default();
        self.diagnostics.clone_from(&self.split_diagnostics);
        self.pending.clear();
        if let Some(words) = &self.words {
            for word in words {
                if let Item::Block(block) = word {
                    match block.flowable().try_borrow_mut() {
                        Ok(mut flowable) => flowable.begin_pass(),
                        Err(_) => log::warn!("nested block is already being laid out"),
                    }
                }
            }
        }
        self.cursor.clone()
    }

    fn new_line(&self, available: f32, rules: &LineRules) -> Line {
        let indent = if self.cursor.first_line {
            self.style.indent_left + self.style.indent_first
        } else {
            self.style.indent_left
        };
        Line::new(available, indent, rules.clone())
    }

    /// Fresh line starting with `item`.
    fn new_line_with(&self, available: f32, rules: &LineRules, item: Item) -> Line {
        let mut line = self.new_line(available, rules);
        match line.append(item) {
            AppendOutcome::Fits => {}
            rejected => {
                log::warn!("empty line rejected its first item: {:?}", rejected);
            }
        }
        line
    }

    /// Next word, expanding fields on the way.
    fn next_word(&mut self, container: &dyn Container) -> Option<Item> {
        loop {
            match &mut self.cursor.state {
                ControllerState::Done => return None,
                ControllerState::InField(field) => {
                    if let Some(item) = field.words.get(field.next) {
                        let item = item.clone();
                        field.next += 1;
                        if field.next >= field.words.len() {
                            self.cursor.state = ControllerState::Ready;
                            self.cursor.word += 1;
                        }
                        return Some(item);
                    }
                    self.cursor.state = ControllerState::Ready;
                    self.cursor.word += 1;
                }
                ControllerState::Ready => {
                    let words = self.words.as_deref().unwrap_or(&[]);
                    let Some(word) = words.get(self.cursor.word) else {
                        self.cursor.state = ControllerState::Done;
                        return None;
                    };
                    let Item::Field(field) = word else {
                        self.cursor.word += 1;
                        return Some(word.clone());
                    };
                    let spans = field.resolve(&FieldContext::from_container(container));
                    let expanded = split_words(&spans, false, &mut self.pending);
                    log::trace!(
                        "field at word {} expanded to {} items",
                        self.cursor.word,
                        expanded.len()
                    );
                    if expanded.is_empty() {
                        self.cursor.word += 1;
                    } else {
                        self.cursor.state = ControllerState::InField(FieldCursor {
                            words: Rc::from(expanded),
                            next: 0,
                        });
                    }
                }
            }
        }
    }

    /// Typeset `line`, then leave the inter-line gap.
    ///
    /// On success the resume point moves to `next`. If the line itself does
    /// not fit the paragraph rolls back to `line_start`; if only the gap does
    /// not fit the line stays drawn and the paragraph resumes at `next`.
    ///
    /// Pending diagnostics up to `settled` belong to the drawn line; the rest
    /// were recorded while reading past it and stay pending.
    fn commit_line(
        &mut self,
        container: &mut dyn Container,
        mut line: Line,
        last_line: bool,
        line_start: &mut FlowCursor,
        mut next: FlowCursor,
        settled: usize,
    ) -> Result<(), ContainerExhausted> {
        let mut found = line.take_diagnostics();
        let height = match line.finalize(container, last_line) {
            Ok(height) => height,
            Err(err) => {
                log::debug!(
                    "line at word {} does not fit ({}); rolling back",
                    line_start.word,
                    err
                );
                self.cursor = line_start.clone();
                self.pending.clear();
                return Err(err);
            }
        };
        let held = self.pending.split_off(settled.min(self.pending.len()));
        self.diagnostics.append(&mut self.pending);
        self.diagnostics.append(&mut found);
        self.pending = held;
        next.first_line = false;
        self.cursor.first_line = false;
        *line_start = next;
        if height > 0.0 {
            let gap = self.style.line_spacing.advance_for(height) - height;
            if gap != 0.0 {
                if let Err(err) = container.advance(gap) {
                    log::debug!("no room for line gap after word {}", line_start.word);
                    self.cursor = line_start.clone();
                    self.pending.clear();
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Flow a nested block into a region below the current line.
    fn flow_block(
        &mut self,
        container: &mut dyn Container,
        block: &EmbeddedBlock,
        resume: &FlowCursor,
    ) -> Result<(), ContainerExhausted> {
        let result = match block.flowable().try_borrow_mut() {
            Ok(mut flowable) => {
                let mut nested = container.nested(self.style.indent_left);
                flowable.flow(nested.as_mut())
            }
            Err(_) => {
                log::warn!("skipping nested block that is already being laid out");
                Ok(0.0)
            }
        };
        match result.and_then(|height| container.advance(height)) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.cursor = resume.clone();
                self.pending.clear();
                Err(err)
            }
        }
    }

    fn flow_lines(&mut self, container: &mut dyn Container) -> Result<(), ContainerExhausted> {
        let rules = LineRules::new(&self.style, Arc::clone(&self.hyphenator));
        let available = container.remaining_width(self.style.indent_right);
        let mut line_start = self.cursor.clone();
        let mut line = match self.cursor.carry.take() {
            Some(carry) => self.new_line_with(available, &rules, carry),
            None => self.new_line(available, &rules),
        };

        loop {
            let before = self.cursor.clone();
            let settled = self.pending.len();
            let Some(word) = self.next_word(container) else {
                break;
            };
            match word {
                Item::LineBreak => {
                    let next = self.cursor.clone();
                    let all = self.pending.len();
                    self.commit_line(container, line, true, &mut line_start, next, all)?;
                    line = self.new_line(available, &rules);
                }
                Item::Block(block) => {
                    // resuming at `before` expands any field again
                    let mut resume = before;
                    self.commit_line(
                        container,
                        line,
                        true,
                        &mut line_start,
                        resume.clone(),
                        settled,
                    )?;
                    resume.first_line = false;
                    self.flow_block(container, &block, &resume)?;
                    line_start = self.cursor.clone();
                    line = self.new_line(available, &rules);
                }
                item => match line.append(item) {
                    AppendOutcome::Fits => {}
                    AppendOutcome::EndedWithRemainder(rest) => {
                        let mut next = self.cursor.clone();
                        next.carry = Some(rest.clone());
                        let all = self.pending.len();
                        self.commit_line(container, line, false, &mut line_start, next, all)?;
                        line = self.new_line_with(available, &rules, rest);
                    }
                    AppendOutcome::EndedPlain(item) => {
                        self.commit_line(
                            container,
                            line,
                            false,
                            &mut line_start,
                            before,
                            settled,
                        )?;
                        line = self.new_line_with(available, &rules, item);
                    }
                },
            }
        }

        if !line.is_empty() {
            let next = self.cursor.clone();
            let all = self.pending.len();
            self.commit_line(container, line, true, &mut line_start, next, all)?;
        }
        self.cursor.state = ControllerState::Done;
        Ok(())
    }
}

impl Flowable for Paragraph {
    fn begin_pass(&mut self) {
        Paragraph::begin_pass(self);
    }

    fn flow(&mut self, container: &mut dyn Container) -> Result<f32, ContainerExhausted> {
        if self.cursor.is_done() {
            return Ok(0.0);
        }
        self.words();
        let top = container.cursor();
        self.flow_lines(container)?;
        Ok(container.cursor() - top)
    }

    fn is_complete(&self) -> bool {
        self.cursor.is_done()
    }
}
