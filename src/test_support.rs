//! Deterministic font, hyphenator and recording container for unit tests.

use std::sync::{Arc, OnceLock};

use crate::container::{checked_advance, Container, DownExpandingContainer, GlyphRun, Rect};
use crate::error::ContainerExhausted;
use crate::hyphenate::Hyphenator;
use crate::metrics::{Font, GlyphInfo, GlyphMetrics};
use crate::style::TextStyle;

/// One em per printable ASCII character, half an em per space. Glyph ids are
/// the code points, so recorded runs can be read back as text.
pub(crate) struct FixedMetrics;

impl GlyphMetrics for FixedMetrics {
    fn name(&self) -> &str {
        "Fixed"
    }

    fn glyph_for(&self, ch: char) -> Option<GlyphInfo> {
        match ch {
            ' ' => Some(GlyphInfo {
                id: ' ' as u32,
                advance: 0.5,
            }),
            ch if ch.is_ascii_graphic() => Some(GlyphInfo {
                id: ch as u32,
                advance: 1.0,
            }),
            _ => None,
        }
    }

    fn missing_glyph(&self) -> GlyphInfo {
        GlyphInfo {
            id: '?' as u32,
            advance: 1.0,
        }
    }
}

pub(crate) fn fixed_font() -> Arc<Font> {
    static FONT: OnceLock<Arc<Font>> = OnceLock::new();
    Arc::clone(FONT.get_or_init(|| Font::new(FixedMetrics)))
}

pub(crate) fn fixed_style(size: f32) -> TextStyle {
    TextStyle::new(fixed_font(), size)
}

/// Splits at the given character offsets regardless of the word.
pub(crate) struct FixedHyphenator(pub Vec<usize>);

impl Hyphenator for FixedHyphenator {
    fn hyphenation_points(&self, _word: &str) -> Vec<usize> {
        self.0.clone()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RecordedRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
    pub advances: Vec<f32>,
}

impl RecordedRun {
    pub fn width(&self) -> f32 {
        self.advances.iter().sum()
    }
}

/// Page-like container that records everything drawn into it.
pub(crate) struct RecordingContainer {
    width: f32,
    height: f32,
    cursor: f32,
    page_number: Option<usize>,
    pub runs: Vec<RecordedRun>,
    pub rects: Vec<Rect>,
}

impl RecordingContainer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cursor: 0.0,
            page_number: None,
            runs: Vec::new(),
            rects: Vec::new(),
        }
    }

    pub fn with_page_number(mut self, page_number: usize) -> Self {
        self.page_number = Some(page_number);
        self
    }
}

impl Container for RecordingContainer {
    fn width(&self) -> f32 {
        self.width
    }

    fn cursor(&self) -> f32 {
        self.cursor
    }

    fn remaining_height(&self) -> f32 {
        self.height - self.cursor
    }

    fn advance(&mut self, height: f32) -> Result<(), ContainerExhausted> {
        let remaining = self.remaining_height();
        checked_advance(&mut self.cursor, remaining, height)
    }

    fn draw_glyph_run(&mut self, run: GlyphRun<'_>) {
        self.runs.push(RecordedRun {
            x: run.x,
            y: run.y,
            size: run.size,
            text: run
                .glyphs
                .iter()
                .map(|&glyph| char::from_u32(glyph).unwrap_or('?'))
                .collect(),
            advances: run.advances.to_vec(),
        });
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    fn page_number(&self) -> Option<usize> {
        self.page_number
    }

    fn nested(&mut self, left: f32) -> Box<dyn Container + '_> {
        Box::new(DownExpandingContainer::new(self, left))
    }
}
