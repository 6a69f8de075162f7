use std::sync::{Arc, OnceLock};

use flowtype::{
    checked_advance, Container, ContainerExhausted, DownExpandingContainer, Font, GlyphInfo,
    GlyphMetrics, GlyphRun, Hyphenator, Item, Rect, Space, TextRun, TextStyle,
};

/// Monospace metrics: printable ASCII is one em, space half an em. Glyph ids
/// are code points.
pub struct GridMetrics;

impl GlyphMetrics for GridMetrics {
    fn name(&self) -> &str {
        "Grid"
    }

    fn glyph_for(&self, ch: char) -> Option<GlyphInfo> {
        let advance = match ch {
            ' ' => 0.5,
            ch if ch.is_ascii_graphic() => 1.0,
            _ => return None,
        };
        Some(GlyphInfo {
            id: ch as u32,
            advance,
        })
    }

    fn missing_glyph(&self) -> GlyphInfo {
        GlyphInfo {
            id: '?' as u32,
            advance: 1.0,
        }
    }
}

pub fn grid_style(size: f32) -> TextStyle {
    static FONT: OnceLock<Arc<Font>> = OnceLock::new();
    TextStyle::new(Arc::clone(FONT.get_or_init(|| Font::new(GridMetrics))), size)
}

pub fn word(text: &str, style: &TextStyle) -> Item {
    Item::Text(TextRun::new(text, style.clone()))
}

pub fn space(style: &TextStyle) -> Item {
    Item::Space(Space::new(style.clone()))
}

/// Breaks every word at the same character offsets.
pub struct SplitAt(pub Vec<usize>);

impl Hyphenator for SplitAt {
    fn hyphenation_points(&self, _word: &str) -> Vec<usize> {
        self.0.clone()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawnRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub width: f32,
}

/// Fixed-size frame that keeps every glyph run drawn into it.
pub struct Frame {
    width: f32,
    height: f32,
    cursor: f32,
    pub runs: Vec<DrawnRun>,
}

impl Frame {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cursor: 0.0,
            runs: Vec::new(),
        }
    }

    /// Drawn text grouped by baseline.
    pub fn lines(&self) -> Vec<String> {
        let mut out: Vec<(f32, String)> = Vec::new();
        for run in &self.runs {
            match out.last_mut() {
                Some((y, text)) if (*y - run.y).abs() < 1e-3 => text.push_str(&run.text),
                _ => out.push((run.y, run.text.clone())),
            }
        }
        out.into_iter().map(|(_, text)| text).collect()
    }
}

impl Container for Frame {
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
        self.runs.push(DrawnRun {
            x: run.x,
            y: run.y,
            text: run
                .glyphs
                .iter()
                .map(|&glyph| char::from_u32(glyph).unwrap_or('?'))
                .collect(),
            width: run.width(),
        });
    }

    fn draw_rect(&mut self, _rect: Rect) {}

    fn nested(&mut self, left: f32) -> Box<dyn Container + '_> {
        Box::new(DownExpandingContainer::new(self, left))
    }
}
