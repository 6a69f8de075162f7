//! Text and paragraph style values consumed by the flow engine.
//!
//! Style resolution (cascading lookup) happens upstream; these are the final,
//! resolved values.

use std::sync::Arc;

use crate::error::StyleError;
use crate::metrics::Font;
use crate::tab_stops::TabStop;

/// Maximum number of tab stops per paragraph style.
pub const MAX_TAB_STOPS: usize = 16;

/// Line spacing factor commonly used for body text.
pub const STANDARD: f32 = 1.2;
/// Line spacing equal to the line height.
pub const SINGLE: f32 = 1.0;
/// Double line spacing.
pub const DOUBLE: f32 = 2.0;

/// Horizontal alignment of a line's content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
    Center,
    /// Stretch inter-word spaces so the line spans the full width.
    #[default]
    Both,
}

/// Distance between consecutive baselines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineSpacing {
    /// Multiple of the tallest item on the line.
    Proportional(f32),
    /// Fixed distance regardless of content.
    Exact(f32),
}

impl Default for LineSpacing {
    fn default() -> Self {
        Self::Proportional(STANDARD)
    }
}

impl LineSpacing {
    /// Total vertical advance for a line of `line_height`.
    pub fn advance_for(self, line_height: f32) -> f32 {
        match self {
            Self::Proportional(factor) => factor * line_height,
            Self::Exact(distance) => distance,
        }
    }
}

/// Policy for discretionary soft-hyphen handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SoftHyphenPolicy {
    /// Treat soft hyphens as invisible and never break on them.
    Ignore,
    /// Use soft hyphens as break opportunities and show `-` when broken.
    #[default]
    Discretionary,
}

/// Font, size and baseline shift shared by a run of text.
#[derive(Clone, Debug)]
pub struct TextStyle {
    pub font: Arc<Font>,
    pub size: f32,
    /// Baseline shift, positive upwards (superscript).
    pub y_offset: f32,
}

impl TextStyle {
    pub fn new(font: Arc<Font>, size: f32) -> Self {
        Self {
            font,
            size,
            y_offset: 0.0,
        }
    }

    pub fn with_y_offset(mut self, y_offset: f32) -> Self {
        self.y_offset = y_offset;
        self
    }
}

impl PartialEq for TextStyle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.font, &other.font)
            && self.size == other.size
            && self.y_offset == other.y_offset
    }
}

/// Resolved paragraph-level style.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphStyle {
    /// Indent applied to every line.
    pub indent_left: f32,
    /// Space kept free at the right edge of every line.
    pub indent_right: f32,
    /// Extra indent of the paragraph's first line.
    pub indent_first: f32,
    pub line_spacing: LineSpacing,
    pub justify: Justify,
    pub soft_hyphens: SoftHyphenPolicy,
    tab_stops: heapless::Vec<TabStop, MAX_TAB_STOPS>,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            indent_left: 0.0,
            indent_right: 0.0,
            indent_first: 0.0,
            line_spacing: LineSpacing::default(),
            justify: Justify::default(),
            soft_hyphens: SoftHyphenPolicy::default(),
            tab_stops: heapless::Vec::new(),
        }
    }
}

impl ParagraphStyle {
    /// Configured tab stops in declaration order.
    pub fn tab_stops(&self) -> &[TabStop] {
        &self.tab_stops
    }

    /// Append a tab stop.
    pub fn push_tab_stop(&mut self, stop: TabStop) -> Result<(), StyleError> {
        self.tab_stops
            .push(stop)
            .map_err(|_| StyleError::TooManyTabStops {
                limit: MAX_TAB_STOPS,
            })
    }

    /// Builder variant of [`push_tab_stop`](Self::push_tab_stop).
    pub fn with_tab_stops<I>(mut self, stops: I) -> Result<Self, StyleError>
    where
        I: IntoIterator<Item = TabStop>,
    {
        for stop in stops {
            self.push_tab_stop(stop)?;
        }
        Ok(self)
    }

    /// Set the left, right and first-line indents.
    pub fn with_indents(mut self, left: f32, right: f32, first: f32) -> Self {
        self.indent_left = left;
        self.indent_right = right;
        self.indent_first = first;
        self
    }

    pub fn with_justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: LineSpacing) -> Self {
        self.line_spacing = line_spacing;
        self
    }
}
