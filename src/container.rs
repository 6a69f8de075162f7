//! Destination areas that lines are drawn into.

use crate::error::ContainerExhausted;
use crate::metrics::{Font, GlyphId};

/// A batch of glyphs sharing font, size and baseline, drawn in one call.
#[derive(Clone, Copy, Debug)]
pub struct GlyphRun<'a> {
    /// Left edge, relative to the container.
    pub x: f32,
    /// Baseline, relative to the container top.
    pub y: f32,
    pub font: &'a Font,
    pub size: f32,
    pub glyphs: &'a [GlyphId],
    pub advances: &'a [f32],
}

impl GlyphRun<'_> {
    pub fn width(&self) -> f32 {
        self.advances.iter().sum()
    }
}

/// Axis-aligned rectangle, relative to the container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: bool,
}

/// A bounded drawing region with a vertical cursor.
pub trait Container {
    /// Full horizontal extent.
    fn width(&self) -> f32;

    /// Horizontal space left after reserving `indent`.
    fn remaining_width(&self, indent: f32) -> f32 {
        (self.width() - indent).max(0.0)
    }

    /// Current vertical position, measured down from the top.
    fn cursor(&self) -> f32;

    /// Vertical space left below the cursor.
    fn remaining_height(&self) -> f32;

    /// Move the cursor down by `height`.
    ///
    /// Fails without moving when the container has less than `height` left.
    fn advance(&mut self, height: f32) -> Result<(), ContainerExhausted>;

    fn draw_glyph_run(&mut self, run: GlyphRun<'_>);

    fn draw_rect(&mut self, rect: Rect);

    /// Page number the container belongs to, when paginated.
    fn page_number(&self) -> Option<usize> {
        None
    }

    /// Open a region anchored at the cursor and `left`, growing downwards.
    fn nested(&mut self, left: f32) -> Box<dyn Container + '_>;
}

/// Standard `advance` check shared by container implementations.
pub fn checked_advance(
    cursor: &mut f32,
    remaining: f32,
    height: f32,
) -> Result<(), ContainerExhausted> {
    // Tolerate rounding noise from summed line heights.
    if height > remaining + 1e-3 {
        return Err(ContainerExhausted {
            requested: height,
            available: remaining.max(0.0),
        });
    }
    *cursor += height;
    Ok(())
}

/// Region nested in a parent container, used for embedded block content.
///
/// Its top is the parent's cursor at creation time; it can grow down to the
/// bottom of the parent. Drawing is translated into parent coordinates. The
/// parent cursor is left alone: callers advance it by the consumed height.
pub struct DownExpandingContainer<'p> {
    parent: &'p mut dyn Container,
    left: f32,
    top: f32,
    cursor: f32,
}

impl<'p> DownExpandingContainer<'p> {
    pub fn new(parent: &'p mut dyn Container, left: f32) -> Self {
        let top = parent.cursor();
        Self {
            parent,
            left,
            top,
            cursor: 0.0,
        }
    }

    /// Height consumed so far.
    pub fn consumed(&self) -> f32 {
        self.cursor
    }
}

impl Container for DownExpandingContainer<'_> {
    fn width(&self) -> f32 {
        (self.parent.width() - self.left).max(0.0)
    }

    fn cursor(&self) -> f32 {
        self.cursor
    }

    fn remaining_height(&self) -> f32 {
        (self.parent.remaining_height() - self.cursor).max(0.0)
    }

    fn advance(&mut self, height: f32) -> Result<(), ContainerExhausted> {
        let remaining = self.remaining_height();
        checked_advance(&mut self.cursor, remaining, height)
    }

    fn draw_glyph_run(&mut self, run: GlyphRun<'_>) {
        self.parent.draw_glyph_run(GlyphRun {
            x: run.x + self.left,
            y: run.y + self.top,
            ..run
        });
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.parent.draw_rect(Rect {
            x: rect.x + self.left,
            y: rect.y + self.top,
            ..rect
        });
    }

    fn page_number(&self) -> Option<usize> {
        self.parent.page_number()
    }

    fn nested(&mut self, left: f32) -> Box<dyn Container + '_> {
        Box::new(DownExpandingContainer::new(self, left))
    }
}
