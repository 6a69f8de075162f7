use flowtype::{
    checked_advance, Container, ContainerExhausted, DownExpandingContainer, GlyphRun, Rect,
};

use crate::render_engine::LayoutConfig;
use crate::render_ir::{DrawCommand, GlyphRunCommand, RectCommand, RenderPage};

/// Body area of one page, recording draw commands into a [`RenderPage`].
///
/// Container coordinates are relative to the top-left corner of the body;
/// recorded commands are in page coordinates.
#[derive(Debug)]
pub struct PageContainer {
    page: RenderPage,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    cursor: f32,
}

impl PageContainer {
    pub fn new(page_number: usize, config: &LayoutConfig) -> Self {
        Self {
            page: RenderPage::new(page_number),
            left: config.margin_left,
            top: config.margin_top,
            width: config.content_width(),
            height: config.content_height(),
            cursor: 0.0,
        }
    }

    pub fn page_number(&self) -> usize {
        self.page.page_number
    }

    pub fn page(&self) -> &RenderPage {
        &self.page
    }

    /// Nothing has been placed on the page yet.
    pub fn is_pristine(&self) -> bool {
        self.cursor <= 0.0 && self.page.is_empty()
    }

    /// Finish the page.
    pub fn into_page(mut self) -> RenderPage {
        self.page.metrics.content_height = self.cursor;
        self.page
    }
}

impl Container for PageContainer {
    fn width(&self) -> f32 {
        self.width
    }

    fn cursor(&self) -> f32 {
        self.cursor
    }

    fn remaining_height(&self) -> f32 {
        (self.height - self.cursor).max(0.0)
    }

    fn advance(&mut self, height: f32) -> Result<(), ContainerExhausted> {
        let remaining = self.remaining_height();
        checked_advance(&mut self.cursor, remaining, height)
    }

    fn draw_glyph_run(&mut self, run: GlyphRun<'_>) {
        self.page.push_command(DrawCommand::GlyphRun(GlyphRunCommand {
            x: run.x + self.left,
            baseline_y: run.y + self.top,
            font: run.font.name().to_string(),
            size: run.size,
            glyphs: run.glyphs.to_vec(),
            advances: run.advances.to_vec(),
        }));
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.page.push_command(DrawCommand::Rect(RectCommand {
            x: rect.x + self.left,
            y: rect.y + self.top,
            width: rect.width,
            height: rect.height,
            fill: rect.fill,
        }));
    }

    fn page_number(&self) -> Option<usize> {
        Some(self.page.page_number)
    }

    fn nested(&mut self, left: f32) -> Box<dyn Container + '_> {
        Box::new(DownExpandingContainer::new(self, left))
    }
}
