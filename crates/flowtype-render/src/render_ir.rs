use serde::{Deserialize, Serialize};

/// Page represented as backend-agnostic draw commands.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Draw commands in paint order, in page coordinates.
    pub commands: Vec<DrawCommand>,
    /// Per-page metrics.
    pub metrics: PageMetrics,
}

impl RenderPage {
    const INITIAL_COMMAND_CAPACITY: usize = 8;

    /// Create an empty page.
    pub fn new(page_number: usize) -> Self {
        Self {
            page_number,
            // Empty pages stay allocation free.
            commands: Vec::with_capacity(0),
            metrics: PageMetrics::default(),
        }
    }

    /// Push a draw command.
    pub fn push_command(&mut self, cmd: DrawCommand) {
        if self.commands.capacity() == 0 {
            self.commands.reserve(Self::INITIAL_COMMAND_CAPACITY);
        }
        if let DrawCommand::GlyphRun(run) = &cmd {
            self.metrics.glyph_count += run.glyphs.len();
        }
        self.commands.push(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Glyph runs in paint order.
    pub fn glyph_runs(&self) -> impl Iterator<Item = &GlyphRunCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::GlyphRun(run) => Some(run),
            DrawCommand::Rect(_) => None,
        })
    }
}

/// Page metrics collected while the page is filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    /// Vertical space used inside the page body.
    pub content_height: f32,
    /// Glyphs drawn on the page.
    pub glyph_count: usize,
}

/// Layout output commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Draw a batch of positioned glyphs.
    GlyphRun(GlyphRunCommand),
    /// Draw rectangle.
    Rect(RectCommand),
}

/// Glyph run draw command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphRunCommand {
    /// Left x.
    pub x: f32,
    /// Baseline y.
    pub baseline_y: f32,
    /// Font name as reported by the metrics provider.
    pub font: String,
    /// Size in page units.
    pub size: f32,
    pub glyphs: Vec<u32>,
    /// Per-glyph advances, kerning and justification included.
    pub advances: Vec<f32>,
}

impl GlyphRunCommand {
    pub fn width(&self) -> f32 {
        self.advances.iter().sum()
    }
}

/// Rectangle command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectCommand {
    /// Left x.
    pub x: f32,
    /// Top y.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Fill rectangle when true.
    pub fill: bool,
}
