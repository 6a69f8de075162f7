//! embedded-graphics backend for `flowtype-render` pages.
//!
//! [`MonoMetrics`] measures text with the same cell widths the raster fonts
//! use, so lines packed with [`text_style`] rasterize exactly where the layout
//! put them. [`EgRenderer`] draws a [`RenderPage`] onto any binary-color
//! `DrawTarget`.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use std::sync::{Arc, OnceLock};

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10, FONT_7X14, FONT_7X14_BOLD, FONT_9X18, FONT_9X18_BOLD},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use flowtype::{Font, GlyphInfo, GlyphMetrics, TextStyle};
use flowtype_render::{DrawCommand, GlyphRunCommand, RectCommand, RenderPage};

/// Raster faces available to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonoFace {
    Small,
    Medium,
    MediumBold,
    Large,
    LargeBold,
    ExtraLarge,
}

impl MonoFace {
    pub const ALL: [MonoFace; 6] = [
        Self::Small,
        Self::Medium,
        Self::MediumBold,
        Self::Large,
        Self::LargeBold,
        Self::ExtraLarge,
    ];

    /// Font name recorded in glyph run commands.
    pub fn name(self) -> &'static str {
        match self {
            Self::Small => "mono-6x10",
            Self::Medium => "mono-7x14",
            Self::MediumBold => "mono-7x14-bold",
            Self::Large => "mono-9x18",
            Self::LargeBold => "mono-9x18-bold",
            Self::ExtraLarge => "mono-10x20",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.name() == name)
    }

    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            Self::Small => &FONT_6X10,
            Self::Medium => &FONT_7X14,
            Self::MediumBold => &FONT_7X14_BOLD,
            Self::Large => &FONT_9X18,
            Self::LargeBold => &FONT_9X18_BOLD,
            Self::ExtraLarge => &FONT_10X20,
        }
    }

    /// Closest face for a requested text size.
    pub fn for_size(size: f32, bold: bool) -> Self {
        match (size, bold) {
            (s, _) if s < 14.0 => Self::Small,
            (s, false) if s < 18.0 => Self::Medium,
            (s, true) if s < 18.0 => Self::MediumBold,
            (s, false) if s < 20.0 => Self::Large,
            (_, true) => {
                if size >= 20.0 {
                    log::debug!("no bold face at {:.1}px; using {}", size, Self::LargeBold.name());
                }
                Self::LargeBold
            }
            _ => Self::ExtraLarge,
        }
    }

    /// Horizontal distance between glyph origins, in pixels.
    pub fn cell_width(self) -> u32 {
        let font = self.font();
        font.character_size.width + font.character_spacing
    }

    /// Character cell height, in pixels.
    pub fn height(self) -> u32 {
        self.font().character_size.height
    }

    fn index(self) -> usize {
        match self {
            Self::Small => 0,
            Self::Medium => 1,
            Self::MediumBold => 2,
            Self::Large => 3,
            Self::LargeBold => 4,
            Self::ExtraLarge => 5,
        }
    }
}

/// Glyph metrics of a raster face. One em is the cell height, so a style
/// sized at [`MonoFace::height`] measures in whole pixels.
#[derive(Clone, Copy, Debug)]
pub struct MonoMetrics {
    face: MonoFace,
    advance: f32,
}

impl MonoMetrics {
    pub fn new(face: MonoFace) -> Self {
        Self {
            face,
            advance: face.cell_width() as f32 / face.height() as f32,
        }
    }

    pub fn face(&self) -> MonoFace {
        self.face
    }
}

impl GlyphMetrics for MonoMetrics {
    fn name(&self) -> &str {
        self.face.name()
    }

    fn glyph_for(&self, ch: char) -> Option<GlyphInfo> {
        (ch == ' ' || ch.is_ascii_graphic()).then_some(GlyphInfo {
            id: ch as u32,
            advance: self.advance,
        })
    }

    fn missing_glyph(&self) -> GlyphInfo {
        GlyphInfo {
            id: '?' as u32,
            advance: self.advance,
        }
    }

    fn ascent(&self) -> f32 {
        let font = self.face.font();
        font.baseline as f32 / self.face.height() as f32
    }
}

fn shared_font(face: MonoFace) -> Arc<Font> {
    static FONTS: OnceLock<Vec<Arc<Font>>> = OnceLock::new();
    let fonts = FONTS.get_or_init(|| {
        MonoFace::ALL
            .into_iter()
            .map(|face| Font::new(MonoMetrics::new(face)))
            .collect()
    });
    match fonts.get(face.index()) {
        Some(font) => Arc::clone(font),
        None => Font::new(MonoMetrics::new(face)),
    }
}

/// Text style that lays out in the pixel grid of `face`.
///
/// Styles for the same face share one font, so consecutive runs batch into a
/// single glyph run command.
pub fn text_style(face: MonoFace) -> TextStyle {
    TextStyle::new(shared_font(face), face.height() as f32)
}

/// Counters for degraded output observed while drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EgRenderDiagnostics {
    pub glyph_runs: u64,
    pub rects: u64,
    /// Runs whose font name is not a known raster face.
    pub unknown_fonts: u64,
    /// Glyphs with no raster equivalent, drawn as `?`.
    pub missing_glyphs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EgRenderConfig {
    /// Clear display before drawing page.
    pub clear_first: bool,
    /// Face used for runs with an unknown font name.
    pub fallback_face: MonoFace,
}

impl Default for EgRenderConfig {
    fn default() -> Self {
        Self {
            clear_first: true,
            fallback_face: MonoFace::Small,
        }
    }
}

/// Draw-command executor for embedded-graphics targets.
#[derive(Clone, Debug, Default)]
pub struct EgRenderer {
    cfg: EgRenderConfig,
}

impl EgRenderer {
    pub fn new(cfg: EgRenderConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EgRenderConfig {
        &self.cfg
    }

    /// Render a page to a draw target.
    pub fn render_page<D>(&self, page: &RenderPage, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.render_page_with_diagnostics(page, display).map(|_| ())
    }

    /// Render a page and return fallback counters.
    pub fn render_page_with_diagnostics<D>(
        &self,
        page: &RenderPage,
        display: &mut D,
    ) -> Result<EgRenderDiagnostics, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let mut diagnostics = EgRenderDiagnostics::default();
        if self.cfg.clear_first {
            display.clear(BinaryColor::Off)?;
        }
        for cmd in &page.commands {
            match cmd {
                DrawCommand::GlyphRun(run) => self.draw_glyph_run(display, run, &mut diagnostics)?,
                DrawCommand::Rect(rect) => {
                    draw_rect(display, rect)?;
                    diagnostics.rects += 1;
                }
            }
        }
        if diagnostics.unknown_fonts > 0 || diagnostics.missing_glyphs > 0 {
            log::warn!(
                "page {} rendered with fallbacks: unknown_fonts={} missing_glyphs={}",
                page.page_number,
                diagnostics.unknown_fonts,
                diagnostics.missing_glyphs
            );
        }
        Ok(diagnostics)
    }

    fn draw_glyph_run<D>(
        &self,
        display: &mut D,
        run: &GlyphRunCommand,
        diagnostics: &mut EgRenderDiagnostics,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        diagnostics.glyph_runs += 1;
        let face = match MonoFace::from_name(&run.font) {
            Some(face) => face,
            None => {
                diagnostics.unknown_fonts += 1;
                self.cfg.fallback_face
            }
        };
        let style = MonoTextStyle::new(face.font(), BinaryColor::On);
        let baseline = run.baseline_y.round() as i32;
        let mut x = run.x;
        let mut buf = [0u8; 4];
        for (&glyph, &advance) in run.glyphs.iter().zip(&run.advances) {
            let ch = match char::from_u32(glyph) {
                Some(ch) if ch.is_ascii_graphic() || ch == ' ' => ch,
                _ => {
                    diagnostics.missing_glyphs += 1;
                    '?'
                }
            };
            if ch != ' ' {
                let origin = Point::new(x.round() as i32, baseline);
                Text::with_baseline(ch.encode_utf8(&mut buf), origin, style, Baseline::Alphabetic)
                    .draw(display)?;
            }
            x += advance;
        }
        Ok(())
    }
}

fn draw_rect<D>(display: &mut D, rect: &RectCommand) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let shape = Rectangle::new(
        Point::new(rect.x.round() as i32, rect.y.round() as i32),
        Size::new(
            rect.width.round().max(0.0) as u32,
            rect.height.round().max(0.0) as u32,
        ),
    );
    let style = if rect.fill {
        PrimitiveStyle::with_fill(BinaryColor::On)
    } else {
        PrimitiveStyle::with_stroke(BinaryColor::On, 1)
    };
    shape.into_styled(style).draw(display)
}
