//! Glyph metrics contract and the shaping helper built on it.

use smallvec::SmallVec;
use std::sync::Arc;

/// Glyph identifier as understood by the metrics provider and the renderer.
pub type GlyphId = u32;

/// Advance and identifier for one glyph, in em units (1.0 = font size).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    pub id: GlyphId,
    pub advance: f32,
}

/// Font metrics lookup provided by the font backend.
///
/// All lengths are expressed in em units and scaled by the text size by the
/// caller.
pub trait GlyphMetrics: Send + Sync {
    /// Human-readable font name used in diagnostics and render output.
    fn name(&self) -> &str;

    /// Glyph for `ch`, or `None` when the font has no such glyph.
    fn glyph_for(&self, ch: char) -> Option<GlyphInfo>;

    /// Placeholder glyph used when `glyph_for` has no entry.
    fn missing_glyph(&self) -> GlyphInfo;

    /// Horizontal adjustment between an ordered glyph pair.
    fn kerning(&self, _left: GlyphId, _right: GlyphId) -> f32 {
        0.0
    }

    /// Ligature replacing an ordered glyph pair.
    ///
    /// Reserved extension point: the engine never substitutes ligatures.
    fn ligature(&self, _left: GlyphId, _right: GlyphId) -> Option<GlyphId> {
        None
    }

    /// Ascender height above the baseline.
    fn ascent(&self) -> f32 {
        0.8
    }

    /// Descender depth below the baseline (negative).
    fn descent(&self) -> f32 {
        -0.2
    }
}

/// Shared handle to a metrics provider.
pub struct Font {
    metrics: Box<dyn GlyphMetrics>,
}

impl core::fmt::Debug for Font {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Font").field("name", &self.name()).finish()
    }
}

/// Result of a glyph lookup through [`Font::glyph`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphLookup {
    pub info: GlyphInfo,
    /// The placeholder glyph was substituted.
    pub missing: bool,
}

impl Font {
    /// Wrap a metrics provider into a shareable font handle.
    pub fn new<M>(metrics: M) -> Arc<Self>
    where
        M: GlyphMetrics + 'static,
    {
        Arc::new(Self {
            metrics: Box::new(metrics),
        })
    }

    pub fn name(&self) -> &str {
        self.metrics.name()
    }

    pub fn metrics(&self) -> &dyn GlyphMetrics {
        self.metrics.as_ref()
    }

    /// Look up `ch`, substituting the missing glyph when absent.
    pub fn glyph(&self, ch: char) -> GlyphLookup {
        match self.metrics.glyph_for(ch) {
            Some(info) => GlyphLookup {
                info,
                missing: false,
            },
            None => {
                log::warn!(
                    "{} does not contain glyph for unicode index 0x{:04x} ({})",
                    self.name(),
                    ch as u32,
                    ch
                );
                GlyphLookup {
                    info: self.metrics.missing_glyph(),
                    missing: true,
                }
            }
        }
    }

    /// Measure `text` at `size` without keeping the glyphs.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        shape(self, text, size).width
    }
}

/// Glyphs and per-glyph advances for a piece of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shaped {
    pub glyphs: SmallVec<[GlyphId; 16]>,
    /// Advance per glyph, scaled to the text size, kerning folded in.
    pub advances: SmallVec<[f32; 16]>,
    pub width: f32,
    /// Characters that had to use the missing glyph.
    pub missing: SmallVec<[char; 2]>,
}

/// Map `text` to glyphs and kerned advances at `size`.
pub fn shape(font: &Font, text: &str, size: f32) -> Shaped {
    let mut out = Shaped::default();
    for ch in text.chars() {
        let lookup = font.glyph(ch);
        if lookup.missing {
            out.missing.push(ch);
        }
        if let (Some(prev_glyph), Some(prev_advance)) =
            (out.glyphs.last().copied(), out.advances.last_mut())
        {
            *prev_advance += font.metrics().kerning(prev_glyph, lookup.info.id) * size;
        }
        out.glyphs.push(lookup.info.id);
        out.advances.push(lookup.info.advance * size);
    }
    out.width = out.advances.iter().sum();
    out
}
