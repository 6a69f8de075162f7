//! Table-driven glyph metrics for environments without font files.

use flowtype::{GlyphId, GlyphInfo, GlyphMetrics};

/// Approximate metrics from per-class em widths.
///
/// Glyph ids are Unicode scalar values. Control characters have no glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct HeuristicMetrics {
    name: String,
    proportional: bool,
    scale: f32,
}

impl HeuristicMetrics {
    /// Proportional face. Family names containing "serif" or "sans" get a
    /// slight width adjustment.
    pub fn proportional(name: impl Into<String>) -> Self {
        let name = name.into();
        let family = name.to_ascii_lowercase();
        let scale = if family.contains("sans") {
            0.99
        } else if family.contains("serif") {
            1.03
        } else {
            1.00
        };
        Self {
            name,
            proportional: true,
            scale,
        }
    }

    pub fn monospace(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proportional: false,
            scale: 1.0,
        }
    }

    fn em_width(&self, ch: char) -> f32 {
        if !self.proportional {
            return if ch == ' ' { 0.52 } else { 0.58 };
        }
        let em = match ch {
            ' ' | '\u{00A0}' => 0.32,
            'i' | 'l' | 'I' | '|' | '!' => 0.24,
            '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
            '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => 0.34,
            '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
            'f' | 't' | 'j' | 'r' => 0.34,
            'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
            c if c.is_ascii_digit() => 0.52,
            c if c.is_ascii_uppercase() => 0.64,
            c if c.is_ascii_lowercase() => 0.52,
            c if c.is_whitespace() => 0.32,
            c if c.is_ascii_punctuation() => 0.42,
            _ => 0.56,
        };
        em * self.scale
    }
}

impl GlyphMetrics for HeuristicMetrics {
    fn name(&self) -> &str {
        &self.name
    }

    fn glyph_for(&self, ch: char) -> Option<GlyphInfo> {
        if ch.is_control() {
            return None;
        }
        Some(GlyphInfo {
            id: ch as GlyphId,
            advance: self.em_width(ch),
        })
    }

    fn missing_glyph(&self) -> GlyphInfo {
        GlyphInfo {
            id: 0,
            advance: 0.5,
        }
    }

    fn kerning(&self, left: GlyphId, right: GlyphId) -> f32 {
        if !self.proportional {
            return 0.0;
        }
        let (Some(left), Some(right)) = (char::from_u32(left), char::from_u32(right)) else {
            return 0.0;
        };
        match (left, right) {
            ('A', 'V') | ('V', 'A') | ('A', 'W') | ('W', 'A') => -0.08,
            ('T', 'o') | ('T', 'a') | ('T', 'e') | ('V', 'o') | ('V', 'a') | ('Y', 'o') => -0.06,
            ('L', 'T') | ('L', 'V') | ('P', '.') | ('P', ',') => -0.05,
            ('f', '.') | ('r', '.') | ('r', ',') | ('y', '.') => -0.03,
            _ => 0.0,
        }
    }
}
