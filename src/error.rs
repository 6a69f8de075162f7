//! Error and diagnostic types shared by the flow engine.

use core::fmt;

/// The container ran out of vertical space.
///
/// This is the only failure that crosses the flow boundary. The flowable that
/// observed it has already rolled its cursor back to the last committed line,
/// so the caller can retry the same flowable against a fresh container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerExhausted {
    /// Vertical space the failed advance asked for.
    pub requested: f32,
    /// Vertical space that was left in the container.
    pub available: f32,
}

impl fmt::Display for ContainerExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "container exhausted (requested={:.2} available={:.2})",
            self.requested, self.available
        )
    }
}

impl std::error::Error for ContainerExhausted {}

/// Invalid paragraph style configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleError {
    /// More tab stops than the style can hold.
    TooManyTabStops { limit: usize },
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyTabStops { limit } => {
                write!(f, "too many tab stops (limit={})", limit)
            }
        }
    }
}

impl std::error::Error for StyleError {}

/// Non-fatal conditions observed while laying out content.
///
/// Layout always proceeds after one of these; they are surfaced so callers can
/// report degraded output.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// The font has no glyph for `ch`; its missing-glyph entry was used instead.
    MissingGlyph { font: String, ch: char },
    /// An item wider than the whole line was placed anyway.
    UnfittableItem { width: f32, available: f32 },
    /// A tab found no tab stop past the cursor and fell back to a plain spacer.
    UnresolvedTab { cursor: f32 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGlyph { font, ch } => write!(
                f,
                "{} does not contain a glyph for U+{:04X} ({})",
                font, *ch as u32, ch
            ),
            Self::UnfittableItem { width, available } => write!(
                f,
                "item too long to fit on line (width={:.2} available={:.2})",
                width, available
            ),
            Self::UnresolvedTab { cursor } => {
                write!(f, "no tab stop after cursor {:.2}", cursor)
            }
        }
    }
}
