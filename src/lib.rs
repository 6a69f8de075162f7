//! Resumable paragraph flow engine.
//!
//! A [`Paragraph`] of styled [`Span`]s is split into words, packed into lines
//! against the available width, tab stops and a [`Hyphenator`], and typeset
//! into a [`Container`]. When the container runs out of vertical space the
//! paragraph keeps a [`FlowCursor`] and continues from the first line that did
//! not fit on the next call.

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

pub mod container;
pub mod error;
pub mod flowable;
pub mod hyphenate;
pub mod item;
pub mod line;
pub mod metrics;
pub mod paragraph;
pub mod style;
pub mod tab_stops;
mod typeset;

#[cfg(test)]
mod test_support;

pub use container::{checked_advance, Container, DownExpandingContainer, GlyphRun, Rect};
pub use error::{ContainerExhausted, Diagnostic, StyleError};
pub use flowable::Flowable;
pub use hyphenate::{Hyphenations, Hyphenator, NoHyphenation, SOFT_HYPHEN};
pub use item::{
    BoxRender, EmbeddedBlock, Field, FieldContext, FieldResolver, InlineBox, Item, Space, Span,
    Tab, TextRun,
};
pub use line::{AppendOutcome, Line, LineRules};
pub use metrics::{shape, Font, GlyphId, GlyphInfo, GlyphLookup, GlyphMetrics, Shaped};
pub use paragraph::{ControllerState, FieldCursor, FlowCursor, Paragraph};
pub use style::{Justify, LineSpacing, ParagraphStyle, SoftHyphenPolicy, TextStyle, MAX_TAB_STOPS};
pub use tab_stops::{find_tab_stop, ResolvedTabStop, TabAlign, TabPosition, TabStop};
