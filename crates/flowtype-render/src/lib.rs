//! Page backend, reference collaborators and pagination driver for `flowtype`.

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

mod fields;
mod hyphenation;
mod metrics;
mod page;
mod render_engine;
mod render_ir;

pub use fields::{NumberFormat, PageNumberField};
pub use hyphenation::EnglishHyphenator;
pub use metrics::HeuristicMetrics;
pub use page::PageContainer;
pub use render_engine::{
    text_paragraphs, LayoutConfig, PageCache, RenderDiagnostic, RenderEngine, RenderError,
};
pub use render_ir::{DrawCommand, GlyphRunCommand, PageMetrics, RectCommand, RenderPage};
