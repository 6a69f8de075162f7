use core::fmt;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use flowtype::{Container, Flowable};

use crate::page::PageContainer;
use crate::render_ir::RenderPage;

/// Page geometry used by the pagination driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Physical page width.
    pub page_width: f32,
    /// Physical page height.
    pub page_height: f32,
    /// Left margin.
    pub margin_left: f32,
    /// Right margin.
    pub margin_right: f32,
    /// Top margin.
    pub margin_top: f32,
    /// Bottom margin.
    pub margin_bottom: f32,
    /// Gap between consecutive flowables; dropped at the top of a page.
    pub paragraph_gap: f32,
}

impl LayoutConfig {
    /// Convenience for a page size with sensible defaults.
    pub fn for_page(width: f32, height: f32) -> Self {
        Self {
            page_width: width,
            page_height: height,
            ..Self::default()
        }
    }

    /// Same margin on all four sides.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin_left = margin;
        self.margin_right = margin;
        self.margin_top = margin;
        self.margin_bottom = margin;
        self
    }

    pub fn content_width(self) -> f32 {
        (self.page_width - self.margin_left - self.margin_right).max(1.0)
    }

    pub fn content_height(self) -> f32 {
        (self.page_height - self.margin_top - self.margin_bottom).max(1.0)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 480.0,
            page_height: 800.0,
            margin_left: 32.0,
            margin_right: 32.0,
            margin_top: 48.0,
            margin_bottom: 40.0,
            paragraph_gap: 8.0,
        }
    }
}

/// Pagination and page cache errors.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderError {
    /// A flowable could not place anything on an empty page.
    NoProgress {
        page_number: usize,
        flowable_index: usize,
    },
    /// Page cache could not be encoded or decoded.
    Cache(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProgress {
                page_number,
                flowable_index,
            } => write!(
                f,
                "flowable {} does not fit on empty page {}",
                flowable_index, page_number
            ),
            Self::Cache(msg) => write!(f, "page cache error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<postcard::Error> for RenderError {
    fn from(err: postcard::Error) -> Self {
        Self::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Cache(err.to_string())
    }
}

/// Runtime diagnostics from pagination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderDiagnostic {
    /// A page was completed.
    PageEmitted {
        page_number: usize,
        content_height: f32,
    },
    /// A flowable continued on the next page.
    FlowableSplit {
        flowable_index: usize,
        page_number: usize,
    },
    /// Total pagination time.
    ReflowTimeMs(u32),
}

type DiagnosticSink = Option<Box<dyn FnMut(RenderDiagnostic)>>;

/// Flows a sequence of flowables into pages.
pub struct RenderEngine {
    config: LayoutConfig,
    diagnostic_sink: DiagnosticSink,
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("config", &self.config)
            .field("diagnostic_sink", &self.diagnostic_sink.is_some())
            .finish()
    }
}

impl RenderEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            diagnostic_sink: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Register a callback receiving pagination diagnostics.
    pub fn set_diagnostic_sink<F>(&mut self, sink: F)
    where
        F: FnMut(RenderDiagnostic) + 'static,
    {
        self.diagnostic_sink = Some(Box::new(sink));
    }

    fn emit_diagnostic(&mut self, diagnostic: RenderDiagnostic) {
        if let Some(sink) = self.diagnostic_sink.as_mut() {
            sink(diagnostic);
        }
    }

    /// Lay out all flowables and collect the pages.
    pub fn paginate<F: Flowable>(&mut self, flowables: &mut [F]) -> Result<Vec<RenderPage>, RenderError> {
        let mut pages = Vec::with_capacity(4);
        self.paginate_with(flowables, |page| pages.push(page))?;
        Ok(pages)
    }

    /// Lay out all flowables, handing each page to `on_page` as soon as it is
    /// complete. Returns the number of pages emitted.
    pub fn paginate_with<F, P>(
        &mut self,
        flowables: &mut [F],
        mut on_page: P,
    ) -> Result<usize, RenderError>
    where
        F: Flowable,
        P: FnMut(RenderPage),
    {
        let started = Instant::now();
        for flowable in flowables.iter_mut() {
            flowable.begin_pass();
        }

        let config = self.config;
        let mut emitted = 0usize;
        let mut page = PageContainer::new(1, &config);
        for (index, flowable) in flowables.iter_mut().enumerate() {
            if index > 0 && !page.is_pristine() && page.advance(config.paragraph_gap).is_err() {
                page = self.finish_page(page, &config, &mut on_page);
                emitted += 1;
            }
            loop {
                match flowable.flow(&mut page) {
                    Ok(_) => break,
                    Err(exhausted) => {
                        if page.is_pristine() {
                            log::warn!(
                                "flowable {} made no progress on empty page {} ({})",
                                index,
                                page.page_number(),
                                exhausted
                            );
                            return Err(RenderError::NoProgress {
                                page_number: page.page_number(),
                                flowable_index: index,
                            });
                        }
                        log::debug!(
                            "flowable {} continues after page {}",
                            index,
                            page.page_number()
                        );
                        self.emit_diagnostic(RenderDiagnostic::FlowableSplit {
                            flowable_index: index,
                            page_number: page.page_number(),
                        });
                        page = self.finish_page(page, &config, &mut on_page);
                        emitted += 1;
                    }
                }
            }
        }
        if !page.is_pristine() {
            self.finish_page(page, &config, &mut on_page);
            emitted += 1;
        }

        let elapsed = started.elapsed().as_millis().min(u32::MAX as u128) as u32;
        self.emit_diagnostic(RenderDiagnostic::ReflowTimeMs(elapsed));
        Ok(emitted)
    }

    /// Emit `page` and open the next one.
    fn finish_page<P>(
        &mut self,
        page: PageContainer,
        config: &LayoutConfig,
        on_page: &mut P,
    ) -> PageContainer
    where
        P: FnMut(RenderPage),
    {
        let next_number = page.page_number() + 1;
        let page = page.into_page();
        self.emit_diagnostic(RenderDiagnostic::PageEmitted {
            page_number: page.page_number,
            content_height: page.metrics.content_height,
        });
        on_page(page);
        PageContainer::new(next_number, config)
    }
}

const CACHE_SCHEMA_VERSION: u8 = 1;

#[derive(Serialize)]
struct CacheEnvelopeRef<'a> {
    version: u8,
    pages: &'a [RenderPage],
}

#[derive(Deserialize)]
struct CacheEnvelope {
    version: u8,
    pages: Vec<RenderPage>,
}

/// Serialized form of paginated output.
///
/// The binary form is versioned; payloads from another schema version are
/// rejected instead of being misread.
#[derive(Clone, Copy, Debug, Default)]
pub struct PageCache;

impl PageCache {
    /// Compact binary encoding.
    pub fn encode(pages: &[RenderPage]) -> Result<Vec<u8>, RenderError> {
        let envelope = CacheEnvelopeRef {
            version: CACHE_SCHEMA_VERSION,
            pages,
        };
        Ok(postcard::to_allocvec(&envelope)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Vec<RenderPage>, RenderError> {
        let envelope: CacheEnvelope = postcard::from_bytes(bytes)?;
        if envelope.version != CACHE_SCHEMA_VERSION {
            return Err(RenderError::Cache(format!(
                "unsupported schema version {} (expected {})",
                envelope.version, CACHE_SCHEMA_VERSION
            )));
        }
        Ok(envelope.pages)
    }

    /// Human-readable JSON dump.
    pub fn to_json(pages: &[RenderPage]) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(pages)?)
    }
}

/// Split plain text into paragraphs at blank lines. Single line breaks inside
/// a paragraph become spaces.
pub fn text_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(core::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::HeuristicMetrics;
    use crate::render_ir::{DrawCommand, GlyphRunCommand};
    use flowtype::{Font, Justify, LineSpacing, Paragraph, ParagraphStyle, TextStyle};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn body() -> TextStyle {
        TextStyle::new(Font::new(HeuristicMetrics::monospace("Mono")), 10.0)
    }

    fn paragraph(text: &str) -> Paragraph {
        let style = ParagraphStyle::default()
            .with_justify(Justify::Left)
            .with_line_spacing(LineSpacing::Proportional(1.0));
        Paragraph::new(style).text(text, &body())
    }

    fn small_page() -> LayoutConfig {
        LayoutConfig {
            paragraph_gap: 5.0,
            ..LayoutConfig::for_page(100.0, 50.0).with_margin(5.0)
        }
    }

    #[test]
    fn empty_input_yields_no_pages() {
        let mut engine = RenderEngine::new(small_page());
        let mut flowables: Vec<Paragraph> = Vec::new();
        assert!(engine.paginate(&mut flowables).expect("ok").is_empty());
    }

    #[test]
    fn long_paragraph_spans_several_pages() {
        let text = vec!["word"; 60].join(" ");
        let mut engine = RenderEngine::new(small_page());
        let mut flowables = vec![paragraph(&text)];
        let pages = engine.paginate(&mut flowables).expect("paginates");
        assert!(pages.len() > 1);
        for (idx, page) in pages.iter().enumerate() {
            assert_eq!(page.page_number, idx + 1);
            assert!(page.metrics.content_height <= small_page().content_height() + 1e-3);
        }
        let words: usize = pages
            .iter()
            .flat_map(RenderPage::glyph_runs)
            .map(|run: &GlyphRunCommand| {
                run.glyphs
                    .split(|&g| g == ' ' as u32)
                    .filter(|w| !w.is_empty())
                    .count()
            })
            .sum();
        assert_eq!(words, 60);
    }

    #[test]
    fn oversized_line_reports_no_progress() {
        let config = LayoutConfig::for_page(100.0, 12.0).with_margin(1.0);
        let mut engine = RenderEngine::new(config);
        let style = TextStyle::new(Font::new(HeuristicMetrics::monospace("Mono")), 40.0);
        let mut flowables = vec![Paragraph::new(ParagraphStyle::default()).text("x", &style)];
        assert_eq!(
            engine.paginate(&mut flowables),
            Err(RenderError::NoProgress {
                page_number: 1,
                flowable_index: 0
            })
        );
    }

    #[test]
    fn paragraph_gap_is_dropped_at_page_top() {
        // Each paragraph is one 10-high line; the body is 40 high, so four
        // paragraphs with three gaps do not fit and the fourth moves on.
        let mut engine = RenderEngine::new(small_page());
        let mut flowables: Vec<Paragraph> = (0..4).map(|_| paragraph("ab")).collect();
        let pages = engine.paginate(&mut flowables).expect("paginates");
        assert_eq!(pages.len(), 2);
        let second: Vec<&GlyphRunCommand> = pages[1].glyph_runs().collect();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].baseline_y, 5.0 + 10.0);
    }

    #[test]
    fn diagnostics_report_splits_and_pages() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut engine = RenderEngine::new(small_page());
        engine.set_diagnostic_sink(move |diag| sink.borrow_mut().push(diag));
        let text = vec!["word"; 40].join(" ");
        let mut flowables = vec![paragraph(&text)];
        let count = engine
            .paginate_with(&mut flowables, |_| {})
            .expect("paginates");
        let seen = seen.borrow();
        let emitted = seen
            .iter()
            .filter(|d| matches!(d, RenderDiagnostic::PageEmitted { .. }))
            .count();
        assert_eq!(emitted, count);
        assert!(seen
            .iter()
            .any(|d| matches!(d, RenderDiagnostic::FlowableSplit { flowable_index: 0, .. })));
    }

    #[test]
    fn cache_round_trip_preserves_pages() {
        let mut engine = RenderEngine::new(small_page());
        let mut flowables = vec![paragraph("cache me please")];
        let pages = engine.paginate(&mut flowables).expect("paginates");
        let bytes = PageCache::encode(&pages).expect("encodes");
        assert_eq!(PageCache::decode(&bytes).expect("decodes"), pages);
        let json = PageCache::to_json(&pages).expect("json");
        assert!(json.contains("\"page_number\": 1"));
    }

    #[test]
    fn cache_rejects_other_schema_versions() {
        let mut bytes = PageCache::encode(&[]).expect("encodes");
        bytes[0] = CACHE_SCHEMA_VERSION + 1;
        assert!(matches!(PageCache::decode(&bytes), Err(RenderError::Cache(_))));
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        let text = "first line\ncontinues\n\n\n  second  \n";
        assert_eq!(
            text_paragraphs(text),
            vec!["first line continues".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn page_commands_are_in_page_coordinates() {
        let mut engine = RenderEngine::new(small_page());
        let mut flowables = vec![paragraph("ab")];
        let pages = engine.paginate(&mut flowables).expect("paginates");
        let DrawCommand::GlyphRun(run) = &pages[0].commands[0] else {
            panic!("expected glyph run");
        };
        assert_eq!(run.x, 5.0);
        assert_eq!(run.baseline_y, 15.0);
    }
}
