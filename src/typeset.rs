//! Line finalization: trailing whitespace, tab expansion, justification and
//! batched glyph output.

use smallvec::SmallVec;

use crate::container::{Container, GlyphRun};
use crate::error::ContainerExhausted;
use crate::item::{Item, Space, Tab, TextRun};
use crate::line::Line;
use crate::metrics::GlyphId;
use crate::style::{Justify, TextStyle};

/// Glyphs collected for one draw call.
struct PendingRun {
    style: TextStyle,
    x: f32,
    glyphs: SmallVec<[GlyphId; 64]>,
    advances: SmallVec<[f32; 64]>,
}

struct RunBatcher {
    pending: Option<PendingRun>,
    baseline: f32,
    x: f32,
}

impl RunBatcher {
    fn push(
        &mut self,
        container: &mut dyn Container,
        style: &TextStyle,
        glyphs: &[GlyphId],
        advances: &[f32],
    ) {
        if !matches!(&self.pending, Some(run) if run.style == *style) {
            self.flush(container);
            self.pending = Some(PendingRun {
                style: style.clone(),
                x: self.x,
                glyphs: SmallVec::new(),
                advances: SmallVec::new(),
            });
        }
        if let Some(run) = self.pending.as_mut() {
            run.glyphs.extend_from_slice(glyphs);
            run.advances.extend_from_slice(advances);
        }
        self.x += advances.iter().sum::<f32>();
    }

    fn flush(&mut self, container: &mut dyn Container) {
        let Some(run) = self.pending.take() else {
            return;
        };
        if run.glyphs.is_empty() {
            return;
        }
        container.draw_glyph_run(GlyphRun {
            x: run.x,
            y: self.baseline - run.style.y_offset,
            font: &run.style.font,
            size: run.style.size,
            glyphs: &run.glyphs,
            advances: &run.advances,
        });
    }
}

/// Replace a packed tab with a fixed blank, or blank plus leader characters
/// when its stop has a fill.
fn expand_tab(tab: &Tab, out: &mut Vec<Item>) {
    let width = tab.tab_width().unwrap_or(0.0).max(0.0);
    let style = tab.style();
    let fill = tab.stop().and_then(|stop| stop.fill);
    if let Some(fill) = fill {
        let mut fill_text = String::new();
        fill_text.push(fill);
        let fill_width = style.font.measure(&fill_text, style.size);
        if fill_width > 0.0 {
            let count = (width / fill_width).floor() as usize;
            let rest = width - count as f32 * fill_width;
            out.push(Item::Space(Space::fixed(rest, style.clone())));
            if count > 0 {
                let leader: String = core::iter::repeat(fill).take(count).collect();
                out.push(Item::Text(TextRun::new(&leader, style.clone())));
            }
            return;
        }
    }
    out.push(Item::Space(Space::fixed(width, style.clone())));
}

impl Line {
    /// Typeset the line into `container` without consuming it.
    ///
    /// Advances the container by the tallest item before drawing; an empty
    /// line draws nothing and returns `0.0`. Calling this repeatedly on the
    /// same line produces the same output.
    pub fn typeset(
        &self,
        container: &mut dyn Container,
        last_line: bool,
    ) -> Result<f32, ContainerExhausted> {
        let mut end = self.items.len();
        while end > 0 && self.items[end - 1].is_stretchable_space() {
            end -= 1;
        }
        let packed = &self.items[..end];
        if packed.is_empty() {
            return Ok(0.0);
        }

        let has_tab = packed.iter().any(|item| matches!(item, Item::Tab(_)));
        let justify = match self.rules.justify {
            Justify::Both if has_tab || last_line => Justify::Left,
            other => other,
        };

        let mut items = Vec::with_capacity(packed.len() + 2);
        for item in packed {
            match item {
                Item::Tab(tab) => expand_tab(tab, &mut items),
                other => items.push(other.clone()),
            }
        }

        let line_width: f32 = items.iter().map(Item::width).sum();
        let max_height = items.iter().map(Item::height).fold(0.0f32, f32::max);
        let extra = self.width - line_width;
        let mut x = self.indent;
        let mut stretch = 0.0;
        match justify {
            Justify::Left => {}
            Justify::Center => x += extra / 2.0,
            Justify::Right => x += extra,
            Justify::Both => {
                let spaces = items.iter().filter(|item| item.is_stretchable_space()).count();
                if spaces > 0 {
                    stretch = extra / spaces as f32;
                }
            }
        }

        container.advance(max_height)?;
        let mut batcher = RunBatcher {
            pending: None,
            baseline: container.cursor(),
            x,
        };
        for item in &items {
            match item {
                Item::Text(run) => batcher.push(container, run.style(), run.glyphs(), run.advances()),
                Item::Space(space) => {
                    let width = if space.is_fixed() {
                        space.width()
                    } else {
                        space.width() + stretch
                    };
                    batcher.push(container, space.style(), &[space.glyph()], &[width]);
                }
                Item::Box(inline) => {
                    batcher.flush(container);
                    let baseline = batcher.baseline;
                    batcher.x += inline.render(container, batcher.x, baseline);
                }
                Item::Tab(_) | Item::LineBreak | Item::Field(_) | Item::Block(_) => {}
            }
        }
        batcher.flush(container);
        Ok(max_height)
    }

    /// Typeset the line and drop it.
    pub fn finalize(
        self,
        container: &mut dyn Container,
        last_line: bool,
    ) -> Result<f32, ContainerExhausted> {
        self.typeset(container, last_line)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::hyphenate::NoHyphenation;
    use crate::item::BoxRender;
    use crate::line::LineRules;
    use crate::style::SoftHyphenPolicy;
    use crate::tab_stops::TabStop;
    use crate::test_support::{fixed_style, RecordingContainer};

    fn rules(justify: Justify, stops: &[TabStop]) -> LineRules {
        LineRules {
            tab_stops: heapless::Vec::from_slice(stops).unwrap_or_default(),
            hyphenator: Arc::new(NoHyphenation),
            soft_hyphens: SoftHyphenPolicy::Discretionary,
            justify,
        }
    }

    fn line_of(words: &[&str], width: f32, justify: Justify) -> Line {
        let mut line = Line::new(width, 0.0, rules(justify, &[]));
        for (idx, word) in words.iter().enumerate() {
            if idx > 0 {
                assert!(line.append(Item::Space(Space::new(fixed_style(10.0)))).is_fits());
            }
            assert!(line.append(Item::Text(TextRun::new(word, fixed_style(10.0)))).is_fits());
        }
        line
    }

    #[test]
    fn justified_line_spans_full_width() {
        let line = line_of(&["ab", "cd", "ef"], 100.0, Justify::Both);
        let mut page = RecordingContainer::new(100.0, 100.0);
        let height = line.typeset(&mut page, false).expect("fits");
        assert_eq!(height, 10.0);
        assert_eq!(page.runs.len(), 1);
        let run = &page.runs[0];
        assert_eq!(run.text, "ab cd ef");
        assert!((run.x + run.width() - 100.0).abs() < 1e-3);
        assert_eq!(run.y, 10.0);
    }

    #[test]
    fn last_line_of_justified_paragraph_stays_left() {
        let line = line_of(&["ab", "cd"], 100.0, Justify::Both);
        let mut page = RecordingContainer::new(100.0, 100.0);
        line.typeset(&mut page, true).expect("fits");
        assert!((page.runs[0].width() - 45.0).abs() < 1e-3);
    }

    #[test]
    fn typesetting_twice_is_idempotent() {
        let line = line_of(&["ab", "cd", "ef"], 100.0, Justify::Both);
        let mut first = RecordingContainer::new(100.0, 100.0);
        let mut second = RecordingContainer::new(100.0, 100.0);
        line.typeset(&mut first, false).expect("fits");
        line.typeset(&mut second, false).expect("fits");
        assert_eq!(first.runs, second.runs);
    }

    #[test]
    fn trailing_spaces_are_stripped_before_alignment() {
        let mut line = line_of(&["abc"], 100.0, Justify::Right);
        assert!(line.append(Item::Space(Space::new(fixed_style(10.0)))).is_fits());
        let mut page = RecordingContainer::new(100.0, 100.0);
        line.typeset(&mut page, false).expect("fits");
        assert_eq!(page.runs[0].text, "abc");
        assert_eq!(page.runs[0].x, 70.0);
    }

    #[test]
    fn centered_line_splits_extra_space() {
        let line = line_of(&["abcd"], 100.0, Justify::Center);
        let mut page = RecordingContainer::new(100.0, 100.0);
        line.typeset(&mut page, false).expect("fits");
        assert_eq!(page.runs[0].x, 30.0);
    }

    #[test]
    fn right_tab_right_aligns_following_text() {
        let mut line = Line::new(200.0, 0.0, rules(Justify::Both, &[TabStop::right(150.0)]));
        let style = fixed_style(10.0);
        assert!(line.append(Item::Text(TextRun::new("ab", style.clone()))).is_fits());
        assert!(line.append(Item::Tab(Tab::new(style.clone()))).is_fits());
        assert!(line.append(Item::Text(TextRun::new("END", style))).is_fits());
        let mut page = RecordingContainer::new(200.0, 100.0);
        line.typeset(&mut page, false).expect("fits");
        let run = &page.runs[0];
        // cursor 20, filler 150 - 20 - 30, so "END" ends exactly at the stop
        assert!((run.advances[2] - 100.0).abs() < 1e-3);
        assert!((run.x + run.width() - 150.0).abs() < 1e-3);
    }

    #[test]
    fn fill_tab_draws_leader_characters() {
        let stop = TabStop::right(100.0).with_fill('.');
        let mut line = Line::new(200.0, 0.0, rules(Justify::Left, &[stop]));
        let style = fixed_style(10.0);
        assert!(line.append(Item::Text(TextRun::new("a", style.clone()))).is_fits());
        assert!(line.append(Item::Tab(Tab::new(style.clone()))).is_fits());
        assert!(line.append(Item::Text(TextRun::new("9", style))).is_fits());
        let mut page = RecordingContainer::new(200.0, 100.0);
        line.typeset(&mut page, true).expect("fits");
        // tab spans 80: no remainder blank width and eight leader dots
        assert_eq!(page.runs[0].text, "a ........9");
        assert!((page.runs[0].width() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn style_changes_split_glyph_runs() {
        let mut line = Line::new(200.0, 0.0, rules(Justify::Left, &[]));
        let raised = fixed_style(10.0).with_y_offset(3.0);
        assert!(line.append(Item::Text(TextRun::new("ab", fixed_style(10.0)))).is_fits());
        assert!(line.append(Item::Text(TextRun::new("2", raised))).is_fits());
        let mut page = RecordingContainer::new(200.0, 100.0);
        line.typeset(&mut page, true).expect("fits");
        assert_eq!(page.runs.len(), 2);
        assert_eq!(page.runs[1].x, 20.0);
        assert_eq!(page.runs[1].y, 7.0);
    }

    struct Marker;

    impl BoxRender for Marker {
        fn render(&self, container: &mut dyn Container, x: f32, baseline: f32) -> f32 {
            container.draw_rect(crate::container::Rect {
                x,
                y: baseline - 12.0,
                width: 8.0,
                height: 12.0,
                fill: true,
            });
            8.0
        }
    }

    #[test]
    fn inline_box_flushes_pending_glyphs_and_sets_line_height() {
        let mut line = Line::new(200.0, 0.0, rules(Justify::Left, &[]));
        let style = fixed_style(10.0);
        assert!(line.append(Item::Text(TextRun::new("ab", style.clone()))).is_fits());
        assert!(line
            .append(Item::Box(crate::item::InlineBox::new(8.0, 12.0, Arc::new(Marker))))
            .is_fits());
        assert!(line.append(Item::Text(TextRun::new("cd", style))).is_fits());
        let mut page = RecordingContainer::new(200.0, 100.0);
        let height = line.typeset(&mut page, true).expect("fits");
        assert_eq!(height, 12.0);
        assert_eq!(page.runs.len(), 2);
        assert_eq!(page.rects[0].x, 20.0);
        assert_eq!(page.runs[1].x, 28.0);
    }

    #[test]
    fn exhausted_container_reports_without_drawing() {
        let line = line_of(&["ab"], 100.0, Justify::Left);
        let mut page = RecordingContainer::new(100.0, 5.0);
        let err = line.typeset(&mut page, true).expect_err("too short");
        assert_eq!(err.requested, 10.0);
        assert!(page.runs.is_empty());
    }

    #[test]
    fn empty_line_draws_nothing() {
        let line = Line::new(100.0, 0.0, rules(Justify::Left, &[]));
        let mut page = RecordingContainer::new(100.0, 100.0);
        assert_eq!(line.typeset(&mut page, true).expect("empty"), 0.0);
        assert_eq!(page.cursor(), 0.0);
    }
}
