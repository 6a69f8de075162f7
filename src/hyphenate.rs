//! Hyphenation contract and the lazy split sequence used by the line packer.

use crate::item::TextRun;
use crate::style::SoftHyphenPolicy;

/// Discretionary hyphen; invisible unless the word is broken there.
pub const SOFT_HYPHEN: char = '\u{00AD}';

/// Dictionary or rule based hyphenation lookup.
pub trait Hyphenator: Send + Sync {
    /// Character offsets inside `word` where it may be split.
    ///
    /// Offsets may come in any order and may repeat; out-of-range values are
    /// ignored.
    fn hyphenation_points(&self, word: &str) -> Vec<usize>;
}

/// Hyphenator that never splits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHyphenation;

impl Hyphenator for NoHyphenation {
    fn hyphenation_points(&self, _word: &str) -> Vec<usize> {
        Vec::with_capacity(0)
    }
}

/// Split candidates of one text run, longest first fragment first.
///
/// Fragments are shaped only when the iterator reaches them, so a packer that
/// accepts the first candidate pays for a single split. Build a new one with
/// [`TextRun::hyphenate`] to start over.
pub struct Hyphenations<'a> {
    run: &'a TextRun,
    points: Vec<usize>,
}

impl<'a> Hyphenations<'a> {
    pub(crate) fn new(
        run: &'a TextRun,
        hyphenator: &dyn Hyphenator,
        policy: SoftHyphenPolicy,
    ) -> Self {
        let chars = run.text().chars().count();
        let mut points = hyphenator.hyphenation_points(run.text());
        if policy == SoftHyphenPolicy::Discretionary {
            points.extend_from_slice(run.discretionary_breaks());
        }
        points.retain(|&point| point > 0 && point < chars);
        points.sort_unstable();
        points.dedup();
        Self { run, points }
    }

    /// Remaining candidate offsets, shortest first.
    pub fn points(&self) -> &[usize] {
        &self.points
    }
}

impl Iterator for Hyphenations<'_> {
    type Item = (TextRun, TextRun);

    fn next(&mut self) -> Option<Self::Item> {
        let point = self.points.pop()?;
        Some(self.run.split_at_char(point))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.points.len(), Some(self.points.len()))
    }
}
