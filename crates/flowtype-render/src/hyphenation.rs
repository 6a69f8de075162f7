use flowtype::Hyphenator;

/// Rule-of-thumb English hyphenation.
///
/// Splits at vowel/consonant transitions and before common suffixes, keeping
/// at least [`min_prefix`](Self::min_prefix) characters on each side. Words
/// shorter than [`min_word`](Self::min_word) are never split. A small
/// exception table overrides the rules for words they get visibly wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnglishHyphenator {
    pub min_word: usize,
    pub min_prefix: usize,
}

impl Default for EnglishHyphenator {
    fn default() -> Self {
        Self {
            min_word: 7,
            min_prefix: 3,
        }
    }
}

const SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "less", "able", "ible", "ally", "ingly", "edly", "ing", "ed",
    "ly",
];

fn exception(lower: &str) -> Option<&'static [usize]> {
    match lower {
        "characteristically" => Some(&[4, 6, 9, 12]),
        "accessibility" => Some(&[3, 6, 9]),
        "fundamental" => Some(&[3, 6]),
        "functionality" => Some(&[4, 7, 10]),
        "publication" => Some(&[3, 6]),
        "paragraph" => Some(&[4]),
        "paragraphs" => Some(&[4]),
        "typesetting" => Some(&[4, 7]),
        "hyphenation" => Some(&[3, 6]),
        "justification" => Some(&[3, 6, 9]),
        "extraordinary" => Some(&[5, 8]),
        "responsibility" => Some(&[3, 6, 9]),
        "determined" => Some(&[3, 6]),
        "language" => Some(&[3]),
        _ => None,
    }
}

fn is_vowel(ch: char) -> bool {
    matches!(ch.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

impl Hyphenator for EnglishHyphenator {
    fn hyphenation_points(&self, word: &str) -> Vec<usize> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < self.min_word.max(2 * self.min_prefix) {
            return Vec::with_capacity(0);
        }
        let lower = word.to_ascii_lowercase();
        if let Some(points) = exception(&lower) {
            return points.to_vec();
        }

        // both fragments keep at least one character
        let lo = self.min_prefix.max(1);
        let hi = chars.len().saturating_sub(lo);
        if lo > hi {
            return Vec::with_capacity(0);
        }
        let mut points = Vec::with_capacity(chars.len() / 2);
        for i in lo..=hi {
            let prev = chars[i - 1];
            let next = chars[i];
            if !prev.is_ascii_alphabetic() || !next.is_ascii_alphabetic() {
                continue;
            }
            if is_vowel(prev) != is_vowel(next) {
                points.push(i);
            }
        }
        for suffix in SUFFIXES {
            if lower.ends_with(suffix) {
                let split = chars.len() - suffix.chars().count();
                if split >= lo && split <= hi {
                    points.push(split);
                }
            }
        }
        points.sort_unstable();
        points.dedup();
        points
    }
}
