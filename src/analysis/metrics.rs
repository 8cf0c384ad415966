//! Per-document text metrics: sentiment, readability and histograms.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)?").unwrap());
static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Polarity lexicon, scores in `[-1, 1]`.
static LEXICON: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    [
        ("excellent", 1.0),
        ("outstanding", 0.9),
        ("exceptional", 0.8),
        ("amazing", 0.8),
        ("wonderful", 0.9),
        ("great", 0.8),
        ("best", 1.0),
        ("generous", 0.6),
        ("good", 0.7),
        ("strong", 0.4),
        ("positive", 0.3),
        ("successful", 0.7),
        ("exciting", 0.6),
        ("happy", 0.8),
        ("proud", 0.8),
        ("valuable", 0.5),
        ("helpful", 0.5),
        ("supportive", 0.5),
        ("inspiring", 0.6),
        ("talented", 0.7),
        ("dedicated", 0.5),
        ("passionate", 0.5),
        ("deserving", 0.5),
        ("prestigious", 0.6),
        ("unique", 0.4),
        ("special", 0.4),
        ("interesting", 0.5),
        ("important", 0.4),
        ("significant", 0.4),
        ("new", 0.1),
        ("high", 0.2),
        ("bad", -0.7),
        ("poor", -0.4),
        ("difficult", -0.5),
        ("hard", -0.3),
        ("negative", -0.3),
        ("unfortunate", -0.5),
        ("sad", -0.5),
        ("terrible", -1.0),
        ("worst", -1.0),
        ("wrong", -0.5),
        ("limited", -0.1),
        ("ineligible", -0.4),
        ("late", -0.3),
        ("incomplete", -0.3),
        ("disadvantaged", -0.4),
        ("hardship", -0.4),
        ("struggling", -0.4),
        ("unable", -0.5),
        ("low", -0.2),
    ]
    .into_iter()
    .collect()
});

const NEGATORS: &[&str] = &["not", "no", "never", "nor", "neither", "without", "n't"];
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("really", 1.2),
    ("truly", 1.2),
];

/// Lexicon-based polarity in `[-1, 1]`; `0.0` when no scored word occurs.
///
/// A negator directly before a scored word (or before its intensifier)
/// flips it and halves it; an intensifier multiplies it.
pub fn sentiment_polarity(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = WORD_RE.find_iter(&lowered).map(|m| m.as_str()).collect();

    let mut scores = Vec::new();
    for (i, word) in words.iter().enumerate() {
        let Some(&base) = LEXICON.get(word) else {
            continue;
        };
        let mut score = base;
        let mut j = i;
        if let Some(prev) = i.checked_sub(1).map(|p| words[p]) {
            if let Some(&(_, factor)) = INTENSIFIERS.iter().find(|(w, _)| *w == prev) {
                score *= factor;
                j = i - 1;
            }
        }
        if let Some(prev) = j.checked_sub(1).map(|p| words[p]) {
            if NEGATORS.contains(&prev) || prev.ends_with("n't") {
                score *= -0.5;
            }
        }
        scores.push(score.clamp(-1.0, 1.0));
    }

    if scores.is_empty() {
        return 0.0;
    }
    (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
}

/// Readability scores for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Readability {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    /// `0.0` for texts with fewer than three sentences.
    pub smog_index: f64,
}

/// Counts the readability formulas are built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCounts {
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
    pub polysyllables: usize,
}

pub fn text_counts(text: &str) -> TextCounts {
    let words: Vec<&str> = WORD_RE.find_iter(text).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return TextCounts::default();
    }
    let sentences = SENTENCE_END_RE
        .split(text)
        .filter(|s| WORD_RE.is_match(s))
        .count()
        .max(1);
    let mut syllables = 0;
    let mut polysyllables = 0;
    for w in &words {
        let s = count_syllables(w);
        syllables += s;
        if s >= 3 {
            polysyllables += 1;
        }
    }
    TextCounts {
        words: words.len(),
        sentences,
        syllables,
        polysyllables,
    }
}

/// Flesch reading ease, Flesch–Kincaid grade and SMOG index.
pub fn readability(text: &str) -> Readability {
    let c = text_counts(text);
    if c.words == 0 {
        return Readability::default();
    }
    let words_per_sentence = c.words as f64 / c.sentences as f64;
    let syllables_per_word = c.syllables as f64 / c.words as f64;
    let smog_index = if c.sentences < 3 {
        0.0
    } else {
        1.043 * (c.polysyllables as f64 * 30.0 / c.sentences as f64).sqrt() + 3.1291
    };
    Readability {
        flesch_reading_ease: 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
        flesch_kincaid_grade: 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
        smog_index,
    }
}

/// Vowel-group syllable estimate; never less than 1 for a word.
pub fn count_syllables(word: &str) -> usize {
    let w: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    if w.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &w {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }

    // Silent trailing "e", but not "-le" after a consonant ("table").
    let n = w.len();
    if n > 2 && w[n - 1] == 'e' && !is_vowel(w[n - 2]) {
        let consonant_le = w[n - 2] == 'l' && !is_vowel(w[n - 3]);
        if !consonant_le {
            count -= 1;
        }
    }
    count.max(1)
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Bin `values` into `bins` equal-width bins over their range (last bin
/// closed). An empty input spans `[0, 1]`; a constant one spans
/// `[v - 0.5, v + 0.5]`. Non-finite values are ignored.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

    let (mut lo, mut hi) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if finite.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        (lo, hi) = (lo - 0.5, hi + 0.5);
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram { edges, counts }
}
