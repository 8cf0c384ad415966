use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use ndarray::Array2;
use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Term-frequency / inverse-document-frequency vectorizer over word n-grams.
///
/// Tokens are runs of two or more word characters. The vocabulary keeps the
/// `max_features` terms with the highest total count across the corpus (ties
/// broken alphabetically) and is then sorted, so column order is stable.
/// IDF is smoothed: `ln((1 + n) / (1 + df)) + 1`. Rows are L2-normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize, ngram_range: (usize, usize)) -> Self {
        let min_n = ngram_range.0.max(1);
        Self {
            max_features,
            ngram_range: (min_n, ngram_range.1.max(min_n)),
            vocabulary: Vec::new(),
            index: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Learn the vocabulary and IDF weights, then vectorize `docs`.
    pub fn fit_transform(&mut self, docs: &[String]) -> Array2<f64> {
        let analyzed: Vec<Vec<String>> = docs.iter().map(|d| self.analyze(d)).collect();

        let mut totals: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let mut seen = std::collections::HashSet::new();
            for term in terms {
                *totals.entry(term.as_str()).or_default() += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.as_str()).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(&str, usize)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let n = docs.len() as f64;
        self.idf = vocabulary
            .iter()
            .map(|t| {
                let df = doc_freq.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        self.vocabulary = vocabulary;

        self.vectorize(&analyzed)
    }

    /// Vectorize `docs` with the fitted vocabulary. Unknown terms are ignored.
    #[cfg(test)]
    pub(crate) fn transform(&self, docs: &[String]) -> Array2<f64> {
        let analyzed: Vec<Vec<String>> = docs.iter().map(|d| self.analyze(d)).collect();
        self.vectorize(&analyzed)
    }

    fn vectorize(&self, analyzed: &[Vec<String>]) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((analyzed.len(), self.vocabulary.len()));
        for (row, terms) in analyzed.iter().enumerate() {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for term in terms {
                if let Some(&col) = self.index.get(term) {
                    *counts.entry(col).or_default() += 1.0;
                }
            }
            for (col, tf) in counts {
                matrix[[row, col]] = tf * self.idf[col];
            }
            let norm = matrix.row(row).mapv(|v| v * v).sum().sqrt();
            if norm > 0.0 {
                matrix.row_mut(row).mapv_inplace(|v| v / norm);
            }
        }
        matrix
    }

    fn analyze(&self, doc: &str) -> Vec<String> {
        let lowered = doc.to_lowercase();
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()).collect();
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vocabulary_includes_bigrams_sorted() {
        let mut v = TfidfVectorizer::new(100, (1, 2));
        v.fit_transform(&docs(&["nursing grant", "grant for nursing"]));
        assert_eq!(
            v.feature_names(),
            &["for", "for nursing", "grant", "grant for", "nursing", "nursing grant"]
        );
    }

    #[test]
    fn single_character_tokens_are_dropped() {
        let mut v = TfidfVectorizer::new(100, (1, 1));
        v.fit_transform(&docs(&["a b cd"]));
        assert_eq!(v.feature_names(), &["cd"]);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let mut v = TfidfVectorizer::new(2, (1, 1));
        v.fit_transform(&docs(&["alpha alpha beta", "alpha gamma gamma", "delta"]));
        assert_eq!(v.feature_names(), &["alpha", "gamma"]);
    }

    #[test]
    fn rows_are_unit_length_and_idf_smoothed() {
        let mut v = TfidfVectorizer::new(100, (1, 1));
        let m = v.fit_transform(&docs(&["common rare", "common", ""]));
        assert_eq!(m.dim(), (3, 2));

        // common: df=2, rare: df=1, n=3
        let idf_common = (4.0f64 / 3.0).ln() + 1.0;
        let idf_rare = 2.0f64.ln() + 1.0;
        assert!((v.idf()[0] - idf_common).abs() < 1e-12);
        assert!((v.idf()[1] - idf_rare).abs() < 1e-12);

        let norm0: f64 = m.row(0).iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm0 - 1.0).abs() < 1e-12);
        assert!(m[[0, 1]] > m[[0, 0]]);
        assert!((m[[1, 0]] - 1.0).abs() < 1e-12);
        assert!(m.row(2).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn transform_ignores_unknown_terms() {
        let mut v = TfidfVectorizer::new(100, (1, 1));
        v.fit_transform(&docs(&["engineering award"]));
        let m = v.transform(&docs(&["unknown words only"]));
        assert!(m.iter().all(|&x| x == 0.0));
    }
}
