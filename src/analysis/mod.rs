//! Corpus analysis over scholarship descriptions.
//!
//! Descriptions are normalized ([`text::preprocess`]), vectorized with TF-IDF,
//! reduced with PCA and clustered with k-means; NMF extracts topics. Each
//! document also gets a diversity/identity keyword score, a sentiment
//! polarity, readability scores and its length. Everything is
//! deterministic: the same records and settings give the same report.

pub mod cluster;
pub mod metrics;
pub mod reduce;
pub mod text;
pub mod tfidf;
pub mod topics;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::scholarship::Scholarship;

use metrics::{Histogram, Readability};
use tfidf::TfidfVectorizer;
use topics::Topic;

const KMEANS_MAX_ITER: usize = 100;

/// Per-document analysis results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAnalysis {
    pub id: String,
    pub title: String,
    pub cluster: usize,
    /// Dominant NMF topic, if the document loads on any.
    pub topic: Option<usize>,
    /// 2-D projection for plotting.
    pub x: f64,
    pub y: f64,
    pub dei_score: usize,
    pub sentiment: f64,
    pub readability: Readability,
    /// Description length in characters.
    pub length: usize,
}

/// A document in the top-scoring list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredScholarship {
    pub id: String,
    pub title: String,
    pub description: String,
    pub dei_score: usize,
}

/// Per-cluster summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    pub mean_dei_score: f64,
    pub mean_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusReport {
    pub documents: Vec<DocumentAnalysis>,
    pub clusters: Vec<ClusterSummary>,
    pub topics: Vec<Topic>,
    pub top_scoring: Vec<ScoredScholarship>,
    pub dei_histogram: Histogram,
    pub sentiment_histogram: Histogram,
    pub length_histogram: Histogram,
    /// Vocabulary size after the feature cap.
    pub features: usize,
    /// Mean squared distance of each document to its k-means centroid.
    pub inertia: f64,
}

impl CorpusReport {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Analyze every record that has a non-empty description.
pub fn analyze_corpus(records: &[Scholarship], config: &AnalysisConfig) -> CorpusReport {
    let corpus: Vec<(&Scholarship, &str)> = records
        .iter()
        .filter_map(|r| {
            r.description()
                .filter(|d| !d.trim().is_empty())
                .map(|d| (r, d))
        })
        .collect();
    info!(
        records = records.len(),
        documents = corpus.len(),
        "analyzing scholarship corpus"
    );

    let processed: Vec<String> = corpus.iter().map(|(_, d)| text::preprocess(d)).collect();
    let mut vectorizer = TfidfVectorizer::new(config.max_features, (1, 2));
    let matrix = vectorizer.fit_transform(&processed);
    debug!(features = vectorizer.feature_names().len(), "tf-idf fitted");

    let dims = config.reduce_dims.max(2);
    let projected = reduce::pca(&matrix, dims);
    let cluster_input = projected
        .slice(ndarray::s![.., ..config.reduce_dims.min(projected.ncols())])
        .to_owned();
    let clustering = cluster::kmeans(&cluster_input, config.clusters, KMEANS_MAX_ITER);

    let (topics, nmf) = topics::nmf_topics(
        &matrix,
        vectorizer.feature_names(),
        config.topics,
        config.top_words,
    );
    let dominant = nmf.dominant_topics();

    let documents: Vec<DocumentAnalysis> = corpus
        .iter()
        .enumerate()
        .map(|(i, (record, description))| DocumentAnalysis {
            id: record.id.clone(),
            title: record.display_title().to_string(),
            cluster: clustering.labels.get(i).copied().unwrap_or(0),
            topic: dominant.get(i).copied().flatten(),
            x: coordinate(&projected, i, 0),
            y: coordinate(&projected, i, 1),
            dei_score: text::keyword_score(description, text::DEI_IDENTITY_KEYWORDS),
            sentiment: metrics::sentiment_polarity(description),
            readability: metrics::readability(description),
            length: description.chars().count(),
        })
        .collect();

    let mut ranked: Vec<usize> = (0..documents.len()).collect();
    ranked.sort_by(|&a, &b| documents[b].dei_score.cmp(&documents[a].dei_score));
    let top_scoring = ranked
        .into_iter()
        .take(config.top_scoring)
        .map(|i| ScoredScholarship {
            id: documents[i].id.clone(),
            title: documents[i].title.clone(),
            description: corpus[i].1.to_string(),
            dei_score: documents[i].dei_score,
        })
        .collect();

    let bins = config.histogram_bins;
    let dei: Vec<f64> = documents.iter().map(|d| d.dei_score as f64).collect();
    let sentiment: Vec<f64> = documents.iter().map(|d| d.sentiment).collect();
    let lengths: Vec<f64> = documents.iter().map(|d| d.length as f64).collect();

    CorpusReport {
        clusters: summarize_clusters(&documents, clustering.centroids.nrows()),
        topics,
        top_scoring,
        dei_histogram: metrics::histogram(&dei, bins),
        sentiment_histogram: metrics::histogram(&sentiment, bins),
        length_histogram: metrics::histogram(&lengths, bins),
        features: vectorizer.feature_names().len(),
        inertia: cluster::inertia(&cluster_input, &clustering),
        documents,
    }
}

fn coordinate(projected: &ndarray::Array2<f64>, row: usize, col: usize) -> f64 {
    projected.get((row, col)).copied().unwrap_or(0.0)
}

fn summarize_clusters(documents: &[DocumentAnalysis], k: usize) -> Vec<ClusterSummary> {
    (0..k)
        .map(|cluster| {
            let members: Vec<&DocumentAnalysis> =
                documents.iter().filter(|d| d.cluster == cluster).collect();
            let size = members.len();
            let mean = |f: &dyn Fn(&DocumentAnalysis) -> f64| {
                if size == 0 {
                    0.0
                } else {
                    members.iter().map(|d| f(d)).sum::<f64>() / size as f64
                }
            };
            ClusterSummary {
                cluster,
                size,
                mean_dei_score: mean(&|d| d.dei_score as f64),
                mean_sentiment: mean(&|d| d.sentiment),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, doc: serde_json::Value) -> Scholarship {
        Scholarship::new(id, doc.as_object().unwrap().clone())
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            clusters: 2,
            topics: 2,
            top_words: 3,
            histogram_bins: 4,
            top_scoring: 2,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn empty_corpus_gives_empty_report() {
        let report = analyze_corpus(&[], &config());
        assert!(report.is_empty());
        assert!(report.topics.is_empty());
        assert!(report.top_scoring.is_empty());
        assert!(report.clusters.is_empty());
        assert_eq!(report.dei_histogram.counts.iter().sum::<usize>(), 0);
        assert_eq!(report.inertia, 0.0);
    }

    #[test]
    fn records_without_description_are_ignored() {
        let records = vec![
            record("a", json!({"title": "A", "description": "Nursing students in Arizona."})),
            record("b", json!({"title": "B"})),
            record("c", json!({"title": "C", "description": "   "})),
        ];
        let report = analyze_corpus(&records, &config());
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].id, "a");
        assert_eq!(report.documents[0].cluster, 0);
    }

    #[test]
    fn scores_and_ranks_documents() {
        let records = vec![
            record("plain", json!({"title": "Plain", "description": "Engineering majors with strong grades."})),
            record("dei", json!({"title": "Equity", "description": "Supports diversity, equity and inclusion for first-generation and low-income students."})),
            record("some", json!({"title": "Some", "description": "Open to veterans of any gender."})),
        ];
        let report = analyze_corpus(&records, &config());
        assert_eq!(report.documents.len(), 3);

        let ids: Vec<&str> = report.top_scoring.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["dei", "some"]);
        assert_eq!(report.top_scoring[0].dei_score, 5);

        let plain = &report.documents[0];
        assert_eq!(plain.dei_score, 0);
        assert!(plain.sentiment > 0.0);
        assert_eq!(plain.length, "Engineering majors with strong grades.".len());

        assert!(report.documents.iter().all(|d| d.cluster < 2));
        assert_eq!(report.clusters.iter().map(|c| c.size).sum::<usize>(), 3);
        assert_eq!(report.dei_histogram.counts.iter().sum::<usize>(), 3);
        assert!(report.features > 0);
        assert!(report.inertia.is_finite() && report.inertia >= 0.0);
    }

    #[test]
    fn analysis_is_deterministic() {
        let records: Vec<Scholarship> = (0..6)
            .map(|i| {
                let description = if i % 2 == 0 {
                    format!("Nursing and health care scholarship number {i}")
                } else {
                    format!("Engineering and computer science award for women {i}")
                };
                record(&format!("r{i}"), json!({"description": description}))
            })
            .collect();
        let a = analyze_corpus(&records, &config());
        let b = analyze_corpus(&records, &config());
        assert_eq!(a, b);
        assert_eq!(a.topics.len(), 2);
    }
}
