//! Weighted keyword-overlap similarity between document records.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use paperlens_core::{DocumentRecord, ErrorInfo, ErrorKind, Status};

/// Normalize a keyword phrase for weighted-set keying.
///
/// NFKD decomposition, strip to ASCII, keep only alphanumerics, lowercase.
/// `"Neural-Networks"` and `"neural networks"` key identically.
pub fn normalize_phrase(phrase: &str) -> String {
    let normalized: String = phrase.nfkd().filter(|c| c.is_ascii()).collect();

    static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());
    NON_ALNUM.replace_all(&normalized, "").to_lowercase()
}

/// Similarity formula applied to two weighted keyword sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimilarityMetric {
    /// `Σ min(wa, wb) / Σ max(wa, wb)` over the union of phrases.
    #[default]
    WeightedJaccard,
    /// `Σ wa·wb / (‖a‖·‖b‖)` over the intersection of phrases.
    Cosine,
}

impl SimilarityMetric {
    /// Parse a config-file metric name. Unknown names fall back to the
    /// default metric.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "cosine" => Self::Cosine,
            _ => Self::WeightedJaccard,
        }
    }
}

/// Whether a record carries enough signal to compare.
pub(crate) fn eligible(record: &DocumentRecord) -> bool {
    matches!(record.status, Status::Success | Status::PartialFailure)
        && !record.keywords.is_empty()
}

fn exclusion_reason(record: &DocumentRecord) -> ErrorInfo {
    let message = if record.status == Status::Failed {
        "document failed processing".to_string()
    } else {
        "no keywords available".to_string()
    };
    ErrorInfo {
        kind: ErrorKind::InsufficientData,
        message,
    }
}

/// Build the weighted phrase set for one record. Duplicate phrases keep the
/// higher score.
fn weighted_set(record: &DocumentRecord) -> BTreeMap<String, f64> {
    let mut weights = BTreeMap::new();
    for keyword in &record.keywords {
        let key = normalize_phrase(&keyword.phrase);
        if key.is_empty() {
            continue;
        }
        let entry = weights.entry(key).or_insert(keyword.score);
        if keyword.score > *entry {
            *entry = keyword.score;
        }
    }
    weights
}

fn score_sets(
    metric: SimilarityMetric,
    a: &BTreeMap<String, f64>,
    b: &BTreeMap<String, f64>,
) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    match metric {
        SimilarityMetric::WeightedJaccard => {
            let mut min_sum = 0.0;
            let mut max_sum = 0.0;
            for (key, wa) in a {
                match b.get(key) {
                    Some(wb) => {
                        min_sum += wa.min(*wb);
                        max_sum += wa.max(*wb);
                    }
                    None => max_sum += wa,
                }
            }
            for (key, wb) in b {
                if !a.contains_key(key) {
                    max_sum += wb;
                }
            }
            if max_sum > 0.0 { min_sum / max_sum } else { 0.0 }
        }
        SimilarityMetric::Cosine => {
            let mut dot = 0.0;
            for (key, wa) in a {
                if let Some(wb) = b.get(key) {
                    dot += wa * wb;
                }
            }
            let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
            let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm_a > 0.0 && norm_b > 0.0 {
                dot / (norm_a * norm_b)
            } else {
                0.0
            }
        }
    }
}

/// Pairwise similarity scores for the comparable subset of a record set.
///
/// Only records with a usable status and at least one keyword participate;
/// everything else lands in [`insufficient`](SimilarityMatrix::insufficient).
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    /// Source ids of compared records, in input order.
    pub ids: Vec<String>,
    /// Source ids excluded from comparison, with the reason, in input order.
    pub insufficient: Vec<(String, ErrorInfo)>,
    /// Upper-triangular pair scores, row-major.
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Number of compared documents.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Similarity between documents `a` and `b` by compared index.
    /// A document always scores 1.0 against itself.
    pub fn score(&self, a: usize, b: usize) -> f64 {
        if a == b {
            return 1.0;
        }
        let (i, j) = if a < b { (a, b) } else { (b, a) };
        let n = self.ids.len();
        self.scores[i * (n - 1) - (i * i - i) / 2 + (j - i - 1)]
    }
}

/// Compare all comparable records pairwise with the default metric.
///
/// Scores are symmetric and lie in `[0, 1]` for the non-negative keyword
/// scores the gateway produces. Each unordered pair is computed once.
pub fn compare(records: &[DocumentRecord]) -> SimilarityMatrix {
    compare_with(SimilarityMetric::default(), records)
}

/// Compare all comparable records pairwise with an explicit metric.
pub fn compare_with(metric: SimilarityMetric, records: &[DocumentRecord]) -> SimilarityMatrix {
    let mut ids = Vec::new();
    let mut sets = Vec::new();
    let mut insufficient = Vec::new();

    for record in records {
        if eligible(record) {
            ids.push(record.source_id.clone());
            sets.push(weighted_set(record));
        } else {
            insufficient.push((record.source_id.clone(), exclusion_reason(record)));
        }
    }

    let n = ids.len();
    let mut scores = Vec::with_capacity(n.saturating_sub(1) * n / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            scores.push(score_sets(metric, &sets[i], &sets[j]));
        }
    }

    SimilarityMatrix {
        ids,
        insufficient,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_core::{InferredMetadata, Keyword};

    fn record(id: &str, keywords: &[(&str, f64)]) -> DocumentRecord {
        DocumentRecord {
            source_id: id.to_string(),
            raw_text: String::new(),
            cleaned_text: "body text".to_string(),
            metadata: InferredMetadata::default(),
            summary: Some("a summary".to_string()),
            keywords: keywords
                .iter()
                .map(|(phrase, score)| Keyword::new(*phrase, *score))
                .collect(),
            stats: None,
            status: Status::Success,
            error: None,
        }
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_phrase("Neural-Networks"), "neuralnetworks");
        assert_eq!(normalize_phrase("neural networks"), "neuralnetworks");
        assert_eq!(normalize_phrase("naïve Bayes"), "naivebayes");
        assert_eq!(normalize_phrase("@@@"), "");
    }

    #[test]
    fn test_metric_parses_from_name() {
        assert_eq!(SimilarityMetric::from_name("cosine"), SimilarityMetric::Cosine);
        assert_eq!(SimilarityMetric::from_name("Cosine"), SimilarityMetric::Cosine);
        assert_eq!(
            SimilarityMetric::from_name("weighted_jaccard"),
            SimilarityMetric::WeightedJaccard
        );
        assert_eq!(
            SimilarityMetric::from_name("anything else"),
            SimilarityMetric::WeightedJaccard
        );
    }

    #[test]
    fn test_identical_sets_score_one() {
        let records = vec![
            record("a", &[("transformers", 0.9), ("attention", 0.5)]),
            record("b", &[("transformers", 0.9), ("attention", 0.5)]),
        ];
        let jaccard = compare(&records);
        assert_eq!(jaccard.score(0, 1), 1.0);

        let cosine = compare_with(SimilarityMetric::Cosine, &records);
        assert!((cosine.score(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_sets_score_zero() {
        let records = vec![
            record("a", &[("graphs", 0.8)]),
            record("b", &[("membranes", 0.7)]),
        ];
        let matrix = compare(&records);
        assert_eq!(matrix.score(0, 1), 0.0);
        let cosine = compare_with(SimilarityMetric::Cosine, &records);
        assert_eq!(cosine.score(0, 1), 0.0);
    }

    #[test]
    fn test_jaccard_weights_partial_overlap() {
        // min/max sums: shared phrase 0.5 vs 1.0 -> 0.5 / 1.0
        let records = vec![
            record("a", &[("retrieval", 1.0)]),
            record("b", &[("retrieval", 0.5)]),
        ];
        let matrix = compare(&records);
        assert_eq!(matrix.score(0, 1), 0.5);
    }

    #[test]
    fn test_cosine_matches_hand_computation() {
        // a = (3, 4), b = (3, 0): dot 9, norms 5 and 3 -> 0.6
        let records = vec![
            record("a", &[("alpha decay", 3.0), ("beta decay", 4.0)]),
            record("b", &[("alpha decay", 3.0)]),
        ];
        let matrix = compare_with(SimilarityMetric::Cosine, &records);
        assert!((matrix.score(0, 1) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_scores_are_symmetric() {
        let records = vec![
            record("a", &[("kernels", 0.9), ("margins", 0.4)]),
            record("b", &[("kernels", 0.2), ("pooling", 0.6)]),
        ];
        let matrix = compare(&records);
        assert_eq!(matrix.score(0, 1), matrix.score(1, 0));
        assert_eq!(matrix.score(0, 0), 1.0);
    }

    #[test]
    fn test_duplicate_phrases_keep_higher_score() {
        let records = vec![
            record("a", &[("Sparse Coding", 0.2), ("sparse coding", 0.8)]),
            record("b", &[("sparse coding", 0.8)]),
        ];
        let matrix = compare(&records);
        assert_eq!(matrix.score(0, 1), 1.0);
    }

    #[test]
    fn test_unusable_records_are_reported_not_dropped_silently() {
        let mut failed = record("bad", &[("anything", 0.5)]);
        failed.status = Status::Failed;
        let keywordless = record("empty", &[]);
        let good = record("good", &[("topology", 0.9)]);

        let matrix = compare(&[failed, keywordless, good]);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.ids, vec!["good".to_string()]);
        assert_eq!(matrix.insufficient.len(), 2);
        assert_eq!(matrix.insufficient[0].0, "bad");
        assert_eq!(matrix.insufficient[1].0, "empty");
        for (_, reason) in &matrix.insufficient {
            assert_eq!(reason.kind, ErrorKind::InsufficientData);
        }
    }
}
