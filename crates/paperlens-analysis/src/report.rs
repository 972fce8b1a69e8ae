//! Collection-level reporting: similar pairs, frequency tables, themes.

use std::collections::{BTreeMap, BTreeSet};

use paperlens_core::{DocumentRecord, DocumentStats};
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterAssignment;
use crate::similarity::{self, SimilarityMetric, normalize_phrase};

const KEYWORD_LIMIT: usize = 20;
const AUTHOR_LIMIT: usize = 10;
const THEME_LIMIT: usize = 5;

// ── Similar pairs ────────────────────────────────────────────────────────────

/// A pair of documents whose similarity reached the reporting threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    pub source_a: String,
    pub source_b: String,
    pub score: f64,
    /// Phrases both documents carry, spelled as the first document spells
    /// them, alphabetical.
    pub shared_keywords: Vec<String>,
}

/// All pairs scoring at or above `threshold`, most similar first.
///
/// Equal scores order by source id so repeated runs produce the same list.
pub fn find_similar(records: &[DocumentRecord], threshold: f64) -> Vec<SimilarPair> {
    find_similar_with(SimilarityMetric::default(), records, threshold)
}

/// [`find_similar`] with an explicit similarity metric.
pub fn find_similar_with(
    metric: SimilarityMetric,
    records: &[DocumentRecord],
    threshold: f64,
) -> Vec<SimilarPair> {
    let matrix = similarity::compare_with(metric, records);
    let eligible: Vec<&DocumentRecord> = records
        .iter()
        .filter(|record| similarity::eligible(record))
        .collect();

    let mut pairs = Vec::new();
    for i in 0..matrix.len() {
        for j in (i + 1)..matrix.len() {
            let score = matrix.score(i, j);
            if score < threshold {
                continue;
            }
            pairs.push(SimilarPair {
                source_a: matrix.ids[i].clone(),
                source_b: matrix.ids[j].clone(),
                score,
                shared_keywords: shared_keywords(eligible[i], eligible[j]),
            });
        }
    }

    pairs.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.source_a.cmp(&b.source_a))
            .then_with(|| a.source_b.cmp(&b.source_b))
    });
    pairs
}

fn shared_keywords(a: &DocumentRecord, b: &DocumentRecord) -> Vec<String> {
    let b_keys: BTreeSet<String> = b
        .keywords
        .iter()
        .map(|k| normalize_phrase(&k.phrase))
        .filter(|key| !key.is_empty())
        .collect();

    let mut seen = BTreeSet::new();
    let mut shared: Vec<String> = a
        .keywords
        .iter()
        .filter_map(|k| {
            let key = normalize_phrase(&k.phrase);
            if !key.is_empty() && b_keys.contains(&key) && seen.insert(key) {
                Some(k.phrase.clone())
            } else {
                None
            }
        })
        .collect();
    shared.sort();
    shared
}

// ── Collection report ────────────────────────────────────────────────────────

/// Aggregate view of one processed collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub total_documents: usize,
    /// Documents usable for similarity analysis.
    pub analyzed_documents: usize,
    /// Most frequent keyword phrases, highest count first.
    pub keyword_frequency: Vec<(String, usize)>,
    /// Most frequently credited authors, highest count first.
    pub top_authors: Vec<(String, usize)>,
    /// Mean statistics over the documents that produced them.
    pub average_stats: Option<AverageStats>,
}

/// Collection-wide means of the per-document statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageStats {
    pub character_count: f64,
    pub word_count: f64,
    pub sentence_count: f64,
    pub compression_ratio: f64,
}

/// Summarize a batch: frequency tables plus mean text statistics.
pub fn build_report(records: &[DocumentRecord]) -> CollectionReport {
    let mut keyword_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut author_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for keyword in &record.keywords {
            *keyword_counts.entry(keyword.phrase.as_str()).or_insert(0) += 1;
        }
        for author in &record.metadata.authors {
            *author_counts.entry(author.as_str()).or_insert(0) += 1;
        }
    }

    let with_stats: Vec<&DocumentStats> = records
        .iter()
        .filter_map(|record| record.stats.as_ref())
        .collect();
    let average_stats = if with_stats.is_empty() {
        None
    } else {
        let n = with_stats.len() as f64;
        Some(AverageStats {
            character_count: mean(&with_stats, |s| s.character_count as f64, n),
            word_count: mean(&with_stats, |s| s.word_count as f64, n),
            sentence_count: mean(&with_stats, |s| s.sentence_count as f64, n),
            compression_ratio: mean(&with_stats, |s| s.compression_ratio, n),
        })
    };

    CollectionReport {
        total_documents: records.len(),
        analyzed_documents: records
            .iter()
            .filter(|record| similarity::eligible(record))
            .count(),
        keyword_frequency: top_counts(keyword_counts, KEYWORD_LIMIT),
        top_authors: top_counts(author_counts, AUTHOR_LIMIT),
        average_stats,
    }
}

fn mean(stats: &[&DocumentStats], field: impl Fn(&DocumentStats) -> f64, n: f64) -> f64 {
    stats.iter().map(|s| field(s)).sum::<f64>() / n
}

/// Highest counts first; equal counts fall back to alphabetical order.
fn top_counts(counts: BTreeMap<&str, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);
    entries
}

// ── Cluster themes ───────────────────────────────────────────────────────────

/// The phrases each cluster's members share, most common first.
///
/// A phrase counts once per document and must appear in at least two member
/// documents to qualify. Singleton clusters have no shared vocabulary.
pub fn cluster_themes(
    assignment: &ClusterAssignment,
    records: &[DocumentRecord],
) -> BTreeMap<usize, Vec<String>> {
    let by_id: BTreeMap<&str, &DocumentRecord> = records
        .iter()
        .map(|record| (record.source_id.as_str(), record))
        .collect();

    let mut themes = BTreeMap::new();
    for cluster in &assignment.clusters {
        if cluster.members.len() < 2 {
            themes.insert(cluster.label, Vec::new());
            continue;
        }

        // Document frequency per normalized phrase, remembering the first
        // spelling encountered.
        let mut counts: BTreeMap<String, (String, usize)> = BTreeMap::new();
        for member in &cluster.members {
            let record = match by_id.get(member.as_str()) {
                Some(record) => record,
                None => continue,
            };
            let mut seen = BTreeSet::new();
            for keyword in &record.keywords {
                let key = normalize_phrase(&keyword.phrase);
                if key.is_empty() || !seen.insert(key.clone()) {
                    continue;
                }
                let entry = counts
                    .entry(key)
                    .or_insert_with(|| (keyword.phrase.clone(), 0));
                entry.1 += 1;
            }
        }

        let mut shared: Vec<(String, usize)> = counts
            .into_values()
            .filter(|(_, count)| *count >= 2)
            .collect();
        shared.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        shared.truncate(THEME_LIMIT);
        themes.insert(
            cluster.label,
            shared.into_iter().map(|(phrase, _)| phrase).collect(),
        );
    }
    themes
}
