//! Agglomerative clustering over pairwise document similarity.

use paperlens_core::{DocumentRecord, ErrorInfo};

use crate::similarity::{self, SimilarityMatrix, SimilarityMetric};

/// One cluster of mutually similar documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Dense label, assigned by ascending cluster key (the lexicographically
    /// smallest member id).
    pub label: usize,
    /// Member source ids, in compared-input order.
    pub members: Vec<String>,
    /// The member closest to the cluster centroid: highest average
    /// similarity to the other members, ties broken by id.
    pub representative: String,
}

/// Cluster membership for the comparable records of one invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusterAssignment {
    pub clusters: Vec<Cluster>,
    /// Source ids excluded before clustering, with the reason.
    pub insufficient: Vec<(String, ErrorInfo)>,
}

impl ClusterAssignment {
    /// Dense label for a source id, if it was clustered.
    pub fn label_of(&self, source_id: &str) -> Option<usize> {
        self.clusters
            .iter()
            .find(|c| c.members.iter().any(|m| m == source_id))
            .map(|c| c.label)
    }
}

/// Group records whose average pairwise similarity exceeds `threshold`,
/// using the default metric.
///
/// Starts with one cluster per document and repeatedly merges the best
/// qualifying pair, so the result is deterministic for identical inputs.
/// Empty input yields an empty assignment; a single document forms a
/// cluster representing itself.
pub fn cluster(records: &[DocumentRecord], threshold: f64) -> ClusterAssignment {
    cluster_with(SimilarityMetric::default(), records, threshold)
}

/// Group records with an explicit similarity metric.
pub fn cluster_with(
    metric: SimilarityMetric,
    records: &[DocumentRecord],
    threshold: f64,
) -> ClusterAssignment {
    let matrix = similarity::compare_with(metric, records);
    cluster_matrix(&matrix, threshold)
}

/// Cluster a prebuilt similarity matrix.
pub fn cluster_matrix(matrix: &SimilarityMatrix, threshold: f64) -> ClusterAssignment {
    let mut groups: Vec<Vec<usize>> = (0..matrix.len()).map(|i| vec![i]).collect();

    // Average-linkage agglomeration: merge the highest-scoring qualifying
    // pair until none remains. Ties pick the pair whose ordered key pair is
    // lexicographically smallest.
    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in 0..groups.len() {
            for b in (a + 1)..groups.len() {
                let score = average_linkage(matrix, &groups[a], &groups[b]);
                if score <= threshold {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((best_a, best_b, best_score)) => {
                        score > best_score
                            || (score == best_score
                                && ordered_keys(matrix, &groups, a, b)
                                    < ordered_keys(matrix, &groups, best_a, best_b))
                    }
                };
                if better {
                    best = Some((a, b, score));
                }
            }
        }

        match best {
            Some((a, b, _)) => {
                let merged = groups.remove(b);
                groups[a].extend(merged);
                groups[a].sort_unstable();
            }
            None => break,
        }
    }

    groups.sort_by(|a, b| group_key(matrix, a).cmp(group_key(matrix, b)));

    let clusters = groups
        .into_iter()
        .enumerate()
        .map(|(label, group)| Cluster {
            label,
            members: group.iter().map(|&i| matrix.ids[i].clone()).collect(),
            representative: representative(matrix, &group),
        })
        .collect();

    ClusterAssignment {
        clusters,
        insufficient: matrix.insufficient.clone(),
    }
}

fn average_linkage(matrix: &SimilarityMatrix, a: &[usize], b: &[usize]) -> f64 {
    let mut sum = 0.0;
    for &i in a {
        for &j in b {
            sum += matrix.score(i, j);
        }
    }
    sum / (a.len() * b.len()) as f64
}

/// A group's key is its lexicographically smallest member id.
fn group_key<'a>(matrix: &'a SimilarityMatrix, group: &[usize]) -> &'a str {
    group
        .iter()
        .map(|&i| matrix.ids[i].as_str())
        .min()
        .unwrap_or("")
}

fn ordered_keys<'a>(
    matrix: &'a SimilarityMatrix,
    groups: &[Vec<usize>],
    a: usize,
    b: usize,
) -> (&'a str, &'a str) {
    let key_a = group_key(matrix, &groups[a]);
    let key_b = group_key(matrix, &groups[b]);
    if key_a <= key_b {
        (key_a, key_b)
    } else {
        (key_b, key_a)
    }
}

fn representative(matrix: &SimilarityMatrix, group: &[usize]) -> String {
    if group.len() == 1 {
        return matrix.ids[group[0]].clone();
    }

    let mut best: Option<(&str, f64)> = None;
    for &i in group {
        let average = group
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| matrix.score(i, j))
            .sum::<f64>()
            / (group.len() - 1) as f64;
        let id = matrix.ids[i].as_str();
        let better = match best {
            None => true,
            Some((best_id, best_average)) => {
                average > best_average || (average == best_average && id < best_id)
            }
        };
        if better {
            best = Some((id, average));
        }
    }

    best.map(|(id, _)| id.to_string()).unwrap_or_default()
}
