//! Similarity analysis over processed document records.
//!
//! Consumes the [`DocumentRecord`](paperlens_core::DocumentRecord)s produced
//! by batch processing and derives collection-level insight: pairwise
//! keyword-overlap similarity, agglomerative clusters of related documents,
//! and aggregate reports. Everything here is pure computation over records
//! already in memory; no model or source access happens in this crate.

pub mod cluster;
pub mod report;
pub mod similarity;

// Re-export for convenience
pub use cluster::{Cluster, ClusterAssignment, cluster, cluster_with};
pub use report::{
    AverageStats, CollectionReport, SimilarPair, build_report, cluster_themes, find_similar,
};
pub use similarity::{SimilarityMatrix, SimilarityMetric, compare, compare_with};

/// Similarity at or above this value marks two documents as related.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;
