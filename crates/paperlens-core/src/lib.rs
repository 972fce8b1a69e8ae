use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod config_file;
pub mod coordinator;
pub mod gateway;
pub mod pipeline;
pub mod pool;
pub mod stats;

// Re-export for convenience
pub use gateway::{GatewayError, ModelGateway};
pub use paperlens_extract::{
    ExtractError, Inference, InferredMetadata, SpanSource, StaticSpans, StructuralInferer, TextSpan,
};
pub use stats::DocumentStats;

/// A ranked keyword phrase with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub phrase: String,
    pub score: f64,
}

impl Keyword {
    pub fn new(phrase: impl Into<String>, score: f64) -> Self {
        Self {
            phrase: phrase.into(),
            score,
        }
    }
}

/// Terminal processing status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Inference and both model calls succeeded.
    Success,
    /// Inference succeeded but at least one model call failed.
    PartialFailure,
    /// The document could not be read or yielded no text.
    Failed,
}

/// Classification of a per-document failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SourceUnreadable,
    ExtractionEmpty,
    ModelUnavailable,
    ModelTimeout,
    InsufficientData,
}

/// A captured failure attached to a record rather than raised to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ExtractError> for ErrorInfo {
    fn from(err: &ExtractError) -> Self {
        let kind = match err {
            ExtractError::SourceUnreadable(_) => ErrorKind::SourceUnreadable,
            ExtractError::ExtractionEmpty => ErrorKind::ExtractionEmpty,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<&GatewayError> for ErrorInfo {
    fn from(err: &GatewayError) -> Self {
        let kind = match err {
            GatewayError::Unavailable(_) => ErrorKind::ModelUnavailable,
            GatewayError::Timeout => ErrorKind::ModelTimeout,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// The per-document result of a processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub source_id: String,
    pub raw_text: String,
    pub cleaned_text: String,
    pub metadata: InferredMetadata,
    pub summary: Option<String>,
    pub keywords: Vec<Keyword>,
    pub stats: Option<DocumentStats>,
    pub status: Status,
    pub error: Option<ErrorInfo>,
}

/// Summary statistics for a complete batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// The result of processing a collection of documents.
///
/// `records` preserves the input order of the sources that reached a
/// terminal status. `failures` maps every source whose record carries an
/// error (`Failed` or `PartialFailure`) to that error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub records: Vec<DocumentRecord>,
    pub failures: BTreeMap<String, ErrorInfo>,
    pub stats: BatchStats,
}

/// Progress events emitted during batch processing.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        index: usize,
        total: usize,
        source_id: String,
    },
    Completed {
        index: usize,
        total: usize,
        source_id: String,
        status: Status,
    },
}

/// Tunable knobs for document processing.
#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    /// Number of worker tasks processing documents concurrently.
    pub concurrency: usize,
    /// Page cap requested from the span source. Title/author inference
    /// additionally windows itself to the inferer's own page limit, so a
    /// larger cap here only enriches the text sent to the model gateway.
    pub max_pages: usize,
    /// Whitespace-token cap applied to cleaned text before model calls.
    pub token_cap: usize,
    /// Number of keyword phrases requested per document.
    pub top_k: usize,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_pages: 2,
            token_cap: 1024,
            top_k: 15,
        }
    }
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),
    #[error("token cap must be at least 1")]
    InvalidTokenCap,
}

/// Process a single document: span extraction, structural inference, then
/// summary and keyword model calls. Failures are captured in the returned
/// record, never raised.
pub async fn process_one(
    source_id: &str,
    span_source: &dyn SpanSource,
    model_gateway: &dyn ModelGateway,
    options: &ProcessingOptions,
) -> DocumentRecord {
    pipeline::process_document(source_id, span_source, model_gateway, options).await
}

/// Process a collection of documents with bounded concurrency.
///
/// Each document runs its pipeline independently; one document's failure
/// never aborts the batch. Progress events are emitted via the callback.
/// Cancellation stops new dispatches while in-flight documents finish.
/// Only invalid options produce an `Err`.
pub async fn process_batch(
    sources: Vec<String>,
    span_source: Arc<dyn SpanSource>,
    model_gateway: Arc<dyn ModelGateway>,
    options: ProcessingOptions,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
    cancel: CancellationToken,
) -> Result<BatchResult, BatchError> {
    coordinator::process_batch(sources, span_source, model_gateway, options, progress, cancel).await
}
