use paperlens_extract::{InferredMetadata, SpanSource, StructuralInferer};

use crate::gateway::ModelGateway;
use crate::stats::DocumentStats;
use crate::{DocumentRecord, ErrorInfo, ErrorKind, ProcessingOptions, Status};

/// Truncate text to at most `max_tokens` whitespace-delimited tokens.
///
/// Internal whitespace runs collapse to single spaces, so the output is a
/// space-joined token stream suitable for a model prompt.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

fn failed_record(source_id: &str, error: ErrorInfo) -> DocumentRecord {
    DocumentRecord {
        source_id: source_id.to_string(),
        raw_text: String::new(),
        cleaned_text: String::new(),
        metadata: InferredMetadata::default(),
        summary: None,
        keywords: Vec::new(),
        stats: None,
        status: Status::Failed,
        error: Some(error),
    }
}

/// Run the full pipeline for a single document.
///
/// Every failure mode is folded into the returned record's `status` and
/// `error` fields; the function itself never fails. Span retrieval or
/// extraction problems yield a `Failed` record with model calls skipped.
/// A model call failing after successful extraction yields `PartialFailure`
/// with whatever output was produced.
pub async fn process_document(
    source_id: &str,
    span_source: &dyn SpanSource,
    model_gateway: &dyn ModelGateway,
    options: &ProcessingOptions,
) -> DocumentRecord {
    let spans = match span_source.get_spans(source_id, options.max_pages) {
        Ok(spans) => spans,
        Err(err) => {
            tracing::debug!(source = source_id, error = %err, "span retrieval failed");
            return failed_record(source_id, ErrorInfo::from(&err));
        }
    };

    let inferer = StructuralInferer::new();
    let inference = match inferer.infer(&spans) {
        Ok(inference) => inference,
        Err(err) => {
            tracing::debug!(source = source_id, error = %err, "structural inference failed");
            return failed_record(source_id, ErrorInfo::from(&err));
        }
    };

    if inference.cleaned_text.is_empty() {
        tracing::debug!(source = source_id, "cleaning removed all text");
        return DocumentRecord {
            source_id: source_id.to_string(),
            raw_text: inference.raw_text,
            cleaned_text: String::new(),
            metadata: inference.metadata,
            summary: None,
            keywords: Vec::new(),
            stats: None,
            status: Status::Failed,
            error: Some(ErrorInfo {
                kind: ErrorKind::ExtractionEmpty,
                message: "no text remained after cleaning".to_string(),
            }),
        };
    }

    let model_input = truncate_tokens(&inference.cleaned_text, options.token_cap);
    let mut first_error: Option<ErrorInfo> = None;

    let summary = match model_gateway
        .summarize(&model_input, options.token_cap)
        .await
    {
        Ok(summary) => Some(summary),
        Err(err) => {
            tracing::debug!(source = source_id, error = %err, "summarization failed");
            first_error = Some(ErrorInfo::from(&err));
            None
        }
    };

    // Keyword extraction runs even when summarization failed; the two
    // model stages degrade independently.
    let keywords = match model_gateway
        .extract_keywords(&model_input, options.top_k)
        .await
    {
        Ok(keywords) => keywords,
        Err(err) => {
            tracing::debug!(source = source_id, error = %err, "keyword extraction failed");
            if first_error.is_none() {
                first_error = Some(ErrorInfo::from(&err));
            }
            Vec::new()
        }
    };

    let stats = DocumentStats::from_texts(&inference.cleaned_text, summary.as_deref());
    let status = if first_error.is_some() {
        Status::PartialFailure
    } else {
        Status::Success
    };

    DocumentRecord {
        source_id: source_id.to_string(),
        raw_text: inference.raw_text,
        cleaned_text: inference.cleaned_text,
        metadata: inference.metadata,
        summary,
        keywords,
        stats: Some(stats),
        status,
        error: first_error,
    }
}
