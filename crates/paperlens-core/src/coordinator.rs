use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use paperlens_extract::SpanSource;

use crate::gateway::ModelGateway;
use crate::pool::{DocJob, ProcessingPool};
use crate::{
    BatchError, BatchResult, BatchStats, DocumentRecord, ProcessingOptions, ProgressEvent, Status,
};

/// Process a batch of documents through an internal worker pool.
///
/// Submits all sources, collects records via oneshot channels, and restores
/// input order. Progress events are emitted via the callback. Cancellation is
/// supported; per-document failures never abort the batch.
pub async fn process_batch(
    sources: Vec<String>,
    span_source: Arc<dyn SpanSource>,
    model_gateway: Arc<dyn ModelGateway>,
    options: ProcessingOptions,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
    cancel: CancellationToken,
) -> Result<BatchResult, BatchError> {
    if options.concurrency == 0 {
        return Err(BatchError::InvalidConcurrency(options.concurrency));
    }
    if options.token_cap == 0 {
        return Err(BatchError::InvalidTokenCap);
    }

    let total = sources.len();
    if total == 0 {
        return Ok(BatchResult {
            records: vec![],
            failures: BTreeMap::new(),
            stats: BatchStats::default(),
        });
    }

    let start = Instant::now();
    let num_workers = options.concurrency.min(total);
    let progress = Arc::new(progress);

    // Create the pool
    let pool = ProcessingPool::new(
        span_source,
        model_gateway,
        options,
        cancel.clone(),
        num_workers,
    );

    // Submit all documents and collect oneshot receivers
    let mut receivers = Vec::with_capacity(total);
    for (i, source_id) in sources.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }

        let (result_tx, result_rx) = tokio::sync::oneshot::channel();
        let job = DocJob {
            source_id: source_id.clone(),
            result_tx,
            doc_index: i,
            total,
            progress: progress.clone(),
        };

        pool.submit(job).await;
        receivers.push((i, result_rx));
    }

    // Collect records; a dropped channel means the document never started
    let mut slots: Vec<Option<DocumentRecord>> = vec![None; total];
    for (i, rx) in receivers {
        if let Ok(record) = rx.await {
            slots[i] = Some(record);
        }
    }

    pool.shutdown().await;

    let records: Vec<DocumentRecord> = slots.into_iter().flatten().collect();

    let mut failures = BTreeMap::new();
    for record in &records {
        if let Some(error) = &record.error {
            failures.insert(record.source_id.clone(), error.clone());
        }
    }

    let stats = BatchStats {
        total,
        succeeded: records
            .iter()
            .filter(|r| r.status == Status::Success)
            .count(),
        partial: records
            .iter()
            .filter(|r| r.status == Status::PartialFailure)
            .count(),
        failed: records
            .iter()
            .filter(|r| r.status == Status::Failed)
            .count(),
        elapsed: start.elapsed(),
    };

    tracing::info!(
        total,
        succeeded = stats.succeeded,
        partial = stats.partial,
        failed = stats.failed,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "batch complete"
    );

    Ok(BatchResult {
        records,
        failures,
        stats,
    })
}
