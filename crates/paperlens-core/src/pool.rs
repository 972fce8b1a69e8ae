//! Worker pool for concurrent document processing.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use paperlens_extract::SpanSource;

use crate::gateway::ModelGateway;
use crate::pipeline;
use crate::{DocumentRecord, ProcessingOptions, ProgressEvent};

// ── Job ─────────────────────────────────────────────────────────────────────

/// A single document handed to the pool, with its result channel.
pub struct DocJob {
    pub source_id: String,
    pub result_tx: oneshot::Sender<DocumentRecord>,
    pub doc_index: usize,
    pub total: usize,
    pub progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
}

// ── Pool ────────────────────────────────────────────────────────────────────

/// Bounded pool of worker tasks. Each worker owns one document from dispatch
/// to its terminal status; nothing preempts a document mid-pipeline.
///
/// Submit jobs via [`submit()`](ProcessingPool::submit), receive records via
/// the oneshot receiver paired with each job.
pub struct ProcessingPool {
    job_tx: async_channel::Sender<DocJob>,
    pool_handle: JoinHandle<()>,
}

impl ProcessingPool {
    pub fn new(
        span_source: Arc<dyn SpanSource>,
        model_gateway: Arc<dyn ModelGateway>,
        options: ProcessingOptions,
        cancel: CancellationToken,
        num_workers: usize,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<DocJob>();

        let pool_handle = tokio::spawn(async move {
            let mut handles = Vec::new();
            for _ in 0..num_workers {
                let job_rx = job_rx.clone();
                let span_source = span_source.clone();
                let model_gateway = model_gateway.clone();
                let options = options.clone();
                let cancel = cancel.clone();
                handles.push(tokio::spawn(worker_loop(
                    job_rx,
                    span_source,
                    model_gateway,
                    options,
                    cancel,
                )));
            }
            // Workers hold their own clones; drop ours so closing the sender
            // side actually terminates the channel.
            drop(job_rx);
            for handle in handles {
                let _ = handle.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    /// Queue a job for the next free worker.
    pub async fn submit(&self, job: DocJob) {
        let _ = self.job_tx.send(job).await;
    }

    /// Close the queue and wait for the workers to drain it.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

// ── Worker ──────────────────────────────────────────────────────────────────

async fn worker_loop(
    job_rx: async_channel::Receiver<DocJob>,
    span_source: Arc<dyn SpanSource>,
    model_gateway: Arc<dyn ModelGateway>,
    options: ProcessingOptions,
    cancel: CancellationToken,
) {
    while let Ok(job) = job_rx.recv().await {
        // Skip remaining jobs after cancellation. Dropping the job drops its
        // result channel, so the coordinator sees the slot as absent. A
        // document that already passed this check runs to a terminal status.
        if cancel.is_cancelled() {
            tracing::debug!(source = %job.source_id, "skipping: cancelled");
            continue;
        }

        (job.progress)(ProgressEvent::Started {
            index: job.doc_index,
            total: job.total,
            source_id: job.source_id.clone(),
        });

        let record = pipeline::process_document(
            &job.source_id,
            span_source.as_ref(),
            model_gateway.as_ref(),
            &options,
        )
        .await;

        (job.progress)(ProgressEvent::Completed {
            index: job.doc_index,
            total: job.total,
            source_id: job.source_id.clone(),
            status: record.status,
        });

        let _ = job.result_tx.send(record);
    }
}
