//! Integration tests for batch document processing.
//!
//! These tests run against [`StaticSpans`] and [`MockGateway`], so no real
//! PDF backend or model service is involved.

use std::sync::{Arc, Mutex};

use paperlens_core::gateway::mock::{MockGateway, MockResponse};
use paperlens_core::{
    BatchError, ErrorKind, Keyword, ProcessingOptions, ProgressEvent, StaticSpans, Status,
    TextSpan, process_batch, process_one,
};
use tokio_util::sync::CancellationToken;

/// Spans for a small two-page article with a detectable title line.
fn paper_spans(title: &str) -> Vec<TextSpan> {
    vec![
        TextSpan::new(title, 18.0, 0, 0),
        TextSpan::new("Ada Lovelace, Charles Babbage", 11.0, 0, 1),
        TextSpan::new(
            "Abstract. We study how structured extraction behaves on scanned articles.",
            10.0,
            0,
            2,
        ),
        TextSpan::new(
            "The method generalizes across document collections with minimal tuning.",
            10.0,
            1,
            3,
        ),
    ]
}

/// A span source with `n` readable documents named `doc-0` .. `doc-{n-1}`.
fn corpus(n: usize) -> Arc<StaticSpans> {
    let mut spans = StaticSpans::new();
    for i in 0..n {
        spans.insert(format!("doc-{i}"), paper_spans(&format!("Study Number {i}")));
    }
    Arc::new(spans)
}

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("doc-{i}")).collect()
}

fn options_with(concurrency: usize) -> ProcessingOptions {
    ProcessingOptions {
        concurrency,
        ..ProcessingOptions::default()
    }
}

#[tokio::test]
async fn process_one_succeeds_with_metadata() {
    let spans = StaticSpans::new().with_doc(
        "paper",
        paper_spans("Signal Recovery In Noisy Channels"),
    );
    let gateway = MockGateway::succeeding();

    let record = process_one("paper", &spans, &gateway, &ProcessingOptions::default()).await;

    assert_eq!(record.status, Status::Success);
    assert!(record.error.is_none());
    assert_eq!(
        record.metadata.title.as_deref(),
        Some("Signal Recovery In Noisy Channels")
    );
    assert!(record.summary.is_some());
    assert_eq!(record.keywords.len(), 2);
    let stats = record.stats.expect("stats should be present on success");
    assert!(stats.word_count > 0);
}

#[tokio::test]
async fn batch_preserves_input_order() {
    let total = 5;
    let result = process_batch(
        ids(total),
        corpus(total),
        Arc::new(MockGateway::succeeding()),
        options_with(3),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect("valid options");

    assert_eq!(result.records.len(), total);
    for (i, record) in result.records.iter().enumerate() {
        assert_eq!(record.source_id, format!("doc-{i}"));
        assert_eq!(record.status, Status::Success);
    }
    assert!(result.failures.is_empty());
    assert_eq!(result.stats.total, total);
    assert_eq!(result.stats.succeeded, total);
}

#[tokio::test]
async fn unreadable_source_is_isolated() {
    // doc-1 is absent from the span source; the other two are readable.
    let mut spans = StaticSpans::new();
    spans.insert("doc-0", paper_spans("First Article"));
    spans.insert("doc-2", paper_spans("Third Article"));

    let result = process_batch(
        vec!["doc-0".into(), "doc-1".into(), "doc-2".into()],
        Arc::new(spans),
        Arc::new(MockGateway::succeeding()),
        options_with(2),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect("valid options");

    // One bad document never shrinks the batch.
    assert_eq!(result.records.len(), 3);
    assert_eq!(result.records[0].status, Status::Success);
    assert_eq!(result.records[1].status, Status::Failed);
    assert_eq!(result.records[2].status, Status::Success);
    assert_eq!(
        result.records[1].error.as_ref().map(|e| e.kind),
        Some(ErrorKind::SourceUnreadable)
    );

    assert_eq!(result.failures.len(), 1);
    assert!(result.failures.contains_key("doc-1"));
    assert_eq!(result.stats.succeeded, 2);
    assert_eq!(result.stats.failed, 1);
}

#[tokio::test]
async fn partial_failure_retains_keywords() {
    // Single worker so the summarize sequence maps onto documents in order.
    let gateway = MockGateway::succeeding().with_summary_sequence(vec![
        MockResponse::Ok("first summary".to_string()),
        MockResponse::Timeout,
    ]);

    let result = process_batch(
        ids(2),
        corpus(2),
        Arc::new(gateway),
        options_with(1),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect("valid options");

    assert_eq!(result.records[0].status, Status::Success);

    let degraded = &result.records[1];
    assert_eq!(degraded.status, Status::PartialFailure);
    assert!(degraded.summary.is_none());
    assert!(!degraded.keywords.is_empty(), "keywords survive a summary failure");
    assert_eq!(
        degraded.error.as_ref().map(|e| e.kind),
        Some(ErrorKind::ModelTimeout)
    );

    assert_eq!(result.failures.len(), 1);
    assert!(result.failures.contains_key("doc-1"));
    assert_eq!(result.stats.partial, 1);
}

#[tokio::test]
async fn gateway_called_at_most_twice_per_document() {
    let total = 4;
    let gateway = Arc::new(MockGateway::succeeding());

    let result = process_batch(
        ids(total),
        corpus(total),
        gateway.clone(),
        options_with(2),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect("valid options");

    assert_eq!(result.records.len(), total);
    assert_eq!(gateway.summarize_calls(), total);
    assert_eq!(gateway.keyword_calls(), total);
    assert_eq!(gateway.total_calls(), total * 2);
}

#[tokio::test]
async fn completion_events_emitted_exactly_once() {
    let total = 5;
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    process_batch(
        ids(total),
        corpus(total),
        Arc::new(MockGateway::succeeding()),
        options_with(3),
        move |event: ProgressEvent| {
            let tag = match &event {
                ProgressEvent::Started { index, .. } => format!("started:{index}"),
                ProgressEvent::Completed { index, .. } => format!("completed:{index}"),
            };
            sink.lock().unwrap().push(tag);
        },
        CancellationToken::new(),
    )
    .await
    .expect("valid options");

    let collected = events.lock().unwrap();
    for i in 0..total {
        let started = collected.iter().filter(|t| **t == format!("started:{i}")).count();
        let completed = collected
            .iter()
            .filter(|t| **t == format!("completed:{i}"))
            .count();
        assert_eq!(started, 1, "document {i} should start once, got: {collected:?}");
        assert_eq!(completed, 1, "document {i} should complete once, got: {collected:?}");
    }
}

#[tokio::test]
async fn cancellation_keeps_completed_records() {
    // Single worker; the callback cancels as soon as the first document
    // completes, so later documents are never started.
    let total = 4;
    let cancel = CancellationToken::new();
    let cancel_in_cb = cancel.clone();
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let result = process_batch(
        ids(total),
        corpus(total),
        Arc::new(MockGateway::succeeding()),
        options_with(1),
        move |event: ProgressEvent| {
            match &event {
                ProgressEvent::Started { index, .. } => {
                    sink.lock().unwrap().push(format!("started:{index}"));
                }
                ProgressEvent::Completed { index, .. } => {
                    sink.lock().unwrap().push(format!("completed:{index}"));
                    cancel_in_cb.cancel();
                }
            }
        },
        cancel,
    )
    .await
    .expect("valid options");

    // The in-flight document finished; everything after it was skipped.
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].source_id, "doc-0");
    assert_eq!(result.records[0].status, Status::Success);
    assert_eq!(result.stats.total, total);
    assert_eq!(result.stats.succeeded, 1);

    let collected = events.lock().unwrap();
    assert_eq!(
        *collected,
        vec!["started:0".to_string(), "completed:0".to_string()],
        "no events for documents that never started"
    );
}

#[tokio::test]
async fn cancel_before_start_returns_no_records() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = process_batch(
        ids(3),
        corpus(3),
        Arc::new(MockGateway::succeeding()),
        options_with(2),
        |_| {},
        cancel,
    )
    .await
    .expect("valid options");

    assert!(result.records.is_empty());
    assert!(result.failures.is_empty());
    assert_eq!(result.stats.succeeded, 0);
}

#[tokio::test]
async fn empty_batch_returns_empty_result() {
    let result = process_batch(
        Vec::new(),
        Arc::new(StaticSpans::new()),
        Arc::new(MockGateway::succeeding()),
        ProcessingOptions::default(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect("valid options");

    assert!(result.records.is_empty());
    assert!(result.failures.is_empty());
    assert_eq!(result.stats.total, 0);
}

#[tokio::test]
async fn invalid_options_are_rejected() {
    let err = process_batch(
        ids(1),
        corpus(1),
        Arc::new(MockGateway::succeeding()),
        options_with(0),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect_err("zero concurrency violates the calling contract");
    assert!(matches!(err, BatchError::InvalidConcurrency(0)));

    let options = ProcessingOptions {
        token_cap: 0,
        ..ProcessingOptions::default()
    };
    let err = process_batch(
        ids(1),
        corpus(1),
        Arc::new(MockGateway::succeeding()),
        options,
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect_err("zero token cap violates the calling contract");
    assert!(matches!(err, BatchError::InvalidTokenCap));
}

#[tokio::test]
async fn delayed_gateway_still_completes() {
    let total = 3;
    let gateway =
        MockGateway::succeeding().with_delay(std::time::Duration::from_millis(10));

    let result = process_batch(
        ids(total),
        corpus(total),
        Arc::new(gateway),
        options_with(2),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .expect("valid options");

    assert_eq!(result.records.len(), total);
    assert_eq!(result.stats.succeeded, total);
    assert!(result.stats.elapsed.as_millis() >= 10);
}

#[tokio::test]
async fn keywords_carry_scores() {
    let gateway = MockGateway::new(
        MockResponse::Ok("dense retrieval summary".to_string()),
        MockResponse::Ok(vec![
            Keyword::new("dense retrieval", 0.93),
            Keyword::new("ranking", 0.61),
        ]),
    );
    let spans = StaticSpans::new().with_doc("paper", paper_spans("Dense Retrieval At Scale"));

    let record = process_one("paper", &spans, &gateway, &ProcessingOptions::default()).await;

    assert_eq!(record.status, Status::Success);
    assert_eq!(record.keywords[0].phrase, "dense retrieval");
    assert!(record.keywords[0].score > record.keywords[1].score);
}
