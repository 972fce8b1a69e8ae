//! Mock model gateway for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{GatewayError, ModelGateway};
use crate::Keyword;

/// A configurable mock outcome for a single [`MockGateway`] call.
#[derive(Clone, Debug)]
pub enum MockResponse<T> {
    /// Simulate a successful model call.
    Ok(T),
    /// Simulate an unreachable model service.
    Unavailable(String),
    /// Simulate a call that exceeded its deadline.
    Timeout,
}

impl<T> MockResponse<T> {
    fn into_result(self) -> Result<T, GatewayError> {
        match self {
            MockResponse::Ok(value) => Ok(value),
            MockResponse::Unavailable(msg) => Err(GatewayError::Unavailable(msg)),
            MockResponse::Timeout => Err(GatewayError::Timeout),
        }
    }
}

/// A hand-rolled mock implementing [`ModelGateway`] for tests.
///
/// Responses are either fixed (returned for every call) or queued per
/// method, with the last queued response repeating once the queue runs
/// out. Latency can be simulated per call, and both methods count their
/// invocations via [`summarize_calls()`](MockGateway::summarize_calls)
/// and [`keyword_calls()`](MockGateway::keyword_calls).
pub struct MockGateway {
    /// If non-empty, each summarize call pops the next response.
    summaries: Mutex<Vec<MockResponse<String>>>,
    /// Fallback when the summarize sequence is exhausted.
    summary_fallback: MockResponse<String>,
    keywords: Mutex<Vec<MockResponse<Vec<Keyword>>>>,
    keyword_fallback: MockResponse<Vec<Keyword>>,
    delay: Option<Duration>,
    summarize_calls: AtomicUsize,
    keyword_calls: AtomicUsize,
}

impl MockGateway {
    /// Create a mock that always returns the given responses.
    pub fn new(summary: MockResponse<String>, keywords: MockResponse<Vec<Keyword>>) -> Self {
        Self {
            summaries: Mutex::new(Vec::new()),
            summary_fallback: summary,
            keywords: Mutex::new(Vec::new()),
            keyword_fallback: keywords,
            delay: None,
            summarize_calls: AtomicUsize::new(0),
            keyword_calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose calls always succeed with canned output.
    pub fn succeeding() -> Self {
        Self::new(
            MockResponse::Ok("A concise summary of the document.".to_string()),
            MockResponse::Ok(vec![
                Keyword::new("neural networks", 0.91),
                Keyword::new("optimization", 0.74),
            ]),
        )
    }

    /// Queue summarize responses returned in order, repeating the last one.
    pub fn with_summary_sequence(mut self, mut responses: Vec<MockResponse<String>>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        // Stored reversed; pop() then yields queue order.
        responses.reverse();
        self.summary_fallback = responses[0].clone();
        self.summaries = Mutex::new(responses);
        self
    }

    /// Queue keyword responses returned in order, repeating the last one.
    pub fn with_keyword_sequence(mut self, mut responses: Vec<MockResponse<Vec<Keyword>>>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        responses.reverse();
        self.keyword_fallback = responses[0].clone();
        self.keywords = Mutex::new(responses);
        self
    }

    /// Set simulated model latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `summarize()` has been called.
    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }

    /// How many times `extract_keywords()` has been called.
    pub fn keyword_calls(&self) -> usize {
        self.keyword_calls.load(Ordering::SeqCst)
    }

    /// Total model calls across both methods.
    pub fn total_calls(&self) -> usize {
        self.summarize_calls() + self.keyword_calls()
    }

    fn next_summary(&self) -> MockResponse<String> {
        let mut seq = self.summaries.lock().unwrap();
        if let Some(resp) = seq.pop() {
            resp
        } else {
            self.summary_fallback.clone()
        }
    }

    fn next_keywords(&self) -> MockResponse<Vec<Keyword>> {
        let mut seq = self.keywords.lock().unwrap();
        if let Some(resp) = seq.pop() {
            resp
        } else {
            self.keyword_fallback.clone()
        }
    }
}

impl ModelGateway for MockGateway {
    fn summarize<'a>(
        &'a self,
        _text: &'a str,
        _max_input_tokens: usize,
    ) -> Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send + 'a>> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        let response = self.next_summary();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            response.into_result()
        })
    }

    fn extract_keywords<'a>(
        &'a self,
        _text: &'a str,
        _top_k: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Keyword>, GatewayError>> + Send + 'a>> {
        self.keyword_calls.fetch_add(1, Ordering::SeqCst);
        let response = self.next_keywords();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            response.into_result()
        })
    }
}
