//! Model gateway trait for summarization and keyword extraction services.

pub mod mock;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::Keyword;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("model call timed out")]
    Timeout,
}

/// An external model service that can summarize text and rank keywords.
///
/// Implementations wrap whatever transport the service needs (HTTP, local
/// inference, a test double). Each method is a single call with no retry;
/// retry policy is a caller concern.
pub trait ModelGateway: Send + Sync {
    /// Produce an abstractive summary of `text`. The gateway may assume the
    /// caller already truncated `text` to `max_input_tokens` whitespace
    /// tokens and may enforce the same bound itself.
    fn summarize<'a>(
        &'a self,
        text: &'a str,
        max_input_tokens: usize,
    ) -> Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send + 'a>>;

    /// Extract up to `top_k` ranked keyword phrases from `text`.
    fn extract_keywords<'a>(
        &'a self,
        text: &'a str,
        top_k: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Keyword>, GatewayError>> + Send + 'a>>;
}
