use std::collections::HashMap;

use crate::{ExtractError, TextSpan};

/// Trait for page-text extraction backends.
///
/// Implementors provide the low-level span extraction step; the inference
/// pipeline (title/author detection, text cleaning) lives in
/// [`crate::inferer::StructuralInferer`].
pub trait SpanSource: Send + Sync {
    /// Extract the ordered text spans of the first `max_pages` pages of a
    /// document. Fails with [`ExtractError::SourceUnreadable`] when the
    /// document cannot be opened or decoded.
    fn get_spans(&self, source: &str, max_pages: usize) -> Result<Vec<TextSpan>, ExtractError>;
}

/// In-memory [`SpanSource`] backed by a map from source id to spans.
///
/// Useful for tests and fixtures. Sources not present in the map fail with
/// [`ExtractError::SourceUnreadable`].
#[derive(Debug, Clone, Default)]
pub struct StaticSpans {
    docs: HashMap<String, Vec<TextSpan>>,
}

impl StaticSpans {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document's spans under the given source id.
    pub fn with_doc(mut self, source: impl Into<String>, spans: Vec<TextSpan>) -> Self {
        self.docs.insert(source.into(), spans);
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, spans: Vec<TextSpan>) {
        self.docs.insert(source.into(), spans);
    }
}

impl SpanSource for StaticSpans {
    fn get_spans(&self, source: &str, max_pages: usize) -> Result<Vec<TextSpan>, ExtractError> {
        let spans = self
            .docs
            .get(source)
            .ok_or_else(|| ExtractError::SourceUnreadable(format!("unknown source: {source}")))?;
        Ok(spans
            .iter()
            .filter(|s| s.page_index < max_pages)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_spans_lookup() {
        let source = StaticSpans::new().with_doc(
            "paper.pdf",
            vec![
                TextSpan::new("Title", 20.0, 0, 0),
                TextSpan::new("Body on page three", 10.0, 2, 0),
            ],
        );
        let spans = source.get_spans("paper.pdf", 10).unwrap();
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_static_spans_page_limit() {
        let source = StaticSpans::new().with_doc(
            "paper.pdf",
            vec![
                TextSpan::new("Title", 20.0, 0, 0),
                TextSpan::new("Body on page three", 10.0, 2, 0),
            ],
        );
        let spans = source.get_spans("paper.pdf", 2).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Title");
    }

    #[test]
    fn test_static_spans_unknown_source() {
        let source = StaticSpans::new();
        let err = source.get_spans("missing.pdf", 2).unwrap_err();
        assert!(matches!(err, ExtractError::SourceUnreadable(_)));
    }
}
