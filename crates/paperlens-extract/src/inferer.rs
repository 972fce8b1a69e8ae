use crate::authors::detect_authors_with_config;
use crate::config::InferenceConfig;
use crate::spans::{FontStatistics, TextSpan};
use crate::text_processing::clean_text_with_config;
use crate::title::{detect_title_block_with_config, TitleBlock};
use crate::{ExtractError, InferredMetadata};

/// Output of structural inference for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    /// Raw span text joined with line breaks, before cleaning.
    pub raw_text: String,
    /// Normalized full text (ligatures, hyphenation, whitespace).
    pub cleaned_text: String,
    pub metadata: InferredMetadata,
}

/// A configurable structural inference pipeline.
///
/// Holds an [`InferenceConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`StructuralInferer::with_config`] to supply custom patterns and
/// thresholds.
pub struct StructuralInferer {
    config: InferenceConfig,
}

impl Default for StructuralInferer {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralInferer {
    /// Create an inferer with default configuration.
    pub fn new() -> Self {
        Self {
            config: InferenceConfig::default(),
        }
    }

    /// Create an inferer with a custom configuration.
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Detect the title block within the inference page window (step 1).
    pub fn detect_title(&self, spans: &[TextSpan]) -> Option<TitleBlock> {
        let window = self.page_window(spans);
        let stats = FontStatistics::compute(window);
        detect_title_block_with_config(window, &stats, &self.config)
    }

    /// Detect author names within the inference page window (step 2).
    pub fn detect_authors(&self, spans: &[TextSpan]) -> Vec<String> {
        let window = self.page_window(spans);
        let stats = FontStatistics::compute(window);
        let title = detect_title_block_with_config(window, &stats, &self.config);
        detect_authors_with_config(window, title.as_ref(), &stats, &self.config)
    }

    /// Normalize document text (step 3).
    pub fn clean(&self, text: &str) -> String {
        clean_text_with_config(text, &self.config)
    }

    /// Run the full inference pipeline over one document's spans.
    ///
    /// Title and author detection look only at the first `max_pages` pages;
    /// cleaning covers the full text. Fails with
    /// [`ExtractError::ExtractionEmpty`] when the span sequence is empty.
    pub fn infer(&self, spans: &[TextSpan]) -> Result<Inference, ExtractError> {
        if spans.is_empty() {
            return Err(ExtractError::ExtractionEmpty);
        }

        let window = self.page_window(spans);
        let stats = FontStatistics::compute(window);
        let title = detect_title_block_with_config(window, &stats, &self.config);
        let authors = detect_authors_with_config(window, title.as_ref(), &stats, &self.config);

        let raw_text = spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let cleaned_text = clean_text_with_config(&raw_text, &self.config);

        Ok(Inference {
            raw_text,
            cleaned_text,
            metadata: InferredMetadata {
                title: title.map(|t| t.text),
                authors,
            },
        })
    }

    /// Leading subslice covering the first `max_pages` pages.
    fn page_window<'a>(&self, spans: &'a [TextSpan]) -> &'a [TextSpan] {
        let end = spans
            .iter()
            .position(|s| s.page_index >= self.config.max_pages)
            .unwrap_or(spans.len());
        &spans[..end]
    }
}
