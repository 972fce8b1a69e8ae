use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod authors;
pub mod backend;
pub mod config;
pub mod inferer;
pub mod spans;
pub mod text_processing;
pub mod title;

pub use backend::{SpanSource, StaticSpans};
pub use config::{ConfigError, InferenceConfig, InferenceConfigBuilder, ListOverride};
pub use inferer::{Inference, StructuralInferer};
pub use spans::{FontStatistics, TextSpan};
pub use text_processing::clean_text;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to open document: {0}")]
    SourceUnreadable(String),
    #[error("no text spans extracted")]
    ExtractionEmpty,
}

/// Title and author list inferred from a document's typographic layout.
///
/// Produced once per document and never modified afterwards. Both fields are
/// empty when no span satisfies the detection heuristics; a title is never
/// fabricated from the first line of body text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
}

impl InferredMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.authors.is_empty()
    }
}

/// Run structural inference over a span sequence with default configuration.
///
/// Pipeline:
/// 1. Detect the title from page-0 font sizes (largest-font band near the top)
/// 2. Detect authors via ordered strategies (pattern match, then positional)
/// 3. Clean the full text (ligatures, hyphenation, whitespace)
pub fn infer_structure(spans: &[TextSpan]) -> Result<Inference, ExtractError> {
    StructuralInferer::new().infer(spans)
}
