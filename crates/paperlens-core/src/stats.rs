//! Per-document text statistics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Size and density measurements for one document's cleaned text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub character_count: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub average_word_length: f64,
    pub average_sentence_length: f64,
    /// Characters in the generated summary, 0 when absent.
    pub summary_length: usize,
    /// Summary characters over text characters, 0.0 when either is empty.
    pub compression_ratio: f64,
}

impl DocumentStats {
    /// Measure cleaned text and its optional summary.
    ///
    /// Counts are character-based, not byte-based. Sentences are delimited
    /// by runs of `.`, `!` and `?`; text without terminal punctuation counts
    /// as a single sentence.
    pub fn from_texts(text: &str, summary: Option<&str>) -> Self {
        let character_count = text.chars().count();
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len();
        let sentence_count = SENTENCE_RE
            .split(text)
            .filter(|s| !s.trim().is_empty())
            .count();

        let average_word_length = if word_count > 0 {
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count as f64
        } else {
            0.0
        };
        let average_sentence_length = if sentence_count > 0 {
            word_count as f64 / sentence_count as f64
        } else {
            0.0
        };

        let summary_length = summary.map(|s| s.chars().count()).unwrap_or(0);
        let compression_ratio = if summary_length > 0 && character_count > 0 {
            summary_length as f64 / character_count as f64
        } else {
            0.0
        };

        Self {
            character_count,
            word_count,
            sentence_count,
            average_word_length,
            average_sentence_length,
            summary_length,
            compression_ratio,
        }
    }
}
