use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Quantisation bucket width for font sizes in the histogram (points).
const FONT_SIZE_BUCKET: f32 = 0.5;

/// A single run of text as emitted by the page-text extractor, tagged with
/// font size, weight, and position in reading order.
///
/// `order_index` is strictly increasing within a page and reflects reading
/// order as the extractor emitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
    pub is_bold: bool,
    pub page_index: usize,
    pub order_index: usize,
}

impl TextSpan {
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        page_index: usize,
        order_index: usize,
    ) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold: false,
            page_index,
            order_index,
        }
    }
}

/// Quantise a font size into a histogram bucket.
fn bucket(size: f32) -> f32 {
    (size / FONT_SIZE_BUCKET).round() * FONT_SIZE_BUCKET
}

/// Aggregate font-size statistics for a span sequence.
///
/// The histogram counts characters (not spans) at each quantised size, so a
/// long body paragraph outweighs a short heading in the same size.
#[derive(Debug, Clone, PartialEq)]
pub struct FontStatistics {
    /// Largest font size observed on page 0 (0.0 when page 0 has no spans).
    pub page0_max_size: f32,
    /// The most common font size across all spans, weighted by character count.
    pub body_size: f32,
}

impl FontStatistics {
    pub fn compute(spans: &[TextSpan]) -> Self {
        let mut histogram: HashMap<i32, usize> = HashMap::new();
        let mut page0_max_size: f32 = 0.0;

        for span in spans {
            if span.font_size <= 0.0 {
                continue;
            }
            if span.page_index == 0 {
                page0_max_size = page0_max_size.max(span.font_size);
            }
            let key = (bucket(span.font_size) * 100.0).round() as i32;
            let char_count = span.text.chars().count();
            *histogram.entry(key).or_insert(0) += char_count;
        }

        let body_size = histogram
            .into_iter()
            // Tie-break toward the smaller size so headings never win.
            .max_by_key(|&(key, count)| (count, std::cmp::Reverse(key)))
            .map(|(key, _)| key as f32 / 100.0)
            .unwrap_or(12.0);

        Self {
            page0_max_size,
            body_size,
        }
    }

    /// Whether `size` falls in a different histogram bucket than the body text.
    pub fn differs_from_body(&self, size: f32) -> bool {
        (bucket(size) - bucket(self.body_size)).abs() > f32::EPSILON
    }
}
