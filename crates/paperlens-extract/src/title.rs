use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::InferenceConfig;
use crate::spans::{FontStatistics, TextSpan};
use crate::text_processing::{expand_ligatures, fix_hyphenation_with_config};

/// Patterns that disqualify a span from the title block.
///
/// A span matching any of these never joins the title; once the title has
/// started, the first match ends it.
static NON_TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Emails and URLs never belong in a title
        Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap(),
        Regex::new(r"(?i)https?://|\bwww\.").unwrap(),
        // Bare page markers and citation brackets
        Regex::new(r"^\d+$").unwrap(),
        Regex::new(r"^\[\d+\]$").unwrap(),
        // Stray single characters from broken extraction
        Regex::new(r"^[A-Za-z]$").unwrap(),
        // Section headers, bare or with inline content
        Regex::new(r"(?i)^(abstract|introduction|keywords?|index\s+terms|contents|acknowledg\w*)\s*[:.]?\s*$").unwrap(),
        Regex::new(r"(?i)^(keywords?|index\s+terms)\s*[:\u{2014}\u{2013}-]").unwrap(),
        Regex::new(r"(?i)^abstract\s*[:.\u{2014}\u{2013}-]\s").unwrap(),
        // Affiliation and venue lines
        Regex::new(r"(?i)\b(department|university|institute|school|laboratory|college)\b").unwrap(),
        Regex::new(r"(?i)^(proceedings|journal|conference)\b").unwrap(),
        // arXiv margin banner
        Regex::new(r"(?i)^arxiv:").unwrap(),
    ]
});

/// A detected title block.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    /// The concatenated, cleaned title text.
    pub text: String,
    /// Index into the span slice one past the last title span.
    pub end_index: usize,
    /// Smallest font size among the title spans.
    pub font_size: f32,
}

/// Detect the title block: consecutive page-0 spans near the top whose font
/// size is within the configured band of the page-0 maximum.
///
/// Scanning passes over non-qualifying spans until the first qualifying one,
/// then accumulates until a span drops below the band, matches a non-title
/// pattern, or falls outside the order cutoff. Whitespace-only spans are
/// extraction noise and never end the block. Returns `None` when no span
/// qualifies; the first line of body text is never promoted to a title.
pub(crate) fn detect_title_block_with_config(
    spans: &[TextSpan],
    stats: &FontStatistics,
    config: &InferenceConfig,
) -> Option<TitleBlock> {
    if stats.page0_max_size <= 0.0 {
        return None;
    }
    let min_size = stats.page0_max_size * config.title_band_ratio;
    let patterns = config.non_title_patterns.resolve(&NON_TITLE_PATTERNS);

    let mut parts: Vec<&str> = Vec::new();
    let mut block_size = f32::MAX;
    let mut end_index = 0;

    for (i, span) in spans.iter().enumerate() {
        if span.page_index != 0 || span.order_index >= config.title_order_cutoff {
            if parts.is_empty() {
                continue;
            }
            break;
        }

        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }

        let qualifies =
            span.font_size >= min_size && !patterns.iter().any(|re| re.is_match(text));
        if qualifies {
            parts.push(text);
            block_size = block_size.min(span.font_size);
            end_index = i + 1;
        } else if !parts.is_empty() {
            break;
        }
    }

    if parts.is_empty() {
        return None;
    }

    let title = expand_ligatures(&parts.join(" "));
    let title = fix_hyphenation_with_config(&title, config);
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    let title = WS_RE.replace_all(&title, " ");
    static TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,;:]+$").unwrap());
    let title = TRAILING_PUNCT.replace(title.trim(), "").trim().to_string();

    if title.is_empty() {
        return None;
    }

    Some(TitleBlock {
        text: title,
        end_index,
        font_size: block_size,
    })
}
