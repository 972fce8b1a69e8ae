use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::InferenceConfig;
use crate::spans::{FontStatistics, TextSpan};
use crate::title::{detect_title_block_with_config, TitleBlock};

/// How many spans after the title block are scanned for author names.
const AUTHOR_SCAN_WINDOW: usize = 10;

/// Keywords marking an affiliation line rather than an author name.
pub(crate) static AFFILIATION_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "department",
        "university",
        "institute",
        "school",
        "laboratory",
        "college",
    ]
});

/// Lowercase words allowed inside a name (nobiliary particles etc.).
static NAME_PREPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["de", "van", "von", "la", "del", "di", "da", "dos"]
        .into_iter()
        .collect()
});

static EMAIL_OR_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@|https?://|\bwww\.").unwrap());

static SECTION_STOP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(abstract|introduction|keywords?|index\s+terms)\b").unwrap());

/// Superscript affiliation markers as they come out of PDF extraction:
/// digits and the usual dagger/asterisk symbols attached to names.
static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9*\u{2020}\u{2021}\u{00A7}\u{00B6}\u{2217}]+").unwrap());

/// Detect author names from a span sequence with default configuration.
///
/// Strategies are tried in priority order and the first one producing at
/// least one candidate wins:
/// 1. Pattern: name-like spans immediately after the title block
/// 2. Positional: the first span below the title whose font size sits
///    between title and body text
pub fn detect_authors(spans: &[TextSpan]) -> Vec<String> {
    let config = InferenceConfig::default();
    let stats = FontStatistics::compute(spans);
    let title = detect_title_block_with_config(spans, &stats, &config);
    detect_authors_with_config(spans, title.as_ref(), &stats, &config)
}

pub(crate) fn detect_authors_with_config(
    spans: &[TextSpan],
    title: Option<&TitleBlock>,
    stats: &FontStatistics,
    config: &InferenceConfig,
) -> Vec<String> {
    let default_keywords: Vec<String> =
        AFFILIATION_KEYWORDS.iter().map(|s| s.to_string()).collect();
    let keywords = config.affiliation_keywords.resolve(&default_keywords);
    let start = title.map(|t| t.end_index).unwrap_or(0);

    let mut found = try_pattern_strategy(spans, start, &keywords);
    if found.is_empty() {
        if let Some(t) = title {
            found = try_positional_strategy(spans, t.end_index, t.font_size, stats, &keywords);
        }
    }

    dedup_names(found, config.max_authors)
}

/// Scan spans after the title block for name-like text, stopping at the
/// first section header, affiliation line, or prose paragraph.
fn try_pattern_strategy(spans: &[TextSpan], start: usize, keywords: &[String]) -> Vec<String> {
    let mut names = Vec::new();
    let mut scanned = 0;

    for span in spans.iter().skip(start) {
        if span.page_index != 0 {
            break;
        }
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }
        scanned += 1;
        if scanned > AUTHOR_SCAN_WINDOW {
            break;
        }
        if SECTION_STOP_RE.is_match(text) || is_affiliation(text, keywords) || is_prose(text) {
            break;
        }
        // Email/URL lines sit between author rows; skip without ending the scan
        if EMAIL_OR_URL_RE.is_match(text) {
            continue;
        }
        let stripped = MARKER_RE.replace_all(text, "");
        for piece in split_author_candidates(&stripped) {
            if looks_like_name(&piece) {
                names.push(piece);
            }
        }
    }

    names
}

/// Fallback: take the first span below the title whose font size is smaller
/// than the title's but distinct from the body size, and split it on the
/// common name separators.
fn try_positional_strategy(
    spans: &[TextSpan],
    start: usize,
    title_size: f32,
    stats: &FontStatistics,
    keywords: &[String],
) -> Vec<String> {
    for span in spans.iter().skip(start).take(AUTHOR_SCAN_WINDOW) {
        if span.page_index != 0 {
            break;
        }
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }
        if span.font_size >= title_size || !stats.differs_from_body(span.font_size) {
            continue;
        }
        if EMAIL_OR_URL_RE.is_match(text)
            || is_affiliation(text, keywords)
            || SECTION_STOP_RE.is_match(text)
        {
            continue;
        }

        let stripped = MARKER_RE.replace_all(text, "");
        let names: Vec<String> = split_author_candidates(&stripped)
            .into_iter()
            .filter(|p| looks_like_name(p))
            .collect();
        if !names.is_empty() {
            return names;
        }
        // The first qualifying line is the author line; nothing usable means
        // this document has no detectable authors
        break;
    }
    vec![]
}

fn is_affiliation(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

fn is_prose(text: &str) -> bool {
    let words = text.split_whitespace().count();
    words > 20 || text.len() > 150 || (words > 10 && text.trim_end().ends_with('.'))
}

/// Split an author line on commas, semicolons, "and", and ampersands.
fn split_author_candidates(text: &str) -> Vec<String> {
    static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i),?\s+and\s+").unwrap());
    let text = AND_RE.replace_all(text, ", ");

    static AMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*&\s*").unwrap());
    let text = AMP_RE.replace_all(&text, ", ");

    text.split([',', ';'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Whether a trimmed piece plausibly names one person.
fn looks_like_name(piece: &str) -> bool {
    if piece.len() < 2 {
        return false;
    }
    if piece.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    let words: Vec<&str> = piece.split_whitespace().collect();
    if words.is_empty() || words.len() > 4 {
        return false;
    }
    if !words[0].chars().next().is_some_and(|c| c.is_uppercase()) {
        return false;
    }

    // Lowercase words that aren't name particles mean this is a sentence
    let lowercase_words = words
        .iter()
        .filter(|w| {
            w.chars().next().is_some_and(|c| c.is_lowercase())
                && !NAME_PREPOSITIONS.contains(w.to_lowercase().as_str())
        })
        .count();
    if lowercase_words > 1 {
        return false;
    }

    let has_upper = piece.chars().any(|c| c.is_uppercase());
    let has_lower = piece.chars().any(|c| c.is_lowercase());
    has_upper && has_lower
}

/// Case-insensitive dedup preserving first appearance order.
fn dedup_names(names: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        if seen.insert(name.to_lowercase()) {
            out.push(name);
        }
        if out.len() == max {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfigBuilder;

    fn detect(spans: &[TextSpan]) -> Vec<String> {
        detect_authors(spans)
    }

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_pattern_strategy_comma_separated() {
        let spans = vec![
            TextSpan::new("ABSTRACT-FREE TITLE HERE", 24.0, 0, 0),
            TextSpan::new("Jane Doe, John Smith", 12.0, 0, 1),
            TextSpan::new("This is body text...", 10.0, 0, 2),
        ];
        assert_eq!(detect(&spans), s(&["Jane Doe", "John Smith"]));
    }

    #[test]
    fn test_pattern_strategy_and_separator() {
        let spans = vec![
            TextSpan::new("A Large Paper Title", 20.0, 0, 0),
            TextSpan::new("Alice Brown and Bob Green", 12.0, 0, 1),
            TextSpan::new("body body body", 10.0, 0, 2),
        ];
        assert_eq!(detect(&spans), s(&["Alice Brown", "Bob Green"]));
    }

    #[test]
    fn test_superscript_markers_stripped() {
        let spans = vec![
            TextSpan::new("Yet Another Title", 20.0, 0, 0),
            TextSpan::new("Jane Doe1, John Smith2\u{2217}, Alice Brown\u{2020}", 12.0, 0, 1),
            TextSpan::new("body", 10.0, 0, 2),
        ];
        assert_eq!(detect(&spans), s(&["Jane Doe", "John Smith", "Alice Brown"]));
    }

    #[test]
    fn test_email_line_skipped_without_ending_scan() {
        let spans = vec![
            TextSpan::new("Some Paper Title", 20.0, 0, 0),
            TextSpan::new("Jane Doe", 12.0, 0, 1),
            TextSpan::new("jane.doe@lab.example.org", 9.0, 0, 2),
            TextSpan::new("John Smith", 12.0, 0, 3),
            TextSpan::new("body paragraph", 10.0, 0, 4),
        ];
        assert_eq!(detect(&spans), s(&["Jane Doe", "John Smith"]));
    }

    #[test]
    fn test_pattern_stops_at_abstract_header() {
        let spans = vec![
            TextSpan::new("Some Paper Title", 20.0, 0, 0),
            TextSpan::new("Jane Doe", 12.0, 0, 1),
            TextSpan::new("Abstract", 12.0, 0, 2),
            TextSpan::new("Not An Author", 12.0, 0, 3),
        ];
        assert_eq!(detect(&spans), s(&["Jane Doe"]));
    }

    #[test]
    fn test_positional_after_affiliation_stop() {
        // The affiliation line ends the pattern scan before any name is seen;
        // the positional strategy then skips it and finds the author line.
        let spans = vec![
            TextSpan::new("Some Paper Title", 20.0, 0, 0),
            TextSpan::new("Department of Computer Science", 12.0, 0, 1),
            TextSpan::new("Jane Doe, John Smith", 12.0, 0, 2),
            TextSpan::new(
                "A long opening body paragraph that runs on and on and on and keeps running well past any plausible author line length to set the body font.",
                10.0,
                0,
                3,
            ),
        ];
        assert_eq!(detect(&spans), s(&["Jane Doe", "John Smith"]));
    }

    #[test]
    fn test_duplicates_removed_preserving_order() {
        // Two-column layouts repeat the author row; dedup is case-insensitive
        let spans = vec![
            TextSpan::new("Some Paper Title", 20.0, 0, 0),
            TextSpan::new("Jane Doe, John Smith", 12.0, 0, 1),
            TextSpan::new("Jane Doe", 12.0, 0, 2),
            TextSpan::new("body", 10.0, 0, 3),
        ];
        assert_eq!(detect(&spans), s(&["Jane Doe", "John Smith"]));
    }

    #[test]
    fn test_no_authors_in_plain_body() {
        let spans = vec![
            TextSpan::new("Some Paper Title", 20.0, 0, 0),
            TextSpan::new(
                "the quick brown fox jumps over the lazy dog again and again in this document",
                10.0,
                0,
                1,
            ),
        ];
        assert!(detect(&spans).is_empty());
    }

    #[test]
    fn test_max_authors_cap() {
        let config = InferenceConfigBuilder::new().max_authors(2).build().unwrap();
        let spans = vec![
            TextSpan::new("Some Paper Title", 20.0, 0, 0),
            TextSpan::new("Jane Doe, John Smith, Alice Brown, Bob Green", 12.0, 0, 1),
            TextSpan::new("body", 10.0, 0, 2),
        ];
        let stats = FontStatistics::compute(&spans);
        let title = detect_title_block_with_config(&spans, &stats, &config);
        let authors = detect_authors_with_config(&spans, title.as_ref(), &stats, &config);
        assert_eq!(authors, s(&["Jane Doe", "John Smith"]));
    }

    #[test]
    fn test_nobiliary_particles_allowed() {
        let spans = vec![
            TextSpan::new("Some Paper Title", 20.0, 0, 0),
            TextSpan::new("Vincent van Gogh, Leonardo da Vinci", 12.0, 0, 1),
            TextSpan::new("body", 10.0, 0, 2),
        ];
        assert_eq!(detect(&spans), s(&["Vincent van Gogh", "Leonardo da Vinci"]));
    }

    #[test]
    fn test_looks_like_name() {
        assert!(looks_like_name("Jane Doe"));
        assert!(looks_like_name("J. Smith"));
        assert!(looks_like_name("Vincent van Gogh"));
        assert!(!looks_like_name("this is a sentence fragment"));
        assert!(!looks_like_name("x"));
        assert!(!looks_like_name("Figure 3"));
        assert!(!looks_like_name("page 12 of 14"));
    }
}
