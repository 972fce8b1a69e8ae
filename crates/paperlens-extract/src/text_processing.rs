use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::InferenceConfig;

/// Suffixes that mark a hyphenated word as a deliberate compound.
pub(crate) static COMPOUND_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "centered",
        "based",
        "driven",
        "aware",
        "oriented",
        "specific",
        "related",
        "dependent",
        "independent",
        "like",
        "free",
        "friendly",
        "rich",
        "poor",
        "scale",
        "level",
        "order",
        "class",
        "type",
        "style",
        "wise",
        "fold",
        "shot",
        "step",
        "time",
        "world",
        "source",
        "domain",
        "task",
        "modal",
        "intensive",
        "efficient",
        "agnostic",
        "invariant",
        "sensitive",
        "grained",
        "agent",
        "site",
    ]
    .into_iter()
    .collect()
});

/// Replace typographic ligature code points with their letter sequences.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Repair hyphenated line breaks while keeping deliberate compounds.
///
/// - `"informa- tion"` or `"informa-\ntion"` → `"information"` (syllable break)
/// - `"model- based"` → `"model-based"` (compound word)
/// - `"Cross-\nModal"` → `"Cross-Modal"` (capitalized continuation)
/// - `"informa-\ntion-\nal"` → `"informational"` (word split twice)
pub fn fix_hyphenation(text: &str) -> String {
    fix_hyphenation_with_config(text, &InferenceConfig::default())
}

/// [`fix_hyphenation`] with an explicit config.
pub(crate) fn fix_hyphenation_with_config(text: &str, config: &InferenceConfig) -> String {
    // A word char, a hyphen at a space or line break, then the continuation.
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)-\s+(\w+)").unwrap());

    let defaults: Vec<String> = COMPOUND_SUFFIXES.iter().map(|s| s.to_string()).collect();
    let suffix_set: HashSet<String> = config
        .compound_suffixes
        .resolve(&defaults)
        .into_iter()
        .collect();

    // Each match consumes its continuation word, so a word split across
    // three or more lines still holds a break after one pass. Rewrites only
    // shorten the text; repeat until a pass changes nothing.
    let mut text = text.to_string();
    loop {
        let next = RE.replace_all(&text, |caps: &regex::Captures| {
            let before = &caps[1];
            let after = &caps[2];

            // A digit before the hyphen means a product or model name ("T5-XXL").
            let keep = before.chars().next_back().is_some_and(|c| c.is_ascii_digit())
                // An uppercase continuation is a compound split by the break.
                || after.chars().next().is_some_and(|c| c.is_uppercase())
                // So is a continuation from the compound suffix list.
                || suffix_set.contains(after.to_lowercase().as_str());

            if keep {
                format!("{}-{}", before, after)
            } else {
                // A plain lowercase continuation is a syllable break.
                format!("{}{}", before, after)
            }
        });
        if next == text {
            break;
        }
        text = next.into_owned();
    }
    text
}

/// Drop control characters, keeping the whitespace ones the later collapse
/// step normalizes.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

/// Normalize extracted document text for model input.
///
/// Expands ligatures, repairs hyphenation across line breaks, strips control
/// characters, and collapses whitespace runs to single spaces. Deterministic
/// and idempotent: `clean_text(clean_text(x)) == clean_text(x)`.
pub fn clean_text(text: &str) -> String {
    clean_text_with_config(text, &InferenceConfig::default())
}

/// [`clean_text`] with an explicit config.
pub(crate) fn clean_text_with_config(text: &str, config: &InferenceConfig) -> String {
    let text = expand_ligatures(text);
    let text = strip_control_chars(&text);
    // Hyphenation repair must see the original line breaks
    let text = fix_hyphenation_with_config(&text, config);

    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS_RE.replace_all(&text, " ").trim().to_string()
}
