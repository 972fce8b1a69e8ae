use regex::Regex;
use thiserror::Error;

/// How a configurable list relates to its built-in defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Keep the built-in defaults as-is.
    #[default]
    Default,
    /// Discard the defaults and use these values instead.
    Replace(Vec<T>),
    /// Add these values after the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Produce the effective list given the built-in defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("title band ratio must be in (0, 1], got {0}")]
    InvalidBandRatio(f32),
}

/// Configuration for the structural inference pipeline.
///
/// Pattern lists default to the built-in sets near their point of use; use
/// [`InferenceConfigBuilder`] to extend or replace them with string patterns.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    // ── title.rs ──
    /// How many leading pages are scanned for title/author inference.
    pub(crate) max_pages: usize,
    /// A page-0 span qualifies as a title candidate when its font size is at
    /// least this fraction of the page-0 maximum.
    pub(crate) title_band_ratio: f32,
    /// Spans with `order_index` at or beyond this cutoff never start a title.
    pub(crate) title_order_cutoff: usize,
    /// Patterns that disqualify a span from the title block.
    pub(crate) non_title_patterns: ListOverride<Regex>,

    // ── authors.rs ──
    /// Maximum number of author names retained (default: 15).
    pub(crate) max_authors: usize,
    /// Keywords marking a span as an affiliation line rather than a name.
    pub(crate) affiliation_keywords: ListOverride<String>,

    // ── text_processing.rs ──
    /// Suffixes of hyphenated compounds whose hyphen must survive cleanup.
    pub(crate) compound_suffixes: ListOverride<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_pages: 2,
            title_band_ratio: 0.9,
            title_order_cutoff: 10,
            non_title_patterns: ListOverride::Default,
            max_authors: 15,
            affiliation_keywords: ListOverride::Default,
            compound_suffixes: ListOverride::Default,
        }
    }
}

impl InferenceConfig {
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn title_band_ratio(&self) -> f32 {
        self.title_band_ratio
    }
}

/// Builder for [`InferenceConfig`].
///
/// Takes string patterns and compiles them to `Regex` in [`build()`](Self::build),
/// which fails with [`ConfigError`] on an invalid pattern or threshold.
#[derive(Debug, Clone, Default)]
pub struct InferenceConfigBuilder {
    max_pages: Option<usize>,
    title_band_ratio: Option<f32>,
    title_order_cutoff: Option<usize>,
    non_title_patterns: ListOverrideBuilder,
    max_authors: Option<usize>,
    affiliation_keywords: ListOverridePlainBuilder,
    compound_suffixes: ListOverridePlainBuilder,
}

/// Uncompiled form of `ListOverride<Regex>`, held as string patterns.
#[derive(Debug, Clone, Default)]
enum ListOverrideBuilder {
    #[default]
    Default,
    Replace(Vec<String>),
    Extend(Vec<String>),
}

/// Uncompiled form of `ListOverride<String>`.
#[derive(Debug, Clone, Default)]
enum ListOverridePlainBuilder {
    #[default]
    Default,
    Replace(Vec<String>),
    Extend(Vec<String>),
}

impl InferenceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scalars ──

    pub fn max_pages(mut self, n: usize) -> Self {
        self.max_pages = Some(n);
        self
    }

    pub fn title_band_ratio(mut self, ratio: f32) -> Self {
        self.title_band_ratio = Some(ratio);
        self
    }

    pub fn title_order_cutoff(mut self, n: usize) -> Self {
        self.title_order_cutoff = Some(n);
        self
    }

    pub fn max_authors(mut self, n: usize) -> Self {
        self.max_authors = Some(n);
        self
    }

    // ── Non-title patterns ──

    pub fn set_non_title_patterns(mut self, patterns: Vec<String>) -> Self {
        self.non_title_patterns = ListOverrideBuilder::Replace(patterns);
        self
    }

    pub fn add_non_title_pattern(mut self, pattern: String) -> Self {
        match &mut self.non_title_patterns {
            ListOverrideBuilder::Extend(v) => v.push(pattern),
            _ => self.non_title_patterns = ListOverrideBuilder::Extend(vec![pattern]),
        }
        self
    }

    // ── Affiliation keywords ──

    pub fn set_affiliation_keywords(mut self, keywords: Vec<String>) -> Self {
        self.affiliation_keywords = ListOverridePlainBuilder::Replace(keywords);
        self
    }

    pub fn add_affiliation_keyword(mut self, keyword: String) -> Self {
        match &mut self.affiliation_keywords {
            ListOverridePlainBuilder::Extend(v) => v.push(keyword),
            _ => self.affiliation_keywords = ListOverridePlainBuilder::Extend(vec![keyword]),
        }
        self
    }

    // ── Compound suffixes ──

    pub fn set_compound_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.compound_suffixes = ListOverridePlainBuilder::Replace(suffixes);
        self
    }

    pub fn add_compound_suffix(mut self, suffix: String) -> Self {
        match &mut self.compound_suffixes {
            ListOverridePlainBuilder::Extend(v) => v.push(suffix),
            _ => self.compound_suffixes = ListOverridePlainBuilder::Extend(vec![suffix]),
        }
        self
    }

    /// Validate thresholds, compile the pattern lists, and produce an
    /// [`InferenceConfig`].
    pub fn build(self) -> Result<InferenceConfig, ConfigError> {
        let compile_list =
            |builder: ListOverrideBuilder| -> Result<ListOverride<Regex>, regex::Error> {
                match builder {
                    ListOverrideBuilder::Default => Ok(ListOverride::Default),
                    ListOverrideBuilder::Replace(patterns) => {
                        let regexes: Result<Vec<_>, _> =
                            patterns.iter().map(|p| Regex::new(p)).collect();
                        Ok(ListOverride::Replace(regexes?))
                    }
                    ListOverrideBuilder::Extend(patterns) => {
                        let regexes: Result<Vec<_>, _> =
                            patterns.iter().map(|p| Regex::new(p)).collect();
                        Ok(ListOverride::Extend(regexes?))
                    }
                }
            };

        let compile_plain = |builder: ListOverridePlainBuilder| -> ListOverride<String> {
            match builder {
                ListOverridePlainBuilder::Default => ListOverride::Default,
                ListOverridePlainBuilder::Replace(v) => ListOverride::Replace(v),
                ListOverridePlainBuilder::Extend(v) => ListOverride::Extend(v),
            }
        };

        let title_band_ratio = self.title_band_ratio.unwrap_or(0.9);
        if !(title_band_ratio > 0.0 && title_band_ratio <= 1.0) {
            return Err(ConfigError::InvalidBandRatio(title_band_ratio));
        }

        Ok(InferenceConfig {
            max_pages: self.max_pages.unwrap_or(2),
            title_band_ratio,
            title_order_cutoff: self.title_order_cutoff.unwrap_or(10),
            non_title_patterns: compile_list(self.non_title_patterns)?,
            max_authors: self.max_authors.unwrap_or(15),
            affiliation_keywords: compile_plain(self.affiliation_keywords),
            compound_suffixes: compile_plain(self.compound_suffixes),
        })
    }
}
