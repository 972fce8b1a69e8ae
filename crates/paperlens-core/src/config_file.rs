use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ProcessingOptions;

/// TOML configuration as it appears on disk.
/// Every field is optional, so a partial file overlays the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub batch: Option<BatchConfig>,
    pub similarity: Option<SimilarityConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    pub concurrency: Option<usize>,
    pub max_pages: Option<usize>,
    pub token_cap: Option<usize>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub metric: Option<String>,
    pub threshold: Option<f64>,
}

/// Platform config directory path: `<config_dir>/paperlens/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperlens").join("config.toml"))
}

/// Load configuration, with a CWD `.paperlens.toml` taking precedence
/// over the platform-level file.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".paperlens.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Read one config file. A missing or unparseable file yields `None`.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs field by field, `overlay` winning where both are set.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        batch: Some(BatchConfig {
            concurrency: overlay
                .batch
                .as_ref()
                .and_then(|b| b.concurrency)
                .or_else(|| base.batch.as_ref().and_then(|b| b.concurrency)),
            max_pages: overlay
                .batch
                .as_ref()
                .and_then(|b| b.max_pages)
                .or_else(|| base.batch.as_ref().and_then(|b| b.max_pages)),
            token_cap: overlay
                .batch
                .as_ref()
                .and_then(|b| b.token_cap)
                .or_else(|| base.batch.as_ref().and_then(|b| b.token_cap)),
            top_k: overlay
                .batch
                .as_ref()
                .and_then(|b| b.top_k)
                .or_else(|| base.batch.as_ref().and_then(|b| b.top_k)),
        }),
        similarity: Some(SimilarityConfig {
            metric: overlay
                .similarity
                .as_ref()
                .and_then(|s| s.metric.clone())
                .or_else(|| base.similarity.as_ref().and_then(|s| s.metric.clone())),
            threshold: overlay
                .similarity
                .as_ref()
                .and_then(|s| s.threshold)
                .or_else(|| base.similarity.as_ref().and_then(|s| s.threshold)),
        }),
    }
}

/// Write the config to the platform config directory, creating it if needed.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
    Ok(path)
}

impl ProcessingOptions {
    /// Overlay file-provided values onto these options. Fields absent from
    /// the file keep their current values.
    pub fn apply(mut self, config: &ConfigFile) -> Self {
        if let Some(batch) = &config.batch {
            if let Some(concurrency) = batch.concurrency {
                self.concurrency = concurrency;
            }
            if let Some(max_pages) = batch.max_pages {
                self.max_pages = max_pages;
            }
            if let Some(token_cap) = batch.token_cap {
                self.token_cap = token_cap;
            }
            if let Some(top_k) = batch.top_k {
                self.top_k = top_k;
            }
        }
        self
    }
}
