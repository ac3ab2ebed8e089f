//! Configuration settings for Recap.

use crate::chunking::ChunkingConfig;
use crate::error::{RecapError, Result};
use crate::summary::{DetailLevel, StyleConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub summarization: SummarizationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Chat completion model name.
    pub name: String,
    /// Default sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum model calls in flight across all strategies and facets.
    pub max_in_flight: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout_seconds: 300,
            max_in_flight: 4,
        }
    }
}

/// Summarization pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    /// Strategy name, or "auto" to pick one from transcript features.
    pub strategy: String,
    /// Verbosity tier (brief, standard, detailed).
    pub detail_level: String,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters of trailing context repeated at the start of the next chunk.
    pub chunk_overlap: usize,
    /// Maximum estimated tokens passed to any single combine call.
    pub token_budget: usize,
    /// Maximum concurrent map or combine tasks per reduction.
    pub max_concurrent_chunks: usize,
    /// Transcripts longer than this (in characters) favor the hierarchical strategy.
    pub long_transcript_threshold: usize,
    /// Strategies available to auto-selection and ensemble runs.
    pub available_strategies: Vec<String>,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            strategy: "auto".to_string(),
            detail_level: "standard".to_string(),
            chunk_size: 4000,
            chunk_overlap: 500,
            token_budget: 3000,
            max_concurrent_chunks: 4,
            long_transcript_threshold: 50_000,
            available_strategies: vec![
                "general".to_string(),
                "discourse".to_string(),
                "hierarchical".to_string(),
            ],
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RecapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Reject values the reducer cannot work with.
    pub fn validate(&self) -> Result<()> {
        let s = &self.summarization;
        if s.chunk_size == 0 {
            return Err(RecapError::Config("chunk_size must be positive".to_string()));
        }
        if s.chunk_overlap >= s.chunk_size {
            return Err(RecapError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                s.chunk_overlap, s.chunk_size
            )));
        }
        if s.token_budget == 0 {
            return Err(RecapError::Config("token_budget must be positive".to_string()));
        }
        if s.max_concurrent_chunks == 0 || self.model.max_in_flight == 0 {
            return Err(RecapError::Config(
                "max_concurrent_chunks and max_in_flight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Chunk size and overlap as a splitter configuration.
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(
            self.summarization.chunk_size,
            self.summarization.chunk_overlap,
        )
    }

    /// Configured detail level; unknown values fall back to standard.
    pub fn detail_level(&self) -> DetailLevel {
        self.summarization
            .detail_level
            .parse()
            .unwrap_or_else(|e| {
                warn!("{}, using standard", e);
                DetailLevel::Standard
            })
    }

    /// Default per-request style derived from the configuration.
    pub fn style(&self) -> StyleConfig {
        StyleConfig::new(self.detail_level()).with_temperature(self.model.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.name, "gpt-4o-mini");
        assert_eq!(settings.summarization.strategy, "auto");
        assert_eq!(settings.summarization.token_budget, 3000);
        assert_eq!(settings.summarization.available_strategies.len(), 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.summarization.chunk_size, 4000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[summarization]\nstrategy = \"ensemble\"\ntoken_budget = 1200\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.summarization.strategy, "ensemble");
        assert_eq!(settings.summarization.token_budget, 1200);
        assert_eq!(settings.summarization.chunk_overlap, 500);
        assert_eq!(settings.model.max_in_flight, 4);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.model.name = "gpt-4o".to_string();
        settings
            .prompts
            .variables
            .insert("show".to_string(), "Deep Water".to_string());
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.model.name, "gpt-4o");
        assert_eq!(reloaded.prompts.variables["show"], "Deep Water");
    }

    #[test]
    fn test_validate_rejects_bad_chunking() {
        let mut settings = Settings::default();
        settings.summarization.chunk_overlap = settings.summarization.chunk_size;
        assert!(matches!(settings.validate(), Err(RecapError::Config(_))));

        let mut settings = Settings::default();
        settings.summarization.token_budget = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_detail_level_falls_back() {
        let mut settings = Settings::default();
        settings.summarization.detail_level = "exhaustive".to_string();
        assert_eq!(settings.detail_level(), DetailLevel::Standard);

        settings.summarization.detail_level = "Brief".to_string();
        assert_eq!(settings.style().detail, DetailLevel::Brief);
    }
}
