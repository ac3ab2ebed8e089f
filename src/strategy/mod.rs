//! Named reduction strategies.
//!
//! A strategy runs one map-reduce pass per facet (summary, key points,
//! highlights) over a shared chunk sequence. The set of strategies is fixed;
//! [`StrategyKind`] names them and [`create_strategy`] builds them.

mod facet;
mod prompt;

pub(crate) use facet::style_variables;
pub(crate) use prompt::custom_template;
pub use facet::{Facet, FacetReducer, TemplateCombiner};
pub use prompt::PromptStrategy;

use crate::chunking::{Chunk, ChunkingConfig};
use crate::config::Prompts;
use crate::error::{RecapError, Result};
use crate::model::LanguageModel;
use crate::reduce::MapReduce;
use crate::summary::{StrategyResult, StyleConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Capability shared by every strategy, so the ensemble can run them interchangeably.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Chunk size and overlap this strategy wants for a transcript of `length` characters.
    fn chunking(&self, length: usize, base: ChunkingConfig) -> ChunkingConfig;

    /// Produce summary, key points and highlights from `chunks`.
    async fn run(&self, chunks: &[Chunk], style: &StyleConfig) -> Result<StrategyResult>;
}

/// Strategy names accepted by the summarize entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Section-by-section summarization.
    General,
    /// Speaker-aware summarization for conversations.
    Discourse,
    /// Outline-first summarization for long transcripts.
    Hierarchical,
    /// Every available strategy, merged.
    Ensemble,
    /// Chosen from transcript features.
    Auto,
}

impl StrategyKind {
    /// Strategies that run on their own.
    pub const SINGLE: [StrategyKind; 3] = [
        StrategyKind::General,
        StrategyKind::Discourse,
        StrategyKind::Hierarchical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::General => "general",
            StrategyKind::Discourse => "discourse",
            StrategyKind::Hierarchical => "hierarchical",
            StrategyKind::Ensemble => "ensemble",
            StrategyKind::Auto => "auto",
        }
    }

    pub fn is_single(&self) -> bool {
        Self::SINGLE.contains(self)
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::General => "Section-by-section summary for ordinary transcripts",
            StrategyKind::Discourse => "Speaker-aware summary for interviews and panels",
            StrategyKind::Hierarchical => "Outline-first summary for long transcripts",
            StrategyKind::Ensemble => "Runs every available strategy and merges the results",
            StrategyKind::Auto => "Picks a strategy from transcript features",
        }
    }

    /// Chunking policy. Only the hierarchical strategy scales with length.
    pub fn chunking(&self, length: usize, base: ChunkingConfig) -> ChunkingConfig {
        match self {
            StrategyKind::Hierarchical if length > 100_000 => ChunkingConfig::new(6000, 800),
            StrategyKind::Hierarchical if length > 50_000 => ChunkingConfig::new(5000, 600),
            _ => base,
        }
    }

    /// Parse a list of configured names, rejecting anything that is not a single strategy.
    pub fn parse_available<S: AsRef<str>>(names: &[S]) -> Result<Vec<StrategyKind>> {
        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            let kind: StrategyKind = name.as_ref().parse()?;
            if !kind.is_single() {
                return Err(RecapError::Config(format!(
                    "'{}' cannot be listed as an available strategy",
                    kind
                )));
            }
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = RecapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(StrategyKind::General),
            "discourse" => Ok(StrategyKind::Discourse),
            "hierarchical" => Ok(StrategyKind::Hierarchical),
            "ensemble" => Ok(StrategyKind::Ensemble),
            "auto" => Ok(StrategyKind::Auto),
            _ => Err(RecapError::InvalidInput(format!("Unknown strategy: {}", s))),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build a single strategy from the fixed table.
pub fn create_strategy(
    kind: StrategyKind,
    model: Arc<dyn LanguageModel>,
    prompts: &Prompts,
    engine: MapReduce,
) -> Result<Arc<dyn Strategy>> {
    let templates = prompts.strategy(kind.as_str()).ok_or_else(|| {
        RecapError::InvalidInput(format!("'{}' is not a single strategy", kind))
    })?;

    Ok(Arc::new(PromptStrategy::new(
        kind,
        templates.clone(),
        prompts.variables.clone(),
        model,
        engine,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("General".parse::<StrategyKind>().unwrap(), StrategyKind::General);
        assert_eq!(" auto ".parse::<StrategyKind>().unwrap(), StrategyKind::Auto);
        assert!(matches!(
            "langchain".parse::<StrategyKind>(),
            Err(RecapError::InvalidInput(_))
        ));
        assert_eq!(StrategyKind::Hierarchical.to_string(), "hierarchical");
    }

    #[test]
    fn test_hierarchical_chunking_scales() {
        let base = ChunkingConfig::new(3000, 300);
        let kind = StrategyKind::Hierarchical;
        assert_eq!(kind.chunking(120_000, base), ChunkingConfig::new(6000, 800));
        assert_eq!(kind.chunking(60_000, base), ChunkingConfig::new(5000, 600));
        assert_eq!(kind.chunking(50_000, base), base);
        assert_eq!(StrategyKind::Discourse.chunking(120_000, base), base);
    }

    #[test]
    fn test_parse_available() {
        let kinds = StrategyKind::parse_available(&["general", "discourse", "general"]).unwrap();
        assert_eq!(kinds, vec![StrategyKind::General, StrategyKind::Discourse]);
        assert!(StrategyKind::parse_available(&["ensemble"]).is_err());
    }
}
