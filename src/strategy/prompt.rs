//! The prompt-template strategy behind every named single strategy.

use super::facet::{style_variables, Facet, FacetReducer};
use super::{Strategy, StrategyKind};
use crate::chunking::{Chunk, ChunkingConfig};
use crate::config::{FacetPrompts, StrategyPrompts};
use crate::error::Result;
use crate::model::LanguageModel;
use crate::reduce::MapReduce;
use crate::summary::{parse_highlights, parse_key_points, StrategyResult, StyleConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// A strategy defined by its prompt templates and chunking policy.
pub struct PromptStrategy {
    kind: StrategyKind,
    templates: StrategyPrompts,
    variables: HashMap<String, String>,
    model: Arc<dyn LanguageModel>,
    engine: MapReduce,
}

impl PromptStrategy {
    pub fn new(
        kind: StrategyKind,
        templates: StrategyPrompts,
        variables: HashMap<String, String>,
        model: Arc<dyn LanguageModel>,
        engine: MapReduce,
    ) -> Self {
        Self {
            kind,
            templates,
            variables,
            model,
            engine,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn reducer(&self, facet: Facet, templates: &FacetPrompts, style: &StyleConfig) -> FacetReducer {
        FacetReducer::new(
            facet,
            templates,
            style_variables(&self.variables, style),
            Arc::clone(&self.model),
            style.temperature,
        )
        .speaker_aware(self.kind == StrategyKind::Discourse)
    }
}

/// A caller-supplied prompt as a template; the text goes after it unless placed explicitly.
pub(crate) fn custom_template(custom: &str) -> String {
    if custom.contains("{{text}}") {
        custom.to_string()
    } else {
        format!("{}\n\n{{{{text}}}}", custom)
    }
}

/// Summary templates, replaced by the caller's prompt when one is given.
fn summary_templates(default: &FacetPrompts, style: &StyleConfig) -> FacetPrompts {
    match &style.custom_prompt {
        Some(custom) => {
            let template = custom_template(custom);
            FacetPrompts {
                map: template.clone(),
                combine: template,
            }
        }
        None => default.clone(),
    }
}

#[async_trait]
impl Strategy for PromptStrategy {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn chunking(&self, length: usize, base: ChunkingConfig) -> ChunkingConfig {
        self.kind.chunking(length, base)
    }

    #[instrument(skip_all, fields(strategy = %self.kind, chunks = chunks.len()))]
    async fn run(&self, chunks: &[Chunk], style: &StyleConfig) -> Result<StrategyResult> {
        let summary_prompts = summary_templates(&self.templates.summary, style);
        let summary = self.reducer(Facet::Summary, &summary_prompts, style);
        let key_points = self.reducer(Facet::KeyPoints, &self.templates.key_points, style);
        let highlights = self.reducer(Facet::Highlights, &self.templates.highlights, style);

        let (summary_text, key_points_text, highlights_text) = tokio::try_join!(
            self.engine.reduce(chunks, &summary, &summary),
            self.engine.reduce(chunks, &key_points, &key_points),
            self.engine.reduce(chunks, &highlights, &highlights),
        )?;

        let result = StrategyResult::new(
            summary_text.trim().to_string(),
            parse_key_points(&key_points_text),
            parse_highlights(&highlights_text),
        );

        info!(
            "Strategy {} produced {} key points and {} highlights",
            self.kind,
            result.key_points.len(),
            result.highlights.len()
        );
        Ok(result)
    }
}
