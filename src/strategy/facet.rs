//! Prompt-driven map and combine operations for one facet.

use crate::chunking::Chunk;
use crate::config::{FacetPrompts, Prompts};
use crate::error::Result;
use crate::model::LanguageModel;
use crate::reduce::{Combiner, Mapper};
use crate::selector::speaker_labels;
use crate::summary::StyleConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One of the three independent outputs of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Summary,
    KeyPoints,
    Highlights,
}

impl Facet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Summary => "summary",
            Facet::KeyPoints => "key_points",
            Facet::Highlights => "highlights",
        }
    }
}

/// Variables shared by every template rendered for one request.
pub(crate) fn style_variables(
    custom: &HashMap<String, String>,
    style: &StyleConfig,
) -> HashMap<String, String> {
    let mut vars = custom.clone();
    vars.insert("detail".to_string(), style.detail.to_string());
    vars.insert("label".to_string(), style.detail.label().to_string());
    vars.insert("paragraphs".to_string(), style.detail.paragraphs().to_string());
    vars.insert(
        "instruction".to_string(),
        style.detail.section_instruction().to_string(),
    );
    vars
}

/// Renders a combine template over a group of documents and invokes the model.
pub struct TemplateCombiner {
    template: String,
    variables: HashMap<String, String>,
    model: Arc<dyn LanguageModel>,
    temperature: f32,
    separator: &'static str,
}

impl TemplateCombiner {
    pub fn new(
        template: impl Into<String>,
        variables: HashMap<String, String>,
        model: Arc<dyn LanguageModel>,
        temperature: f32,
    ) -> Self {
        Self {
            template: template.into(),
            variables,
            model,
            temperature,
            separator: "\n\n",
        }
    }

    /// Join documents with `separator` instead of a blank line.
    pub fn with_separator(mut self, separator: &'static str) -> Self {
        self.separator = separator;
        self
    }
}

#[async_trait]
impl Combiner for TemplateCombiner {
    async fn combine(&self, documents: &[String]) -> Result<String> {
        let mut vars = self.variables.clone();
        vars.insert("text".to_string(), documents.join(self.separator));
        let prompt = Prompts::render(&self.template, &vars);
        debug!("Combining {} documents", documents.len());
        self.model.invoke(&prompt, self.temperature).await
    }
}

/// Map and combine for one facet of one strategy run.
pub struct FacetReducer {
    facet: Facet,
    map_template: String,
    combiner: TemplateCombiner,
    speaker_aware: bool,
}

impl FacetReducer {
    pub fn new(
        facet: Facet,
        templates: &FacetPrompts,
        variables: HashMap<String, String>,
        model: Arc<dyn LanguageModel>,
        temperature: f32,
    ) -> Self {
        let separator = match facet {
            Facet::Summary => "\n\n",
            Facet::KeyPoints | Facet::Highlights => "\n",
        };
        Self {
            facet,
            map_template: templates.map.clone(),
            combiner: TemplateCombiner::new(templates.combine.clone(), variables, model, temperature)
                .with_separator(separator),
            speaker_aware: false,
        }
    }

    /// Fill `{{speakers}}` with the labels found in each chunk.
    pub fn speaker_aware(mut self, enabled: bool) -> Self {
        self.speaker_aware = enabled;
        self
    }

    pub fn facet(&self) -> Facet {
        self.facet
    }

    fn chunk_variables(&self, chunk: &Chunk) -> HashMap<String, String> {
        let mut vars = self.combiner.variables.clone();
        vars.insert("chunk_index".to_string(), chunk.index.to_string());
        vars.insert("chunk_total".to_string(), chunk.total.to_string());
        vars.insert("position".to_string(), chunk.position().to_string());
        let speakers = if self.speaker_aware {
            let labels = speaker_labels(&chunk.text);
            if labels.is_empty() {
                "unknown".to_string()
            } else {
                labels.join(", ")
            }
        } else {
            String::new()
        };
        vars.insert("speakers".to_string(), speakers);
        vars.insert("text".to_string(), chunk.text.clone());
        vars
    }
}

#[async_trait]
impl Mapper for FacetReducer {
    async fn map(&self, chunk: &Chunk) -> Result<String> {
        let prompt = Prompts::render(&self.map_template, &self.chunk_variables(chunk));
        debug!(
            "Mapping {} for chunk {}/{}",
            self.facet.as_str(),
            chunk.index,
            chunk.total
        );
        self.combiner
            .model
            .invoke(&prompt, self.combiner.temperature)
            .await
    }
}

#[async_trait]
impl Combiner for FacetReducer {
    async fn combine(&self, documents: &[String]) -> Result<String> {
        self.combiner.combine(documents).await
    }
}
