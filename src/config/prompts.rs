//! Prompt templates for Recap.
//!
//! Every strategy has a map and a combine template for each facet. Templates
//! can be customized by placing TOML files in the custom prompts directory;
//! a file only needs the keys it changes.

use super::Settings;
use crate::error::{RecapError, Result};
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub general: StrategyPrompts,
    pub discourse: StrategyPrompts,
    pub hierarchical: StrategyPrompts,
    pub ensemble: EnsemblePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            general: StrategyPrompts::general(),
            discourse: StrategyPrompts::discourse(),
            hierarchical: StrategyPrompts::hierarchical(),
            ensemble: EnsemblePrompts::default(),
            variables: HashMap::new(),
        }
    }
}

/// Map and combine templates for one facet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetPrompts {
    /// Applied to each chunk. Variables: text, chunk_index, chunk_total, position, speakers.
    pub map: String,
    /// Applied to groups of partial outputs and to the final set. Variable: text.
    pub combine: String,
}

impl FacetPrompts {
    fn new(map: &str, combine: &str) -> Self {
        Self {
            map: map.to_string(),
            combine: combine.to_string(),
        }
    }
}

/// Templates for the three facets of one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyPrompts {
    pub summary: FacetPrompts,
    pub key_points: FacetPrompts,
    pub highlights: FacetPrompts,
}

impl Default for StrategyPrompts {
    fn default() -> Self {
        Self::general()
    }
}

const KEY_POINTS_COMBINE: &str = r#"From these extracted takeaways, produce a consolidated list of 5-7 distinct key points covering the whole transcript.
- Merge duplicates and remove redundancy.
- Number each point ("1.", "2.", ...), one per line.
- Keep each point to one or two sentences and do not invent claims.

EXTRACTED TAKEAWAYS:
{{text}}

FINAL KEY POINTS (numbered list):"#;

const HIGHLIGHTS_MAP: &str = r#"You're reading part {{chunk_index}} of {{chunk_total}} ({{position}}) of a spoken-word transcript.

Extract the 1-2 most memorable DIRECT quotes from this section.
- Copy quotes verbatim, without paraphrasing.
- Return ONLY a numbered list of quotes, one per line.

TRANSCRIPT SECTION:
{{text}}

NUMBERED QUOTES:"#;

const HIGHLIGHTS_COMBINE: &str = r#"From the quotes below, select the 5-8 most memorable DIRECT quotes that capture the key insights or moments.
- Preserve exact wording.
- Return ONLY a numbered list of quotes, one per line.

EXTRACTED QUOTES:
{{text}}

FINAL NUMBERED QUOTES:"#;

impl StrategyPrompts {
    /// Section-by-section summarization for ordinary transcripts.
    pub fn general() -> Self {
        Self {
            summary: FacetPrompts::new(
                r#"You're summarizing part {{chunk_index}} of {{chunk_total}} ({{position}}) of a spoken-word transcript.

{{instruction}}

TRANSCRIPT SECTION:
{{text}}

{{label}} SECTION SUMMARY:"#,
                r#"Create a {{paragraphs}} paragraph summary of the transcript by combining these section summaries.
Capture the main topics, key points and conclusions.
Keep a cohesive narrative flow and eliminate redundancies between sections.

SECTION SUMMARIES:
{{text}}

FINAL {{label}} SUMMARY:"#,
            ),
            key_points: FacetPrompts::new(
                r#"You're analyzing part {{chunk_index}} of {{chunk_total}} ({{position}}) of a spoken-word transcript.

Identify 1-2 practical takeaways a listener could apply, based ONLY on this section.
Support each takeaway with a brief direct quote. If the section has no takeaway, reply "NO TAKEAWAY".

TRANSCRIPT SECTION:
{{text}}

TAKEAWAYS:"#,
                KEY_POINTS_COMBINE,
            ),
            highlights: FacetPrompts::new(HIGHLIGHTS_MAP, HIGHLIGHTS_COMBINE),
        }
    }

    /// Speaker-aware summarization for interviews and panel conversations.
    pub fn discourse() -> Self {
        Self {
            summary: FacetPrompts::new(
                r#"You're summarizing part {{chunk_index}} of {{chunk_total}} ({{position}}) of a conversation.
Speakers in this section: {{speakers}}

{{instruction}}
Attribute positions and arguments to the speaker who made them, and note where speakers agree or disagree.

TRANSCRIPT SECTION:
{{text}}

{{label}} SECTION SUMMARY:"#,
                r#"Create a {{paragraphs}} paragraph summary of this conversation by combining these section summaries.
Follow how the discussion develops between the speakers, keep attributions, and resolve repetition across sections.

SECTION SUMMARIES:
{{text}}

FINAL {{label}} SUMMARY:"#,
            ),
            key_points: FacetPrompts::new(
                r#"You're analyzing part {{chunk_index}} of {{chunk_total}} ({{position}}) of a conversation.
Speakers in this section: {{speakers}}

Identify 1-2 practical takeaways from this section and name the speaker behind each one.
Support each takeaway with a brief direct quote. If the section has no takeaway, reply "NO TAKEAWAY".

TRANSCRIPT SECTION:
{{text}}

TAKEAWAYS:"#,
                KEY_POINTS_COMBINE,
            ),
            highlights: FacetPrompts::new(
                r#"You're reading part {{chunk_index}} of {{chunk_total}} ({{position}}) of a conversation.
Speakers in this section: {{speakers}}

Extract the 1-2 most memorable DIRECT quotes from this section, each prefixed with its speaker when known.
- Copy quotes verbatim, without paraphrasing.
- Return ONLY a numbered list of quotes, one per line.

TRANSCRIPT SECTION:
{{text}}

NUMBERED QUOTES:"#,
                HIGHLIGHTS_COMBINE,
            ),
        }
    }

    /// Outline-first summarization for long transcripts.
    pub fn hierarchical() -> Self {
        Self {
            summary: FacetPrompts::new(
                r#"You're indexing part {{chunk_index}} of {{chunk_total}} ({{position}}) of a long transcript.

First list the topics this section covers as a short outline.
{{instruction}}

TRANSCRIPT SECTION:
{{text}}

SECTION OUTLINE AND {{label}} SUMMARY:"#,
                r#"These are outlines and summaries of consecutive parts of a long transcript.
Merge them into a {{paragraphs}} paragraph summary that follows the overall structure of the discussion from start to finish.
Group related topics that recur across parts.

PART SUMMARIES:
{{text}}

FINAL {{label}} SUMMARY:"#,
            ),
            key_points: FacetPrompts::new(
                r#"You're indexing part {{chunk_index}} of {{chunk_total}} ({{position}}) of a long transcript.

List the 1-3 most important claims or takeaways of this section, one per line, with a brief supporting quote each.

TRANSCRIPT SECTION:
{{text}}

TAKEAWAYS:"#,
                KEY_POINTS_COMBINE,
            ),
            highlights: FacetPrompts::new(HIGHLIGHTS_MAP, HIGHLIGHTS_COMBINE),
        }
    }
}

/// Templates for merging several strategies' outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsemblePrompts {
    /// Receives the labeled strategy summaries as {{text}}.
    pub summary: String,
    /// Receives the flattened key points as {{text}}.
    pub key_points: String,
    /// Receives the deduplicated highlights as {{text}}.
    pub highlights: String,
}

impl Default for EnsemblePrompts {
    fn default() -> Self {
        Self {
            summary: r#"Below are summaries of the same transcript produced by different summarization methods.
Create a {{paragraphs}} paragraph summary that incorporates the best insights from each and resolves any contradictions between them.
Keep a cohesive narrative flow.

{{text}}

FINAL {{label}} SUMMARY:"#
                .to_string(),
            key_points: r#"Below are key points about the same transcript produced by different summarization methods.
Merge them into 5-7 distinct, deduplicated key points.
Number each point ("1.", "2.", ...), one per line, and add no other text.

KEY POINTS:
{{text}}

MERGED KEY POINTS:"#
                .to_string(),
            highlights: r#"From the quotes below, select the 3-5 most memorable ones.
Preserve exact wording and return ONLY a numbered list, one quote per line.

QUOTES:
{{text}}

SELECTED QUOTES:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = Settings::expand_path(dir);

            prompts.general = overlay_file(prompts.general, &custom_path.join("general.toml"))?;
            prompts.discourse =
                overlay_file(prompts.discourse, &custom_path.join("discourse.toml"))?;
            prompts.hierarchical =
                overlay_file(prompts.hierarchical, &custom_path.join("hierarchical.toml"))?;
            prompts.ensemble = overlay_file(prompts.ensemble, &custom_path.join("ensemble.toml"))?;
        }

        Ok(prompts)
    }

    /// Templates for a named strategy.
    pub fn strategy(&self, name: &str) -> Option<&StrategyPrompts> {
        match name {
            "general" => Some(&self.general),
            "discourse" => Some(&self.discourse),
            "hierarchical" => Some(&self.hierarchical),
            _ => None,
        }
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is single-pass: text inserted for a placeholder is never
    /// scanned again. Unknown placeholders are left untouched.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Apply the keys present in a TOML file on top of `base`.
fn overlay_file<T: Serialize + DeserializeOwned>(base: T, path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(base);
    }
    debug!("Loading prompt overrides from {}", path.display());

    let content = std::fs::read_to_string(path)?;
    let patch: toml::Table = toml::from_str(&content)?;

    let mut merged = match toml::Value::try_from(&base) {
        Ok(toml::Value::Table(table)) => table,
        Ok(_) => return Err(RecapError::Config("prompt set is not a table".to_string())),
        Err(e) => return Err(RecapError::Config(e.to_string())),
    };
    merge_tables(&mut merged, patch);

    Ok(toml::Value::Table(merged).try_into()?)
}

fn merge_tables(base: &mut toml::Table, patch: toml::Table) {
    for (key, value) in patch {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
