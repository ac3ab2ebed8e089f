//! Concurrent execution of several strategies and merging of their outputs.

mod dedup;

pub use dedup::{deduplicate_highlights, jaccard, DUPLICATE_THRESHOLD};

use crate::chunking::Chunk;
use crate::config::EnsemblePrompts;
use crate::error::{RecapError, Result};
use crate::model::LanguageModel;
use crate::reduce::{CollapseSet, MapReduce};
use crate::strategy::{custom_template, style_variables, Strategy, TemplateCombiner};
use crate::summary::{
    parse_highlights, parse_key_points, EnsembleResult, KeyPoints, StrategyResult, StyleConfig,
};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Highlights kept without a selection call.
const MAX_DIRECT_HIGHLIGHTS: usize = 5;

/// Key points kept when the merge call fails.
const MAX_FALLBACK_KEY_POINTS: usize = 7;

/// Runs strategies concurrently and merges whatever subset succeeds.
pub struct Ensemble {
    strategies: Vec<Arc<dyn Strategy>>,
    model: Arc<dyn LanguageModel>,
    prompts: EnsemblePrompts,
    variables: HashMap<String, String>,
    engine: MapReduce,
}

impl Ensemble {
    pub fn new(
        strategies: Vec<Arc<dyn Strategy>>,
        model: Arc<dyn LanguageModel>,
        prompts: EnsemblePrompts,
        variables: HashMap<String, String>,
        engine: MapReduce,
    ) -> Self {
        Self {
            strategies,
            model,
            prompts,
            variables,
            engine,
        }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run every strategy over `chunks` and merge the survivors.
    ///
    /// Fails only when no strategy succeeds or the request is cancelled.
    #[instrument(skip_all, fields(strategies = self.strategies.len(), chunks = chunks.len()))]
    pub async fn run_ensemble(&self, chunks: &[Chunk], style: &StyleConfig) -> Result<EnsembleResult> {
        let survivors = self.run_strategies(chunks, style).await?;
        let contributors: Vec<String> = survivors.iter().map(|(name, _)| name.clone()).collect();
        let results: Vec<StrategyResult> = survivors.into_iter().map(|(_, r)| r).collect();

        let vars = style_variables(&self.variables, style);
        let (summary, key_points, highlights) = tokio::join!(
            self.merge_summaries(&contributors, &results, &vars, style),
            self.merge_key_points(&results, &vars, style.temperature),
            self.merge_highlights(&results, &vars, style.temperature),
        );

        info!("Ensemble merged {} strategies: {}", contributors.len(), contributors.join(", "));
        EnsembleResult::new(StrategyResult::new(summary?, key_points?, highlights?), contributors)
    }

    async fn run_strategies(
        &self,
        chunks: &[Chunk],
        style: &StyleConfig,
    ) -> Result<Vec<(String, StrategyResult)>> {
        let cancel = self.engine.cancellation();

        let runs = self.strategies.iter().map(|strategy| async move {
            if cancel.is_cancelled() {
                return (strategy.name().to_string(), Err(RecapError::Cancelled));
            }
            (strategy.name().to_string(), strategy.run(chunks, style).await)
        });
        let outcomes = join_all(runs).await;

        if cancel.is_cancelled() {
            warn!("Ensemble cancelled");
            return Err(RecapError::Cancelled);
        }

        let attempted = outcomes.len();
        let mut survivors = Vec::with_capacity(attempted);
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => survivors.push((name, result)),
                Err(e) => warn!("Strategy {} failed and is left out of the ensemble: {}", name, e),
            }
        }

        if survivors.is_empty() {
            error!("All {} ensemble strategies failed", attempted);
            return Err(RecapError::NoStrategiesSucceeded { attempted });
        }
        Ok(survivors)
    }

    /// Reconcile the labeled summaries with one more reduction.
    ///
    /// A custom prompt on `style` replaces the merge template, so the final
    /// summary follows the caller's instructions too.
    async fn merge_summaries(
        &self,
        names: &[String],
        results: &[StrategyResult],
        vars: &HashMap<String, String>,
        style: &StyleConfig,
    ) -> Result<String> {
        let labeled: Vec<String> = names
            .iter()
            .zip(results)
            .map(|(name, r)| format!("{} SUMMARY:\n{}", name.to_uppercase(), r.summary))
            .collect();

        let template = match &style.custom_prompt {
            Some(custom) => custom_template(custom),
            None => self.prompts.summary.clone(),
        };
        let combiner = self.combiner(&template, vars, style.temperature);
        let merged = self
            .engine
            .reduce_documents(CollapseSet::new(labeled), &combiner)
            .await
            .map(|text| text.trim().to_string());

        or_fallback(merged, "summary", || results[0].summary.clone())
    }

    async fn merge_key_points(
        &self,
        results: &[StrategyResult],
        vars: &HashMap<String, String>,
        temperature: f32,
    ) -> Result<KeyPoints> {
        let points: Vec<String> = results
            .iter()
            .flat_map(|r| r.key_points.texts())
            .map(str::to_string)
            .collect();
        if points.is_empty() {
            return Ok(KeyPoints::new());
        }

        let combiner = self
            .combiner(&self.prompts.key_points, vars, temperature)
            .with_separator("\n");
        let documents = points.iter().map(|p| format!("- {}", p)).collect();
        let merged = self
            .engine
            .reduce_documents(CollapseSet::new(documents), &combiner)
            .await
            .and_then(|text| non_empty(parse_key_points(&text), KeyPoints::is_empty));

        or_fallback(merged, "key points", || {
            let mut seen = HashSet::new();
            KeyPoints::from_texts(
                points
                    .iter()
                    .filter(|p| seen.insert(p.trim().to_lowercase()))
                    .take(MAX_FALLBACK_KEY_POINTS)
                    .cloned(),
            )
        })
    }

    /// Deduplicate, and only ask the model to choose when too many remain.
    async fn merge_highlights(
        &self,
        results: &[StrategyResult],
        vars: &HashMap<String, String>,
        temperature: f32,
    ) -> Result<Vec<String>> {
        let all: Vec<&str> = results
            .iter()
            .flat_map(|r| r.highlights.iter().map(String::as_str))
            .collect();
        let unique = deduplicate_highlights(&all);
        if unique.len() <= MAX_DIRECT_HIGHLIGHTS {
            return Ok(unique);
        }

        let combiner = self
            .combiner(&self.prompts.highlights, vars, temperature)
            .with_separator("\n");
        let merged = self
            .engine
            .reduce_documents(CollapseSet::new(unique.clone()), &combiner)
            .await
            .and_then(|text| non_empty(parse_highlights(&text), Vec::is_empty));

        or_fallback(merged, "highlights", || {
            unique.into_iter().take(MAX_DIRECT_HIGHLIGHTS).collect()
        })
    }

    fn combiner(
        &self,
        template: &str,
        vars: &HashMap<String, String>,
        temperature: f32,
    ) -> TemplateCombiner {
        TemplateCombiner::new(template, vars.clone(), Arc::clone(&self.model), temperature)
    }
}

fn non_empty<T>(value: T, is_empty: impl Fn(&T) -> bool) -> Result<T> {
    if is_empty(&value) {
        Err(RecapError::Model("merge response had no usable content".to_string()))
    } else {
        Ok(value)
    }
}

/// Keep a merge result, or fall back when the merge call failed. Cancellation still propagates.
fn or_fallback<T>(merged: Result<T>, facet: &str, fallback: impl FnOnce() -> T) -> Result<T> {
    match merged {
        Ok(value) => Ok(value),
        Err(RecapError::Cancelled) => Err(RecapError::Cancelled),
        Err(e) => {
            warn!("Ensemble {} merge failed, using fallback: {}", facet, e);
            Ok(fallback())
        }
    }
}
