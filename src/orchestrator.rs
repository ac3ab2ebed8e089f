//! Summarization orchestrator for Recap.
//!
//! Resolves the requested strategy, chunks the transcript and runs either a
//! single strategy or the ensemble.

use crate::chunking::split;
use crate::config::{Prompts, Settings};
use crate::ensemble::Ensemble;
use crate::error::{RecapError, Result};
use crate::model::{LanguageModel, OpenAIModel, ThrottledModel};
use crate::reduce::MapReduce;
use crate::selector::{analyze, recommend, Selection, TranscriptFeatures};
use crate::strategy::{create_strategy, Strategy, StrategyKind};
use crate::summary::{Digest, StyleConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, instrument, Instrument};
use uuid::Uuid;

/// The entry point for summarization requests.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    model: Arc<dyn LanguageModel>,
    available: Vec<StrategyKind>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Create an orchestrator backed by the configured OpenAI model.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let openai = OpenAIModel::with_timeout(
            &settings.model.name,
            Duration::from_secs(settings.model.timeout_seconds),
        )?;
        info!(
            "Using {} with at most {} calls in flight",
            settings.model.name, settings.model.max_in_flight
        );
        let model: Arc<dyn LanguageModel> =
            Arc::new(ThrottledModel::new(Arc::new(openai), settings.model.max_in_flight));

        Self::with_model(settings, prompts, model)
    }

    /// Create an orchestrator with a custom model.
    pub fn with_model(
        settings: Settings,
        prompts: Prompts,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        settings.validate()?;
        let available = StrategyKind::parse_available(&settings.summarization.available_strategies)?;

        Ok(Self {
            settings,
            prompts,
            model,
            available,
            cancel: CancellationToken::new(),
        })
    }

    /// Use `cancel` to stop new rounds and strategies from starting.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Strategies available to auto-selection and the ensemble.
    pub fn available_strategies(&self) -> &[StrategyKind] {
        &self.available
    }

    /// The strategy auto-selection would use for these features, with its reason.
    pub fn select_strategy(&self, features: &TranscriptFeatures) -> Selection {
        recommend(
            features,
            &self.available,
            self.settings.summarization.long_transcript_threshold,
        )
    }

    /// Summarize a transcript with a named strategy, "ensemble" or "auto".
    pub async fn summarize(
        &self,
        transcript: &str,
        strategy: &str,
        style: &StyleConfig,
    ) -> Result<Digest> {
        if transcript.trim().is_empty() {
            return Err(RecapError::InvalidInput(
                "Transcript is empty or whitespace only".to_string(),
            ));
        }
        let requested: StrategyKind = strategy.parse()?;

        let span = info_span!("summarize", request_id = %Uuid::new_v4(), strategy = %requested);
        self.run(transcript, requested, style).instrument(span).await
    }

    async fn run(
        &self,
        transcript: &str,
        requested: StrategyKind,
        style: &StyleConfig,
    ) -> Result<Digest> {
        let features = analyze(transcript);
        let kind = match requested {
            StrategyKind::Auto => {
                let selection = self.select_strategy(&features);
                info!(
                    "Auto-selected {}: {} (length {}, speakers {})",
                    selection.strategy, selection.reason, features.length, features.speaker_count
                );
                selection.strategy
            }
            other => other,
        };

        match kind {
            StrategyKind::Ensemble => self.run_ensemble(transcript, style).await,
            single => self.run_single(single, transcript, features.length, style).await,
        }
    }

    #[instrument(skip(self, transcript, style))]
    async fn run_single(
        &self,
        kind: StrategyKind,
        transcript: &str,
        length: usize,
        style: &StyleConfig,
    ) -> Result<Digest> {
        let strategy = create_strategy(kind, Arc::clone(&self.model), &self.prompts, self.engine())?;
        let config = strategy.chunking(length, self.settings.chunking());
        let chunks = split(transcript, config);
        info!(
            "Split transcript into {} chunks of ~{} chars",
            chunks.len(),
            config.chunk_size
        );

        let result = strategy.run(&chunks, style).await?;
        Ok(Digest::Single {
            strategy: strategy.name().to_string(),
            result,
        })
    }

    #[instrument(skip_all)]
    async fn run_ensemble(&self, transcript: &str, style: &StyleConfig) -> Result<Digest> {
        if self.available.is_empty() {
            return Err(RecapError::Config(
                "No strategies are available for an ensemble run".to_string(),
            ));
        }

        let strategies = self
            .available
            .iter()
            .map(|kind| create_strategy(*kind, Arc::clone(&self.model), &self.prompts, self.engine()))
            .collect::<Result<Vec<Arc<dyn Strategy>>>>()?;

        let chunks = split(transcript, self.settings.chunking());
        info!(
            "Running {} strategies over {} shared chunks",
            strategies.len(),
            chunks.len()
        );

        let ensemble = Ensemble::new(
            strategies,
            Arc::clone(&self.model),
            self.prompts.ensemble.clone(),
            self.prompts.variables.clone(),
            self.engine(),
        );
        Ok(Digest::Ensemble(ensemble.run_ensemble(&chunks, style).await?))
    }

    fn engine(&self) -> MapReduce {
        MapReduce::new(
            self.settings.summarization.token_budget,
            self.settings.summarization.max_concurrent_chunks,
        )
        .with_cancellation(self.cancel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        async fn invoke(&self, _prompt: &str, _temperature: f32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("1. Something worth noting".to_string())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn orchestrator(model: Arc<CountingModel>) -> Orchestrator {
        Orchestrator::with_model(Settings::default(), Prompts::default(), model).unwrap()
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected_before_any_call() {
        let model = Arc::new(CountingModel::default());
        let orchestrator = orchestrator(model.clone());

        for input in ["", "   \n\t "] {
            let err = orchestrator
                .summarize(input, "auto", &StyleConfig::default())
                .await
                .unwrap_err();
            assert!(matches!(err, RecapError::InvalidInput(_)));
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_strategy_rejected() {
        let model = Arc::new(CountingModel::default());
        let err = orchestrator(model.clone())
            .summarize("Some words.", "bart", &StyleConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::InvalidInput(_)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_picks_discourse_for_dialogue() {
        let model = Arc::new(CountingModel::default());
        let digest = orchestrator(model)
            .summarize(
                "Host: Welcome to the show.\nGuest: Glad to be here.\n",
                "auto",
                &StyleConfig::default(),
            )
            .await
            .unwrap();
        assert_eq!(digest.method(), "discourse");
    }

    #[tokio::test]
    async fn test_cancelled_request_fails() {
        let model = Arc::new(CountingModel::default());
        let cancel = CancellationToken::new();
        let orchestrator = orchestrator(model.clone()).with_cancellation(cancel.clone());
        cancel.cancel();

        let err = orchestrator
            .summarize("A short talk about rivers.", "general", &StyleConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::Cancelled));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.summarization.available_strategies = vec!["ensemble".to_string()];
        let result = Orchestrator::with_model(
            settings,
            Prompts::default(),
            Arc::new(CountingModel::default()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failed_final_combine_ends_single_strategy_request() {
        struct CombineFails;

        #[async_trait]
        impl LanguageModel for CombineFails {
            async fn invoke(&self, prompt: &str, _temperature: f32) -> Result<String> {
                if prompt.starts_with("Create a") {
                    return Err(RecapError::Model("provider unavailable".to_string()));
                }
                Ok("1. Something worth noting".to_string())
            }

            fn name(&self) -> &str {
                "combine-fails"
            }
        }

        let orchestrator =
            Orchestrator::with_model(Settings::default(), Prompts::default(), Arc::new(CombineFails))
                .unwrap();
        let err = orchestrator
            .summarize("A short talk about rivers.", "general", &StyleConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::Model(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_select_strategy_reports_reason() {
        let orchestrator = orchestrator(Arc::new(CountingModel::default()));
        let features = analyze("Host: Welcome.\nGuest: Thanks.\n");

        let selection = orchestrator.select_strategy(&features);
        assert_eq!(selection.strategy, StrategyKind::Discourse);
        assert_eq!(selection.reason, "Speaker annotations detected");
    }
}
