//! Configuration module for Recap.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{EnsemblePrompts, FacetPrompts, Prompts, StrategyPrompts};
pub use settings::{
    GeneralSettings, ModelSettings, PromptSettings, Settings, SummarizationSettings,
};
