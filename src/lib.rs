//! Recap - structured digests of long spoken-word transcripts
//!
//! Turns a long, noisy transcript into a narrative summary, numbered key
//! points and memorable highlights by driving a language model through a
//! token-budgeted map-reduce.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `chunking` - Overlapping, boundary-aware transcript splitting
//! - `tokens` - Token cost estimation
//! - `model` - Language model abstraction and OpenAI client
//! - `reduce` - Map, collapse and final-combine engine
//! - `summary` - Results, key points and style options
//! - `strategy` - Named reduction strategies
//! - `selector` - Transcript features and auto-selection
//! - `ensemble` - Multi-strategy execution and merging
//! - `orchestrator` - The summarize entry point
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::orchestrator::Orchestrator;
//! use recap::summary::StyleConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let transcript = std::fs::read_to_string("episode.txt")?;
//!     let digest = orchestrator
//!         .summarize(&transcript, "auto", &StyleConfig::default())
//!         .await?;
//!     println!("{}", digest.summary());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod reduce;
pub mod selector;
pub mod strategy;
pub mod summary;
pub mod tokens;

pub use error::{RecapError, Result};
