//! CLI module for Recap.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Recap - structured digests of long spoken-word transcripts
///
/// Splits a transcript, summarizes it piecewise with a language model and
/// recombines the pieces into a summary, key points and highlights.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a transcript file ("-" reads stdin)
    Summarize {
        /// Transcript file path, or "-" for stdin
        input: String,

        /// Strategy (auto, general, discourse, hierarchical, ensemble)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Detail level (brief, standard, detailed)
        #[arg(short, long)]
        detail: Option<String>,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Custom prompt replacing the summary templates
        #[arg(short, long)]
        prompt: Option<String>,

        /// Print the digest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show transcript features and the strategy auto-selection would pick
    Analyze {
        /// Transcript file path, or "-" for stdin
        input: String,
    },

    /// List the available summarization strategies
    Strategies,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
