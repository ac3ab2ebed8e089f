//! Summarize command implementation.

use super::read_transcript;
use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::RecapError;
use crate::orchestrator::Orchestrator;
use crate::summary::{Digest, DetailLevel, StyleConfig};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Digest plus run metadata, as printed with --json.
#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    digest: &'a Digest,
    execution_time_seconds: f64,
    generated_at: DateTime<Utc>,
}

/// Run the summarize command.
pub async fn run_summarize(
    input: &str,
    strategy: Option<String>,
    detail: Option<String>,
    temperature: Option<f32>,
    prompt: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Summarize) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let transcript = read_transcript(input)?;
    let style = build_style(&settings, detail.as_deref(), temperature, prompt)?;
    let strategy = strategy.unwrap_or_else(|| settings.summarization.strategy.clone());

    let cancel = CancellationToken::new();
    let orchestrator = Orchestrator::new(settings)?.with_cancellation(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight calls");
            cancel.cancel();
        }
    });

    let spinner = Output::spinner(&format!("Summarizing with strategy '{}'...", strategy));
    let started = Instant::now();
    let outcome = orchestrator.summarize(&transcript, &strategy, &style).await;
    spinner.finish_and_clear();

    let digest = match outcome {
        Ok(digest) => digest,
        Err(e) => {
            Output::error(&format!("Summarization failed: {}", e));
            return Err(e.into());
        }
    };
    let elapsed = started.elapsed().as_secs_f64();

    if json {
        let report = Report {
            digest: &digest,
            execution_time_seconds: elapsed,
            generated_at: Utc::now(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_digest(&digest);
        Output::success(&format!(
            "Done in {} ({})",
            format_duration(elapsed),
            digest.contributors().join(", ")
        ));
    }

    Ok(())
}

/// Per-request style from flags, falling back to configuration.
fn build_style(
    settings: &Settings,
    detail: Option<&str>,
    temperature: Option<f32>,
    prompt: Option<String>,
) -> crate::Result<StyleConfig> {
    let mut style = settings.style();
    if let Some(detail) = detail {
        style.detail = detail.parse::<DetailLevel>().map_err(RecapError::InvalidInput)?;
    }
    if let Some(temperature) = temperature {
        style = style.with_temperature(temperature);
    }
    if let Some(prompt) = prompt {
        style = style.with_custom_prompt(prompt);
    }
    Ok(style)
}

fn print_digest(digest: &Digest) {
    Output::header("Summary");
    println!("{}", digest.summary());

    if !digest.key_points().is_empty() {
        Output::header("Key Points");
        for point in digest.key_points().iter() {
            Output::key_point(&point.ordinal, &point.text);
        }
    }

    if !digest.highlights().is_empty() {
        Output::header("Highlights");
        for highlight in digest.highlights() {
            Output::list_item(highlight);
        }
    }
    println!();
}
