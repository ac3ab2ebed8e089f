//! Strategies command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::strategy::StrategyKind;
use anyhow::Result;
use console::style;

/// Run the strategies command.
pub fn run_strategies(settings: &Settings) -> Result<()> {
    let available = StrategyKind::parse_available(&settings.summarization.available_strategies)?;

    Output::header("Strategies");
    for kind in StrategyKind::SINGLE {
        let marker = if available.contains(&kind) {
            style("available").green()
        } else {
            style("disabled").dim()
        };
        println!(
            "  {:<14} {} ({})",
            style(kind.as_str()).bold(),
            kind.description(),
            marker
        );
    }
    for kind in [StrategyKind::Ensemble, StrategyKind::Auto] {
        println!("  {:<14} {}", style(kind.as_str()).bold(), kind.description());
    }
    println!();
    Output::kv("Default", &settings.summarization.strategy);

    Ok(())
}
