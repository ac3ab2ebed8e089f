//! Analyze command implementation.

use super::read_transcript;
use crate::cli::Output;
use crate::config::Settings;
use crate::selector::{analyze, recommend};
use crate::strategy::StrategyKind;
use anyhow::Result;

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Run the analyze command.
pub fn run_analyze(input: &str, settings: &Settings) -> Result<()> {
    let transcript = read_transcript(input)?;
    let features = analyze(&transcript);
    let available = StrategyKind::parse_available(&settings.summarization.available_strategies)?;
    let selection = recommend(
        &features,
        &available,
        settings.summarization.long_transcript_threshold,
    );

    Output::header("Transcript Features");
    Output::kv("Length (chars)", &features.length.to_string());
    Output::kv("Words", &features.word_count.to_string());
    Output::kv("Unique words", &features.unique_word_count.to_string());
    Output::kv("Lexical diversity", &format!("{:.2}", features.lexical_diversity));
    Output::kv("Sentences", &features.sentence_count.to_string());
    Output::kv("Speaker annotations", yes_no(features.has_speaker_annotations));
    Output::kv("Speakers", &features.speaker_count.to_string());
    Output::kv(
        "Sections",
        &format!("{} ({})", yes_no(features.has_sections), features.section_count),
    );
    Output::kv(
        "Technical",
        &format!(
            "{} ({} terms, density {:.3})",
            yes_no(features.is_technical),
            features.technical_term_count,
            features.technical_density
        ),
    );
    Output::kv(
        "Interview style",
        &format!("{} ({} questions)", yes_no(features.is_interview_style), features.question_count),
    );

    Output::header("Strategy");
    Output::kv("Auto-selected", selection.strategy.as_str());
    Output::kv("Reason", selection.reason);
    let chunking = selection.strategy.chunking(features.length, settings.chunking());
    Output::kv(
        "Chunking",
        &format!("{} chars, {} overlap", chunking.chunk_size, chunking.chunk_overlap),
    );
    println!();

    Ok(())
}
