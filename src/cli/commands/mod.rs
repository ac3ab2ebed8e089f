//! CLI command implementations.

mod analyze;
mod config;
mod strategies;
mod summarize;

pub use analyze::run_analyze;
pub use config::run_config;
pub use strategies::run_strategies;
pub use summarize::run_summarize;

use anyhow::{Context, Result};
use std::io::Read;

/// Read a transcript from a file, or from stdin when `input` is "-".
pub(crate) fn read_transcript(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read transcript from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_transcript_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "Host: hello\n").unwrap();
        let text = read_transcript(file.path().to_str().unwrap()).unwrap();
        assert_eq!(text, "Host: hello\n");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_transcript("/nonexistent/transcript.txt").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/transcript.txt"));
    }
}
