//! Verbosity tiers and per-request style options.

use serde::{Deserialize, Serialize};

/// How much detail the final summary should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl DetailLevel {
    /// Paragraph-count guidance for the final summary.
    pub fn paragraphs(&self) -> &'static str {
        match self {
            DetailLevel::Brief => "3-4",
            DetailLevel::Standard => "4-6",
            DetailLevel::Detailed => "6-8",
        }
    }

    /// Adjective used in prompt headings.
    pub fn label(&self) -> &'static str {
        match self {
            DetailLevel::Brief => "CONCISE",
            DetailLevel::Standard => "COMPREHENSIVE",
            DetailLevel::Detailed => "DETAILED",
        }
    }

    /// Instruction for per-section summaries.
    pub fn section_instruction(&self) -> &'static str {
        match self {
            DetailLevel::Brief => "Write a concise summary of this section, capturing only the essential points.",
            DetailLevel::Standard => "Write a comprehensive summary of this section, capturing the main topics discussed, key points, and maintaining the context of the conversation.",
            DetailLevel::Detailed => "Write a detailed summary of this section, capturing all significant topics, key points, quotes, insights, and maintaining the conversational flow.",
        }
    }
}

impl std::str::FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "brief" => Ok(DetailLevel::Brief),
            "standard" => Ok(DetailLevel::Standard),
            "detailed" => Ok(DetailLevel::Detailed),
            _ => Err(format!("Unknown detail level: {}", s)),
        }
    }
}

impl std::fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailLevel::Brief => write!(f, "brief"),
            DetailLevel::Standard => write!(f, "standard"),
            DetailLevel::Detailed => write!(f, "detailed"),
        }
    }
}

/// Per-request style options shared by every strategy in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    pub detail: DetailLevel,
    pub temperature: f32,
    /// Replaces the summary facet's map and combine templates when set.
    pub custom_prompt: Option<String>,
}

impl StyleConfig {
    pub fn new(detail: DetailLevel) -> Self {
        Self {
            detail,
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            detail: DetailLevel::Standard,
            temperature: 0.2,
            custom_prompt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detail_level() {
        assert_eq!("Brief".parse::<DetailLevel>().unwrap(), DetailLevel::Brief);
        assert_eq!("DETAILED".parse::<DetailLevel>().unwrap(), DetailLevel::Detailed);
        assert!("verbose".parse::<DetailLevel>().is_err());
    }

    #[test]
    fn test_tiers_are_distinct() {
        let tiers = [DetailLevel::Brief, DetailLevel::Standard, DetailLevel::Detailed];
        let paragraphs: Vec<&str> = tiers.iter().map(|t| t.paragraphs()).collect();
        assert_eq!(paragraphs, vec!["3-4", "4-6", "6-8"]);
        assert_eq!(DetailLevel::default().to_string(), "standard");
    }
}
