//! Summarization outputs and style options.
//!
//! A strategy run yields a [`StrategyResult`]; an ensemble run yields an
//! [`EnsembleResult`]. Callers receive either through [`Digest`].

mod key_points;
mod parse;
mod style;

pub use key_points::{KeyPoint, KeyPoints};
pub use parse::{parse_highlights, parse_key_points};
pub use style::{DetailLevel, StyleConfig};

use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};

/// Summary, key points and highlights produced by one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub summary: String,
    pub key_points: KeyPoints,
    pub highlights: Vec<String>,
}

impl StrategyResult {
    pub fn new(summary: String, key_points: KeyPoints, highlights: Vec<String>) -> Self {
        Self {
            summary,
            key_points,
            highlights,
        }
    }
}

/// Merged output of several strategies.
///
/// Always has at least one contributing strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleResult {
    result: StrategyResult,
    contributors: Vec<String>,
}

impl EnsembleResult {
    /// Build an ensemble result. Fails if `contributors` is empty.
    pub fn new(result: StrategyResult, contributors: Vec<String>) -> Result<Self> {
        if contributors.is_empty() {
            return Err(RecapError::NoStrategiesSucceeded { attempted: 0 });
        }
        Ok(Self {
            result,
            contributors,
        })
    }

    pub fn summary(&self) -> &str {
        &self.result.summary
    }

    pub fn key_points(&self) -> &KeyPoints {
        &self.result.key_points
    }

    pub fn highlights(&self) -> &[String] {
        &self.result.highlights
    }

    /// Names of the strategies whose output was merged, in run order.
    pub fn contributors(&self) -> &[String] {
        &self.contributors
    }

    pub fn into_result(self) -> StrategyResult {
        self.result
    }
}

/// Result of a summarization request.
#[derive(Debug, Clone, PartialEq)]
pub enum Digest {
    /// A single strategy produced the result.
    Single {
        strategy: String,
        result: StrategyResult,
    },
    /// Several strategies were merged.
    Ensemble(EnsembleResult),
}

impl Digest {
    pub fn summary(&self) -> &str {
        match self {
            Digest::Single { result, .. } => &result.summary,
            Digest::Ensemble(e) => e.summary(),
        }
    }

    pub fn key_points(&self) -> &KeyPoints {
        match self {
            Digest::Single { result, .. } => &result.key_points,
            Digest::Ensemble(e) => e.key_points(),
        }
    }

    pub fn highlights(&self) -> &[String] {
        match self {
            Digest::Single { result, .. } => &result.highlights,
            Digest::Ensemble(e) => e.highlights(),
        }
    }

    /// "ensemble" or the name of the single strategy used.
    pub fn method(&self) -> &str {
        match self {
            Digest::Single { strategy, .. } => strategy,
            Digest::Ensemble(_) => "ensemble",
        }
    }

    /// Strategies that contributed to this digest.
    pub fn contributors(&self) -> Vec<String> {
        match self {
            Digest::Single { strategy, .. } => vec![strategy.clone()],
            Digest::Ensemble(e) => e.contributors().to_vec(),
        }
    }
}

#[derive(Serialize)]
struct DigestMetadata<'a> {
    method: &'a str,
    contributors: Vec<String>,
}

#[derive(Serialize)]
struct DigestView<'a> {
    summary: &'a str,
    key_points: &'a KeyPoints,
    highlights: &'a [String],
    metadata: DigestMetadata<'a>,
}

impl Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DigestView {
            summary: self.summary(),
            key_points: self.key_points(),
            highlights: self.highlights(),
            metadata: DigestMetadata {
                method: self.method(),
                contributors: self.contributors(),
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> StrategyResult {
        StrategyResult::new(
            "The episode covers rivers.".to_string(),
            KeyPoints::from_texts(["Rivers erode valleys", "Deltas form at mouths"]),
            vec!["\"Water always wins.\"".to_string()],
        )
    }

    #[test]
    fn test_ensemble_requires_contributors() {
        let err = EnsembleResult::new(sample_result(), Vec::new()).unwrap_err();
        assert!(matches!(err, RecapError::NoStrategiesSucceeded { .. }));

        let ok = EnsembleResult::new(sample_result(), vec!["general".to_string()]).unwrap();
        assert_eq!(ok.contributors(), ["general".to_string()]);
    }

    #[test]
    fn test_digest_accessors() {
        let single = Digest::Single {
            strategy: "discourse".to_string(),
            result: sample_result(),
        };
        assert_eq!(single.method(), "discourse");
        assert_eq!(single.contributors(), vec!["discourse".to_string()]);
        assert_eq!(single.key_points().len(), 2);

        let ensemble = Digest::Ensemble(
            EnsembleResult::new(
                sample_result(),
                vec!["general".to_string(), "hierarchical".to_string()],
            )
            .unwrap(),
        );
        assert_eq!(ensemble.method(), "ensemble");
        assert_eq!(ensemble.highlights().len(), 1);
    }

    #[test]
    fn test_digest_json_shape() {
        let digest = Digest::Single {
            strategy: "general".to_string(),
            result: sample_result(),
        };
        let json = serde_json::to_value(&digest).unwrap();
        assert_eq!(json["summary"], "The episode covers rivers.");
        assert_eq!(json["key_points"]["2"], "Deltas form at mouths");
        assert_eq!(json["metadata"]["method"], "general");
        assert_eq!(json["metadata"]["contributors"][0], "general");
    }
}
