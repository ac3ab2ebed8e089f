//! Transcript feature analysis and automatic strategy selection.

use crate::strategy::StrategyKind;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static ROLE_SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*((?:Speaker|Host|Guest)[ \t\w]*?)[ \t]*:").expect("role speaker pattern is valid")
});

static NAMED_SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Z][a-z]+(?: [A-Z][a-z]+)?):").expect("named speaker pattern is valid")
});

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

/// Chapter headings and bracketed timestamps.
static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Chapter|Section|Part) \d+|\[\d+:\d+\]|\(\d+:\d+\)").expect("section pattern is valid")
});

static TECHNICAL_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:algorithm|dataset|neural network|machine learning|ai|api|function|code|",
        r"programming|database|server|client|backend|frontend|",
        r"statistical|coefficient|correlation|regression|variable|hypothesis|analysis|experiment|",
        r"genome|protein|molecule|enzyme|biochemical|cellular|neural|clinical|diagnostic)\b",
    ))
    .expect("technical term pattern is valid")
});

/// A question mark followed by a new sentence.
static QUESTION_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?\s+[A-Z]").expect("question break pattern is valid"));

static QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:What|How|Why|When|Where|Who|Could you|Can you|Do you).*?\?")
        .expect("question pattern is valid")
});

/// Technical terms per word above which a transcript counts as technical.
const TECHNICAL_DENSITY: f64 = 0.01;

/// Questions needed, absolute and per sentence, for an interview-style transcript.
const INTERVIEW_MIN_QUESTIONS: usize = 5;
const INTERVIEW_QUESTION_RATIO: f64 = 0.1;

/// Read-only projection of a transcript used for strategy selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptFeatures {
    /// Length in characters.
    pub length: usize,
    pub word_count: usize,
    pub has_speaker_annotations: bool,
    /// Distinct speaker labels found.
    pub speaker_count: usize,
    pub sentence_count: usize,
    /// Chapter, section or part headings and timestamps.
    pub has_sections: bool,
    pub section_count: usize,
    /// Distinct lowercased words.
    pub unique_word_count: usize,
    /// Unique words over total words.
    pub lexical_diversity: f64,
    pub technical_term_count: usize,
    /// Technical terms over total words.
    pub technical_density: f64,
    pub is_technical: bool,
    pub question_count: usize,
    pub is_interview_style: bool,
}

/// Extract features from a transcript.
pub fn analyze(transcript: &str) -> TranscriptFeatures {
    let speakers = speaker_labels(transcript);
    let sentence_count = SENTENCE_END
        .split(transcript)
        .filter(|s| !s.trim().is_empty())
        .count();

    let words: Vec<String> = transcript
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    let word_count = words.len();
    let unique_word_count = words.iter().collect::<HashSet<_>>().len();

    let section_count = SECTION_MARKER.find_iter(transcript).count();
    let technical_term_count = TECHNICAL_TERM.find_iter(transcript).count();
    let technical_density = ratio(technical_term_count, word_count);
    let question_count =
        QUESTION_BREAK.find_iter(transcript).count() + QUESTION.find_iter(transcript).count();

    TranscriptFeatures {
        length: transcript.chars().count(),
        word_count,
        has_speaker_annotations: !speakers.is_empty(),
        speaker_count: speakers.len(),
        sentence_count,
        has_sections: section_count > 0,
        section_count,
        unique_word_count,
        lexical_diversity: ratio(unique_word_count, word_count),
        technical_term_count,
        technical_density,
        is_technical: technical_density > TECHNICAL_DENSITY,
        question_count,
        is_interview_style: question_count > INTERVIEW_MIN_QUESTIONS
            && ratio(question_count, sentence_count) > INTERVIEW_QUESTION_RATIO,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Distinct speaker labels at the start of lines, in first-seen order.
///
/// Role labels ("Host:", "Guest 2:") take precedence; names ("Ada:",
/// "Grace Hopper:") are only consulted when no role label is present.
pub fn speaker_labels(text: &str) -> Vec<String> {
    for pattern in [&*ROLE_SPEAKER, &*NAMED_SPEAKER] {
        let mut seen = HashSet::new();
        let labels: Vec<String> = pattern
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|label| seen.insert(label.clone()))
            .collect();
        if !labels.is_empty() {
            return labels;
        }
    }
    Vec::new()
}

/// An auto-selected strategy and the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub strategy: StrategyKind,
    pub reason: &'static str,
}

/// Pick a strategy for the given features.
///
/// Rules, in order: speaker-annotated transcripts go to discourse; transcripts
/// longer than `long_threshold` go to hierarchical; anything else goes to
/// general. A rule whose strategy is not in `available` is skipped, and when
/// no rule applies the ensemble is used.
pub fn select(
    features: &TranscriptFeatures,
    available: &[StrategyKind],
    long_threshold: usize,
) -> StrategyKind {
    recommend(features, available, long_threshold).strategy
}

/// Like [`select`], also reporting why the strategy was chosen.
pub fn recommend(
    features: &TranscriptFeatures,
    available: &[StrategyKind],
    long_threshold: usize,
) -> Selection {
    let rules = [
        (
            features.has_speaker_annotations,
            StrategyKind::Discourse,
            "Speaker annotations detected",
        ),
        (
            features.length > long_threshold,
            StrategyKind::Hierarchical,
            "Long transcript detected",
        ),
        (true, StrategyKind::General, "Standard transcript"),
    ];

    rules
        .into_iter()
        .find(|(applies, kind, _)| *applies && available.contains(kind))
        .map(|(_, strategy, reason)| Selection { strategy, reason })
        .unwrap_or(Selection {
            strategy: StrategyKind::Ensemble,
            reason: "No matching strategy is available",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [StrategyKind; 3] = [
        StrategyKind::General,
        StrategyKind::Discourse,
        StrategyKind::Hierarchical,
    ];

    fn features(length: usize, speakers: bool) -> TranscriptFeatures {
        TranscriptFeatures {
            length,
            has_speaker_annotations: speakers,
            ..Default::default()
        }
    }

    #[test]
    fn test_selection_table() {
        use StrategyKind::*;

        let cases: &[(usize, bool, &[StrategyKind], StrategyKind)] = &[
            (1_000, true, &ALL, Discourse),
            (200_000, true, &ALL, Discourse),
            (60_000, false, &ALL, Hierarchical),
            (50_000, false, &ALL, General),
            (1_000, false, &ALL, General),
            (60_000, true, &[General, Hierarchical], Hierarchical),
            (1_000, true, &[General], General),
            (60_000, false, &[Discourse], Ensemble),
            (1_000, false, &[], Ensemble),
        ];

        for (length, speakers, available, expected) in cases {
            assert_eq!(
                select(&features(*length, *speakers), available, 50_000),
                *expected,
                "length={length} speakers={speakers} available={available:?}"
            );
        }
    }

    #[test]
    fn test_selection_is_deterministic() {
        let f = features(60_000, false);
        let first = select(&f, &ALL, 50_000);
        for _ in 0..10 {
            assert_eq!(select(&f, &ALL, 50_000), first);
        }
    }

    #[test]
    fn test_role_speakers() {
        let text = "Host: Welcome back.\nGuest: Thanks for having me.\nHost: Let's begin.\n";
        assert_eq!(speaker_labels(text), vec!["Host", "Guest"]);

        let numbered = "Speaker 1: Hi\n  Speaker 2: Hello\n";
        assert_eq!(speaker_labels(numbered), vec!["Speaker 1", "Speaker 2"]);
    }

    #[test]
    fn test_named_speakers() {
        let text = "Ada Lovelace: The engine weaves patterns.\nCharles: Indeed.\n";
        let f = analyze(text);
        assert!(f.has_speaker_annotations);
        assert_eq!(f.speaker_count, 2);
    }

    #[test]
    fn test_mid_line_colon_is_not_a_speaker() {
        let text = "We talked about one thing: rivers. Then another: deltas.";
        let f = analyze(text);
        assert!(!f.has_speaker_annotations);
        assert_eq!(f.speaker_count, 0);
    }

    #[test]
    fn test_counts() {
        let f = analyze("One two three. Four five!  Six?");
        assert_eq!(f.word_count, 6);
        assert_eq!(f.sentence_count, 3);
        assert_eq!(f.length, 31);
    }

    #[test]
    fn test_selection_reasons() {
        let selection = recommend(&features(1_000, true), &ALL, 50_000);
        assert_eq!(selection.strategy, StrategyKind::Discourse);
        assert_eq!(selection.reason, "Speaker annotations detected");

        let selection = recommend(&features(60_000, true), &[StrategyKind::Hierarchical], 50_000);
        assert_eq!(selection.strategy, StrategyKind::Hierarchical);
        assert_eq!(selection.reason, "Long transcript detected");

        assert_eq!(recommend(&features(10, false), &ALL, 50_000).reason, "Standard transcript");
        assert_eq!(
            recommend(&features(10, false), &[], 50_000).strategy,
            StrategyKind::Ensemble
        );
    }

    #[test]
    fn test_section_markers() {
        let cases: &[(&str, usize)] = &[
            ("[00:12] Intro\nChapter 2 begins\n(01:30) an aside\nPart 3", 4),
            ("Section 4 covers deltas.", 1),
            ("We met at 10:30 and talked for part of the day.", 0),
            ("", 0),
        ];

        for (text, expected) in cases {
            let f = analyze(text);
            assert_eq!(f.section_count, *expected, "{text:?}");
            assert_eq!(f.has_sections, *expected > 0, "{text:?}");
        }
    }

    #[test]
    fn test_technical_terms() {
        let cases: &[(&str, usize, bool)] = &[
            ("The algorithm trains a neural network on the dataset.", 3, true),
            ("The API server talks to the database.", 3, true),
            ("The river said hello to the main delta.", 0, false),
            ("", 0, false),
        ];

        for (text, count, technical) in cases {
            let f = analyze(text);
            assert_eq!(f.technical_term_count, *count, "{text:?}");
            assert_eq!(f.is_technical, *technical, "{text:?}");
        }
    }

    #[test]
    fn test_interview_style() {
        let cases: &[(String, usize, bool)] = &[
            (
                "What is a delta? It is a landform. How does it grow? Slowly.".to_string(),
                4,
                false,
            ),
            ("How? Yes. ".repeat(6), 12, true),
            ("Rivers flow. Deltas grow.".to_string(), 0, false),
        ];

        for (text, questions, interview) in cases {
            let f = analyze(text);
            assert_eq!(f.question_count, *questions, "{text:?}");
            assert_eq!(f.is_interview_style, *interview, "{text:?}");
        }
    }

    #[test]
    fn test_lexical_diversity() {
        let f = analyze("The river the delta");
        assert_eq!(f.unique_word_count, 3);
        assert!((f.lexical_diversity - 0.75).abs() < 1e-9);

        let empty = analyze("");
        assert_eq!(empty.lexical_diversity, 0.0);
        assert_eq!(empty.technical_density, 0.0);
    }
}
