//! Lexical-overlap deduplication of highlights.

use std::collections::HashSet;

/// Two highlights are duplicates when their word-set similarity exceeds this.
pub const DUPLICATE_THRESHOLD: f64 = 0.6;

/// Function words ignored when comparing highlights.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "do", "does", "for", "going",
    "gonna", "has", "have", "i", "in", "is", "it", "its", "of", "on", "or", "shall", "so", "that",
    "the", "this", "to", "was", "were", "will", "with", "would",
];

fn words(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercased word set without function words, or the full set if that would be empty.
fn content_words(text: &str) -> HashSet<String> {
    let all = words(text);
    let content: HashSet<String> = all
        .iter()
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .cloned()
        .collect();
    if content.is_empty() {
        all
    } else {
        content
    }
}

/// Jaccard similarity of the content-word sets of two texts.
///
/// Returns 0.0 when either text has no words.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = content_words(a);
    let b = content_words(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    let union = a.union(&b).count();
    shared as f64 / union as f64
}

/// Drop highlights too similar to an earlier one. Survivors keep first-seen order.
pub fn deduplicate_highlights<S: AsRef<str>>(highlights: &[S]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for candidate in highlights {
        let candidate = candidate.as_ref().trim();
        if candidate.is_empty() {
            continue;
        }
        let duplicate = kept
            .iter()
            .any(|existing| jaccard(existing, candidate) > DUPLICATE_THRESHOLD);
        if !duplicate {
            kept.push(candidate.to_string());
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paraphrase_collapses() {
        let deduped = deduplicate_highlights(&[
            "AI will change everything",
            "AI is going to change everything",
        ]);
        assert_eq!(deduped, vec!["AI will change everything"]);
    }

    #[test]
    fn test_unrelated_both_survive() {
        let highlights = ["AI will change everything", "The weather today is sunny"];
        assert!(jaccard(highlights[0], highlights[1]) < 0.1);
        assert_eq!(deduplicate_highlights(&highlights).len(), 2);
    }

    #[test]
    fn test_first_seen_order_and_case() {
        let deduped = deduplicate_highlights(&[
            "\"Patience is erosion.\"",
            "Rivers never hurry",
            "patience IS erosion",
            "Deltas are patient",
        ]);
        assert_eq!(
            deduped,
            vec!["\"Patience is erosion.\"", "Rivers never hurry", "Deltas are patient"]
        );
    }

    #[test]
    fn test_stopword_only_highlights_compare_on_all_words() {
        assert_eq!(jaccard("it is", "It is!"), 1.0);
        assert!(jaccard("it is what it is", "to be or not") < DUPLICATE_THRESHOLD);
        assert_eq!(jaccard("", "anything"), 0.0);
    }

    #[test]
    fn test_blank_highlights_dropped() {
        assert!(deduplicate_highlights(&["  ", ""]).is_empty());
    }
}
