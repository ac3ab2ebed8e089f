//! Parsing of free-text model output into key points and highlights.

use super::KeyPoints;
use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)[.)]?\s+(.+)$").expect("numbered line pattern is valid")
});

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+[.)]|[-*•])\s+").expect("list marker pattern is valid")
});

/// Parse a numbered list ("1. ...", "2) ...") into ordinal-keyed points.
///
/// When no line is numbered, every non-empty line becomes a point, numbered in order.
pub fn parse_key_points(text: &str) -> KeyPoints {
    let mut points = KeyPoints::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = NUMBERED_LINE.captures(line) {
            points.insert(caps[1].to_string(), caps[2].trim().to_string());
        }
    }

    if points.is_empty() {
        points = KeyPoints::from_texts(
            text.lines()
                .map(|l| LIST_MARKER.replace(l.trim(), "").trim().to_string())
                .filter(|l| !l.is_empty()),
        );
    }

    points
}

/// Parse one highlight per line, dropping list markers.
pub fn parse_highlights(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| LIST_MARKER.replace(l.trim(), "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_points() {
        let text = "FINAL KEY POINTS:\n1. Rivers carve valleys\n2) Deltas need sediment\n\n3 Floods renew soil";
        let points = parse_key_points(text);
        assert_eq!(points.len(), 3);
        assert_eq!(points.get("1"), Some("Rivers carve valleys"));
        assert_eq!(points.get("2"), Some("Deltas need sediment"));
        assert_eq!(points.get("3"), Some("Floods renew soil"));
    }

    #[test]
    fn test_parse_unnumbered_points_fallback() {
        let points = parse_key_points("- Sleep matters\n- Exercise daily\n\n");
        assert_eq!(points.get("1"), Some("Sleep matters"));
        assert_eq!(points.get("2"), Some("Exercise daily"));
    }

    #[test]
    fn test_parse_highlights_strips_markers() {
        let highlights = parse_highlights("1. \"Water always wins.\"\n\n- \"Patience is erosion.\"\nplain line");
        assert_eq!(
            highlights,
            vec!["\"Water always wins.\"", "\"Patience is erosion.\"", "plain line"]
        );
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_key_points("  \n ").is_empty());
        assert!(parse_highlights("").is_empty());
    }
}
