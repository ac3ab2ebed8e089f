//! Boundary-aware text splitting.
//!
//! Chunk boundaries are placed at the strongest break found in the back half
//! of each window: paragraph, line, sentence, clause punctuation, whitespace,
//! and finally the raw character limit.

use super::{Chunk, ChunkingConfig};
use tracing::debug;

/// Break candidates in priority order. The separator stays with the chunk it ends.
pub const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", ";", ":", " "];

/// Splits text into overlapping chunks whose non-overlapping bodies tile the input.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. A zero size is raised to one character and the
    /// overlap is clamped below the chunk size.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn from_config(config: ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into ordered chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut spans = Vec::new();
        let mut start = 0;
        while start < text.len() {
            let end = self.next_boundary(text, start);
            spans.push((start, end));
            start = end;
        }

        let total = spans.len();
        debug!("Split {} chars into {} chunks", text.len(), total);

        spans
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| {
                let context_start = if i == 0 {
                    start
                } else {
                    step_back_chars(text, start, self.overlap)
                };
                Chunk {
                    text: text[context_start..end].to_string(),
                    index: i + 1,
                    total,
                    is_first: i == 0,
                    is_last: i + 1 == total,
                    offset: context_start,
                    overlap: start - context_start,
                }
            })
            .collect()
    }

    /// Byte offset where the chunk starting at `start` should end.
    fn next_boundary(&self, text: &str, start: usize) -> usize {
        let rest = &text[start..];
        let window_end = match rest.char_indices().nth(self.chunk_size) {
            Some((i, _)) => start + i,
            None => return text.len(),
        };

        let window = &text[start..window_end];
        let min_cut = window.len() / 2;
        for separator in SEPARATORS {
            if let Some(pos) = window.rfind(separator) {
                let cut = pos + separator.len();
                if cut > min_cut {
                    return start + cut;
                }
            }
        }

        window_end
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::from_config(ChunkingConfig::default())
    }
}

/// Byte offset `n` characters before `pos`, or 0.
fn step_back_chars(text: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.body()).collect()
    }

    fn sample_transcript() -> String {
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!(
                "Host: Welcome to segment {i}. Today we talk about rivers; they shape valleys! \
                 Guest: Do they really? Yes: erosion works slowly over millennia.\n"
            ));
            if i % 5 == 4 {
                text.push('\n');
            }
        }
        text
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = TextSplitter::new(100, 10).split("A short transcript.");
        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];
        assert!(chunk.is_first && chunk.is_last);
        assert_eq!(chunk.index, 1);
        assert_eq!(chunk.total, 1);
        assert_eq!(chunk.overlap, 0);
        assert_eq!(chunk.position(), "entire");
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(TextSplitter::new(100, 10).split("").is_empty());
    }

    #[test]
    fn test_round_trip_reconstructs_text() {
        let text = sample_transcript();
        for (size, overlap) in [(50, 0), (120, 30), (400, 80), (997, 500), (7, 6)] {
            let chunks = TextSplitter::new(size, overlap).split(&text);
            assert_eq!(rebuild(&chunks), text, "size={size} overlap={overlap}");
        }
    }

    #[test]
    fn test_round_trip_with_multibyte_text() {
        let text = "Ça va très bien… merci! Über alles: naïve café.\n\nΑλφα βήτα γάμμα δέλτα. "
            .repeat(12);
        let chunks = TextSplitter::new(33, 9).split(&text);
        assert!(chunks.len() > 1);
        assert_eq!(rebuild(&chunks), text);
    }

    #[test]
    fn test_overlap_repeats_previous_tail() {
        let text = sample_transcript();
        let chunks = TextSplitter::new(200, 40).split(&text);
        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let context = &next.text[..next.overlap];
            assert_eq!(context.chars().count(), 40);
            assert!(prev.text.ends_with(context));
        }
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let para = "word ".repeat(14); // 70 chars
        let text = format!("{para}\n\n{para}\n\n{para}");
        let chunks = TextSplitter::new(100, 0).split(&text);
        assert!(chunks[0].body().ends_with("\n\n"));
        assert_eq!(rebuild(&chunks), text);
    }

    #[test]
    fn test_prefers_sentence_over_whitespace() {
        let text = "The first sentence is right here. And then the second one keeps going on and on";
        let chunks = TextSplitter::new(60, 0).split(text);
        assert_eq!(chunks[0].body(), "The first sentence is right here. ");
    }

    #[test]
    fn test_falls_back_to_raw_characters() {
        let text = "x".repeat(25);
        let chunks = TextSplitter::new(10, 0).split(&text);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.body().len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn test_chunk_metadata() {
        let text = sample_transcript();
        let chunks = TextSplitter::new(300, 50).split(&text);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i + 1);
            assert_eq!(chunk.total, total);
            assert_eq!(chunk.is_first, i == 0);
            assert_eq!(chunk.is_last, i + 1 == total);
            assert_eq!(&text[chunk.offset..chunk.offset + chunk.text.len()], chunk.text);
        }
        assert_eq!(chunks[0].position(), "opening");
        assert_eq!(chunks[total - 1].position(), "closing");
    }

    #[test]
    fn test_overlap_is_clamped_below_size() {
        let splitter = TextSplitter::new(10, 50);
        assert_eq!(splitter.overlap(), 9);
        let splitter = TextSplitter::new(0, 0);
        assert_eq!(splitter.chunk_size(), 1);
    }
}
