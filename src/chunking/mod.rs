//! Transcript chunking for the map phase.
//!
//! Splits raw transcript text into ordered, overlapping chunks that carry their
//! position in the sequence.

mod splitter;

pub use splitter::{TextSplitter, SEPARATORS};

use serde::{Deserialize, Serialize};

/// An ordered slice of a transcript, the unit of the map phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text, including the leading overlap context.
    pub text: String,
    /// 1-based position in the chunk sequence.
    pub index: usize,
    /// Number of chunks produced from the transcript.
    pub total: usize,
    pub is_first: bool,
    pub is_last: bool,
    /// Byte offset of `text` in the source transcript.
    pub offset: usize,
    /// Byte length of the leading context repeated from the previous chunk.
    pub overlap: usize,
}

impl Chunk {
    /// The part of this chunk not repeated from its predecessor.
    pub fn body(&self) -> &str {
        &self.text[self.overlap..]
    }

    /// Where this chunk sits in the transcript, for prompt context.
    pub fn position(&self) -> &'static str {
        match (self.is_first, self.is_last) {
            (true, true) => "entire",
            (true, false) => "opening",
            (false, true) => "closing",
            (false, false) => "middle",
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters of trailing context carried into the next chunk.
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4000,
            chunk_overlap: 500,
        }
    }
}

/// Split a transcript with the given configuration.
pub fn split(text: &str, config: ChunkingConfig) -> Vec<Chunk> {
    TextSplitter::from_config(config).split(text)
}
