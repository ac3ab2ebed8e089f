//! Hierarchical map-reduce over transcript chunks.
//!
//! Each chunk is mapped to a partial text, then the partials are repeatedly
//! grouped and combined until they fit the token budget, and a final combine
//! shapes the result. Every combine call receives at most `token_budget`
//! estimated tokens of input.

mod collapse;
mod engine;

pub use collapse::CollapseSet;
pub use engine::MapReduce;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;

/// First-pass reduction of a single chunk.
#[async_trait]
pub trait Mapper: Send + Sync {
    async fn map(&self, chunk: &Chunk) -> Result<String>;
}

/// Reduction of an ordered group of documents into one.
#[async_trait]
pub trait Combiner: Send + Sync {
    async fn combine(&self, documents: &[String]) -> Result<String>;
}

/// Output of one successful map invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    pub text: String,
    /// 1-based index of the chunk this text came from.
    pub source_chunk_index: usize,
}
