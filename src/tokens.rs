//! Token cost estimation.
//!
//! A character-count proxy (roughly four characters per token) used by every
//! collapse decision. The estimate is pure and monotonic: adding text never
//! lowers it.

/// Approximate number of characters per model token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token cost of a single text.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Estimate the combined token cost of a set of documents.
pub fn estimate_documents<S: AsRef<str>>(documents: &[S]) -> usize {
    documents.iter().map(|d| estimate_tokens(d.as_ref())).sum()
}
