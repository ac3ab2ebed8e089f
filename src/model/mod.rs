//! Language model invocation.
//!
//! The summarization core only ever sees the [`LanguageModel`] trait; concrete
//! providers and throttling wrappers are injected by the caller.

mod openai;
mod throttle;

pub use openai::{create_client, create_client_with_timeout, OpenAIModel};
pub use throttle::ThrottledModel;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text-completion providers.
///
/// Implementations must be safe to call concurrently from many tasks.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a prompt and return the completion text.
    async fn invoke(&self, prompt: &str, temperature: f32) -> Result<String>;

    /// Human-readable model identifier, used in logs.
    fn name(&self) -> &str;
}
