//! Bounded in-flight model invocations.

use super::LanguageModel;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::trace;

/// Wraps a model so that at most `max_in_flight` invocations run at once,
/// across every task sharing this wrapper.
pub struct ThrottledModel {
    inner: Arc<dyn LanguageModel>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
}

impl ThrottledModel {
    pub fn new(inner: Arc<dyn LanguageModel>, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

#[async_trait]
impl LanguageModel for ThrottledModel {
    async fn invoke(&self, prompt: &str, temperature: f32) -> Result<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| RecapError::Model(format!("Invocation limiter closed: {}", e)))?;
        trace!(
            "Acquired model permit ({} still available)",
            self.permits.available_permits()
        );
        self.inner.invoke(prompt, temperature).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
