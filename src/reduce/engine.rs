//! The map / collapse / final-combine state machine.

use super::{CollapseSet, Combiner, Mapper, PartialResult};
use crate::chunking::Chunk;
use crate::error::{RecapError, Result};
use futures::stream::{self, StreamExt};
use std::ops::Range;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Recursive map-reduce engine bounded by a token budget.
///
/// Map invocations run concurrently, one task per chunk; combine invocations
/// run concurrently within a collapse round. Rounds themselves are sequential.
#[derive(Debug, Clone)]
pub struct MapReduce {
    token_budget: usize,
    max_concurrency: usize,
    cancel: CancellationToken,
}

impl MapReduce {
    pub fn new(token_budget: usize, max_concurrency: usize) -> Self {
        Self {
            token_budget: token_budget.max(1),
            max_concurrency: max_concurrency.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop starting new phases and rounds once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Map every chunk, collapse the partials under the budget, and combine once more.
    #[instrument(skip_all, fields(chunks = chunks.len(), budget = self.token_budget))]
    pub async fn reduce(
        &self,
        chunks: &[Chunk],
        mapper: &dyn Mapper,
        combiner: &dyn Combiner,
    ) -> Result<String> {
        let partials = self.map_phase(chunks, mapper).await?;
        self.reduce_documents(CollapseSet::from_partials(partials), combiner)
            .await
    }

    /// Run the map phase. Failed chunks are dropped; losing every chunk is fatal.
    pub async fn map_phase(
        &self,
        chunks: &[Chunk],
        mapper: &dyn Mapper,
    ) -> Result<Vec<PartialResult>> {
        self.ensure_active()?;

        let tasks: Vec<_> = chunks
            .iter()
            .enumerate()
            .map(|(pos, chunk)| async move { (pos, mapper.map(chunk).await) })
            .collect();
        let mut results: Vec<(usize, Result<String>)> = stream::iter(tasks)
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;
        results.sort_by_key(|(pos, _)| *pos);

        let mut partials = Vec::with_capacity(results.len());
        for (pos, result) in results {
            let chunk = &chunks[pos];
            match result {
                Ok(text) => partials.push(PartialResult {
                    text,
                    source_chunk_index: chunk.index,
                }),
                Err(e) => warn!(
                    "Dropping chunk {}/{} from the map phase: {}",
                    chunk.index, chunk.total, e
                ),
            }
        }

        if partials.is_empty() {
            error!("No chunk survived the map phase ({} attempted)", chunks.len());
            return Err(RecapError::NoChunksSurvived {
                attempted: chunks.len(),
            });
        }

        info!("Mapped {}/{} chunks", partials.len(), chunks.len());
        Ok(partials)
    }

    /// Collapse `set` under the budget, then run the final combine.
    pub async fn reduce_documents(
        &self,
        set: CollapseSet,
        combiner: &dyn Combiner,
    ) -> Result<String> {
        if set.is_empty() {
            return Err(RecapError::NoChunksSurvived { attempted: 0 });
        }

        let set = self.collapse(set, combiner).await?;

        self.ensure_active()?;
        debug!(
            "Final combine over {} documents ({} tokens)",
            set.len(),
            set.tokens()
        );
        combiner.combine(set.documents()).await
    }

    /// Repeat collapse rounds until the set fits the budget.
    pub async fn collapse(&self, mut set: CollapseSet, combiner: &dyn Combiner) -> Result<CollapseSet> {
        let budget = self.token_budget;
        let mut round = 0;

        while !set.fits(budget) {
            round += 1;
            self.ensure_active()?;

            let largest = set.largest_document_tokens();
            if largest > budget {
                error!(
                    "Collapse round {}: a single document of {} tokens exceeds the budget of {}",
                    round, largest, budget
                );
                return Err(RecapError::Convergence {
                    round,
                    tokens: largest,
                    budget,
                });
            }

            let groups = set.partition(budget);
            debug!(
                "Collapse round {}: {} documents ({} tokens) into {} groups",
                round,
                set.len(),
                set.tokens(),
                groups.len()
            );

            let next = self.collapse_round(&set, groups, combiner).await?;
            if next.len() >= set.len() && next.tokens() >= set.tokens() {
                error!("Collapse round {} made no progress", round);
                return Err(RecapError::Convergence {
                    round,
                    tokens: next.tokens(),
                    budget,
                });
            }
            set = next;
        }

        if round > 0 {
            info!("Collapsed to {} documents after {} round(s)", set.len(), round);
        }
        Ok(set)
    }

    /// Combine each group concurrently and reassemble the outputs in group order.
    async fn collapse_round(
        &self,
        set: &CollapseSet,
        groups: Vec<Range<usize>>,
        combiner: &dyn Combiner,
    ) -> Result<CollapseSet> {
        let documents = set.documents();

        let mut results: Vec<(usize, Result<String>)> = stream::iter(groups.into_iter().enumerate())
            .map(|(i, range)| async move { (i, combiner.combine(&documents[range]).await) })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;
        results.sort_by_key(|(i, _)| *i);

        let combined = results
            .into_iter()
            .map(|(_, result)| result)
            .collect::<Result<Vec<String>>>()?;

        Ok(CollapseSet::new(combined))
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!("Reduction cancelled");
            return Err(RecapError::Cancelled);
        }
        Ok(())
    }
}
