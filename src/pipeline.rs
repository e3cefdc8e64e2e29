//! Drives read pairs through reconciliation and aggregation on the rayon pool.
use crate::aggregate::AggregateState;
use crate::config::RunConfig;
use crate::fastq::ReadPair;
use crate::reconcile::reconcile_pair;
use crate::Result;
use log::{debug, warn};
use rayon::prelude::*;

/// Pulls pairs in chunks of `config.chunk_size`, reconciles each chunk in parallel and merges
/// the chunk totals in input order. The first error from the input aborts the run.
pub fn aggregate_pairs<I>(pairs: I, config: &RunConfig) -> Result<AggregateState>
where
    I: IntoIterator<Item = Result<ReadPair>>,
{
    let mut pairs = pairs.into_iter();
    let mut state = AggregateState::new();
    let mut chunk = Vec::with_capacity(config.chunk_size);
    let mut chunks = 0;

    loop {
        chunk.clear();
        for pair in pairs.by_ref().take(config.chunk_size) {
            chunk.push(pair?);
        }
        if chunk.is_empty() {
            break;
        }

        let chunk_state = aggregate_chunk(&chunk, config);
        chunks += 1;
        debug!(
            "Chunk {}: {} pairs, {} validated",
            chunks,
            chunk_state.tally().total_pairs,
            chunk_state.tally().validated_pairs
        );
        state.merge(chunk_state);
    }

    if state.tally().header_mismatch > 0 {
        warn!(
            "{} read pairs were skipped because their identifiers differ",
            state.tally().header_mismatch
        );
    }
    Ok(state)
}

/// Reconciles a slice of pairs across the pool. Each worker folds into its own state and the
/// states are reduced left to right, so the result matches a sequential pass.
pub fn aggregate_chunk(chunk: &[ReadPair], config: &RunConfig) -> AggregateState {
    chunk
        .par_iter()
        .fold(AggregateState::new, |mut state, pair| {
            state.observe(reconcile_pair(pair, config), config);
            state
        })
        .reduce(AggregateState::new, |mut left, right| {
            left.merge(right);
            left
        })
}
