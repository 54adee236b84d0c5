use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::MapReduceError;
use crate::mapper::{MapAssignment, MapFn, Mapper};
use crate::partition::PartitionFn;
use crate::reducer::{ReduceAssignment, ReduceFn, Reducer};
use crate::store::{Emitter, PartitionStore};

/// Coordinates one two-phase run: spawns the map workers, joins them, hands
/// each shard to its reduce worker, joins those, then drops the store.
pub struct Orchestrator {
    cancellation_token: CancellationToken,
    num_mappers: usize,
    num_reducers: usize,
}

impl Orchestrator {
    /// Rejects zero worker counts up front; the shard count equals
    /// `num_reducers` for the whole run.
    pub fn new(num_mappers: usize, num_reducers: usize) -> Result<Self, MapReduceError> {
        if num_mappers == 0 {
            return Err(MapReduceError::InvalidConfig(
                "mapper count must be at least 1".to_string(),
            ));
        }
        if num_reducers == 0 {
            return Err(MapReduceError::InvalidConfig(
                "reducer count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            cancellation_token: CancellationToken::new(),
            num_mappers,
            num_reducers,
        })
    }

    /// Returns a clone of the cancellation token for external control.
    /// Workers honor it between items (map) and between keys (reduce).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Runs the complete map-reduce workflow; returns once both phases have
    /// finished and the store has been torn down.
    pub async fn run(
        &mut self,
        inputs: Vec<String>,
        map_fn: Arc<MapFn>,
        reduce_fn: Arc<ReduceFn>,
        partition_fn: PartitionFn,
    ) -> Result<(), MapReduceError> {
        let store = Arc::new(PartitionStore::new(self.num_reducers, partition_fn));

        info!(
            inputs = inputs.len(),
            mappers = self.num_mappers,
            shards = store.shard_count(),
            "map phase started"
        );

        // Round-robin the items so every input is processed exactly once.
        let mut batches: Vec<Vec<String>> = (0..self.num_mappers).map(|_| Vec::new()).collect();
        for (i, input) in inputs.into_iter().enumerate() {
            batches[i % self.num_mappers].push(input);
        }

        let mut mappers = Vec::with_capacity(self.num_mappers);
        for (id, items) in batches.into_iter().enumerate() {
            let mut mapper = Mapper::new(
                id,
                Emitter::new(store.clone()),
                map_fn.clone(),
                self.cancellation_token.clone(),
            );
            mapper.start(MapAssignment { items });
            mappers.push(mapper);
        }

        // Barrier 1: every emit by every mapper is visible before any
        // reducer starts.
        let mut failure = None;
        for mapper in mappers {
            if let Err(error) = mapper.wait().await {
                self.cancellation_token.cancel();
                record_failure(&mut failure, error);
            }
        }
        if let Some(error) = failure {
            return Err(error);
        }
        if self.cancellation_token.is_cancelled() {
            return Err(MapReduceError::Cancelled);
        }
        info!("map phase complete");

        info!(reducers = self.num_reducers, "reduce phase started");
        let mut reducers = Vec::with_capacity(self.num_reducers);
        for shard in 0..self.num_reducers {
            let entries = store.take_shard(shard);
            let mut reducer =
                Reducer::new(shard, reduce_fn.clone(), self.cancellation_token.clone());
            reducer.start(ReduceAssignment { entries });
            reducers.push(reducer);
        }

        // Barrier 2; the store (and anything left undrained) is dropped when
        // this function returns, on success and error paths alike.
        let mut failure = None;
        for reducer in reducers {
            if let Err(error) = reducer.wait().await {
                self.cancellation_token.cancel();
                record_failure(&mut failure, error);
            }
        }
        if let Some(error) = failure {
            return Err(error);
        }
        if self.cancellation_token.is_cancelled() {
            return Err(MapReduceError::Cancelled);
        }
        info!("reduce phase complete");

        Ok(())
    }
}

/// Keeps the first failure, except that a root-cause error displaces a
/// follow-on `Cancelled` from workers that were stopped because of it.
fn record_failure(slot: &mut Option<MapReduceError>, error: MapReduceError) {
    match slot {
        None => *slot = Some(error),
        Some(MapReduceError::Cancelled) if !matches!(error, MapReduceError::Cancelled) => {
            *slot = Some(error)
        }
        Some(_) => {}
    }
}
