//! Single-machine MapReduce execution library.
//!
//! Inputs are fed through a pool of map workers; every key/value pair they
//! emit lands in one of N independently locked shards chosen by a pluggable
//! partitioner. Once all mappers have joined, one reduce worker per shard
//! drains the values for each of its keys through a single-pass iterator.
//!
//! All run state lives in a per-run store owned by the [`Orchestrator`], so
//! independent runs can execute concurrently in one process.

mod error;
mod mapper;
mod orchestrator;
mod partition;
mod reducer;
mod store;
mod values;

use std::sync::Arc;

pub use error::{CallbackError, EmitError, MapReduceError, Phase};
pub use mapper::{MapAssignment, MapFn, Mapper};
pub use orchestrator::Orchestrator;
pub use partition::{default_hash_partition, PartitionFn};
pub use reducer::{ReduceAssignment, ReduceFn, Reducer};
pub use store::{Emitter, PartitionStore};
pub use values::ValueIter;

/// One-call entry point: runs both phases to completion over `inputs`.
///
/// `num_reducers` is also the shard count. The run either completes with
/// every key reduced or fails as a whole.
pub async fn run(
    inputs: Vec<String>,
    map_fn: Arc<MapFn>,
    num_mappers: usize,
    reduce_fn: Arc<ReduceFn>,
    num_reducers: usize,
    partition_fn: PartitionFn,
) -> Result<(), MapReduceError> {
    let mut orchestrator = Orchestrator::new(num_mappers, num_reducers)?;
    orchestrator
        .run(inputs, map_fn, reduce_fn, partition_fn)
        .await
}
