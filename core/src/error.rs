use thiserror::Error;

/// Error type user Map/Reduce callbacks may return to abort the run.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Rejections from [`Emitter::emit`](crate::Emitter::emit).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("empty key passed to emit")]
    EmptyKey,
    #[error("partitioner returned shard {index} but only {shard_count} shards exist")]
    PartitionOutOfRange { index: usize, shard_count: usize },
}

/// Phase a worker belonged to, for failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Map => write!(f, "map"),
            Phase::Reduce => write!(f, "reduce"),
        }
    }
}

/// A run either completes with every key reduced or fails as a whole;
/// there is no partial-success variant.
#[derive(Debug, Error)]
pub enum MapReduceError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("map worker {worker} failed: {source}")]
    MapFailed {
        worker: usize,
        #[source]
        source: CallbackError,
    },
    #[error("reduce worker {worker} failed: {source}")]
    ReduceFailed {
        worker: usize,
        #[source]
        source: CallbackError,
    },
    #[error("{phase} worker {worker} panicked")]
    WorkerPanicked { phase: Phase, worker: usize },
    #[error("run cancelled")]
    Cancelled,
}
