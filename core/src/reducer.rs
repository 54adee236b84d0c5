use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CallbackError, MapReduceError, Phase};
use crate::values::ValueIter;

/// User Reduce callback: called exactly once per distinct key with a draining
/// iterator over that key's values and the index of the shard the key lives
/// on. Expected to drain the iterator before returning.
pub type ReduceFn = dyn Fn(&str, &mut ValueIter, usize) -> Result<(), CallbackError> + Send + Sync;

/// Reduce assignment: exclusive ownership of one shard's contents, taken out
/// of the store after the map barrier. No lock is needed from here on —
/// each shard has exactly one reader.
pub struct ReduceAssignment {
    pub entries: BTreeMap<String, Vec<String>>,
}

/// Reduce worker for one shard; its id is the shard index.
pub struct Reducer {
    id: usize,
    reduce_fn: Arc<ReduceFn>,
    cancel_token: CancellationToken,
    task_handle: Option<JoinHandle<Result<(), MapReduceError>>>,
}

impl Reducer {
    pub fn new(id: usize, reduce_fn: Arc<ReduceFn>, cancel_token: CancellationToken) -> Self {
        Self {
            id,
            reduce_fn,
            cancel_token,
            task_handle: None,
        }
    }

    /// Starts reducing the assigned shard, visiting keys in ascending order.
    pub fn start(&mut self, assignment: ReduceAssignment) {
        let id = self.id;
        let reduce_fn = self.reduce_fn.clone();
        let cancel_token = self.cancel_token.clone();

        let handle = tokio::spawn(async move {
            debug!(reducer = id, keys = assignment.entries.len(), "reducer started");
            for (key, values) in assignment.entries {
                if cancel_token.is_cancelled() {
                    debug!(reducer = id, "reducer cancelled");
                    return Err(MapReduceError::Cancelled);
                }
                let mut iter = ValueIter::new(values);
                reduce_fn(&key, &mut iter, id)
                    .map_err(|source| MapReduceError::ReduceFailed { worker: id, source })?;
            }
            debug!(reducer = id, "reducer finished");
            Ok(())
        });

        self.task_handle = Some(handle);
    }

    /// Waits for the reducer task to complete.
    pub async fn wait(self) -> Result<(), MapReduceError> {
        let Some(handle) = self.task_handle else {
            return Ok(());
        };
        match handle.await {
            Ok(result) => result,
            Err(_) => Err(MapReduceError::WorkerPanicked {
                phase: Phase::Reduce,
                worker: self.id,
            }),
        }
    }
}
