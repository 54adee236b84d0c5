use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CallbackError, MapReduceError, Phase};
use crate::store::Emitter;

/// User Map callback: called once per input item with a write handle into the
/// run's store; emits zero or more key/value pairs.
pub type MapFn = dyn Fn(&str, &Emitter) -> Result<(), CallbackError> + Send + Sync;

/// Work assignment for a mapper: its round-robin share of the input items.
#[derive(Clone)]
pub struct MapAssignment {
    pub items: Vec<String>,
}

/// Map worker that feeds its assigned items through the user Map function.
pub struct Mapper {
    id: usize,
    emitter: Emitter,
    map_fn: Arc<MapFn>,
    cancel_token: CancellationToken,
    task_handle: Option<JoinHandle<Result<(), MapReduceError>>>,
}

impl Mapper {
    pub fn new(
        id: usize,
        emitter: Emitter,
        map_fn: Arc<MapFn>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            id,
            emitter,
            map_fn,
            cancel_token,
            task_handle: None,
        }
    }

    /// Starts processing the assigned input items.
    pub fn start(&mut self, assignment: MapAssignment) {
        let id = self.id;
        let emitter = self.emitter.clone();
        let map_fn = self.map_fn.clone();
        let cancel_token = self.cancel_token.clone();

        let handle = tokio::spawn(async move {
            debug!(mapper = id, items = assignment.items.len(), "mapper started");
            for item in &assignment.items {
                if cancel_token.is_cancelled() {
                    debug!(mapper = id, "mapper cancelled");
                    return Err(MapReduceError::Cancelled);
                }
                map_fn(item, &emitter)
                    .map_err(|source| MapReduceError::MapFailed { worker: id, source })?;
            }
            debug!(mapper = id, "mapper finished");
            Ok(())
        });

        self.task_handle = Some(handle);
    }

    /// Waits for the mapper task to complete.
    pub async fn wait(self) -> Result<(), MapReduceError> {
        let Some(handle) = self.task_handle else {
            return Ok(());
        };
        match handle.await {
            Ok(result) => result,
            Err(_) => Err(MapReduceError::WorkerPanicked {
                phase: Phase::Map,
                worker: self.id,
            }),
        }
    }
}
