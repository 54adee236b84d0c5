use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::EmitError;
use crate::partition::PartitionFn;

/// One independently lockable slice of the key space. Keys are kept in a
/// `BTreeMap` so reducers enumerate them in ascending order; each value list
/// is appended at the tail and drained from the tail (LIFO).
struct Shard {
    entries: Mutex<BTreeMap<String, Vec<String>>>,
}

/// The shared state of one run: a fixed array of shards plus the partitioner
/// chosen at run start. Built per run and passed explicitly to everything
/// that touches it; nothing here is process-global.
pub struct PartitionStore {
    shards: Vec<Shard>,
    partition_fn: PartitionFn,
}

impl PartitionStore {
    pub fn new(shard_count: usize, partition_fn: PartitionFn) -> Self {
        let shards = (0..shard_count)
            .map(|_| Shard {
                entries: Mutex::new(BTreeMap::new()),
            })
            .collect();
        Self {
            shards,
            partition_fn,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Records one key/value pair. Safe for unbounded concurrent callers;
    /// only callers hitting the same shard serialize on its lock.
    pub fn emit(&self, key: &str, value: &str) -> Result<(), EmitError> {
        if key.is_empty() {
            return Err(EmitError::EmptyKey);
        }
        let index = (self.partition_fn)(key, self.shards.len());
        if index >= self.shards.len() {
            return Err(EmitError::PartitionOutOfRange {
                index,
                shard_count: self.shards.len(),
            });
        }
        let mut entries = self.shards[index].entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(values) => values.push(value.to_string()),
            None => {
                entries.insert(key.to_string(), vec![value.to_string()]);
            }
        }
        Ok(())
    }

    /// Moves a shard's contents out, leaving it empty. Called once per shard
    /// after the map barrier to hand the reduce worker exclusive ownership.
    pub fn take_shard(&self, index: usize) -> BTreeMap<String, Vec<String>> {
        std::mem::take(&mut *self.shards[index].entries.lock().unwrap())
    }
}

/// Write handle passed to Map callbacks; binds `emit` to the active run's
/// store.
#[derive(Clone)]
pub struct Emitter {
    store: Arc<PartitionStore>,
}

impl Emitter {
    pub(crate) fn new(store: Arc<PartitionStore>) -> Self {
        Self { store }
    }

    /// Records one key/value pair into the active run. Rejects empty keys.
    pub fn emit(&self, key: &str, value: &str) -> Result<(), EmitError> {
        self.store.emit(key, value)
    }
}
