use std::sync::Arc;

/// Pluggable shard-selection function: maps a key to an index in
/// `[0, shard_count)`. Must be deterministic and pure for the whole run.
pub type PartitionFn = Arc<dyn Fn(&str, usize) -> usize + Send + Sync>;

/// Default partitioner: multiplicative string hash (seed 5381, multiplier 33
/// over the key's bytes) reduced modulo the shard count.
///
/// Panics if `shard_count` is zero; the orchestrator validates counts before
/// any partitioning happens.
pub fn default_hash_partition(key: &str, shard_count: usize) -> usize {
    let mut hash: u64 = 5381;
    for byte in key.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u64::from(byte));
    }
    (hash % shard_count as u64) as usize
}
