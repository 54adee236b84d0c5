use std::sync::Arc;

use shard_reduce_core::{
    default_hash_partition, run, EmitError, Emitter, MapFn, MapReduceError, Orchestrator, Phase,
    ReduceFn, ValueIter,
};

fn noop_map() -> Arc<MapFn> {
    Arc::new(|_item: &str, _emitter: &Emitter| Ok(()))
}

fn draining_reduce() -> Arc<ReduceFn> {
    Arc::new(|_key: &str, values: &mut ValueIter, _shard| {
        while values.next().is_some() {}
        Ok(())
    })
}

fn emit_one() -> Arc<MapFn> {
    Arc::new(|_item: &str, emitter: &Emitter| {
        emitter.emit("k", "v")?;
        Ok(())
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_worker_counts_are_rejected_before_any_work() {
    let result = run(
        vec!["x".to_string()],
        noop_map(),
        0,
        draining_reduce(),
        1,
        Arc::new(default_hash_partition),
    )
    .await;
    assert!(matches!(result, Err(MapReduceError::InvalidConfig(_))));

    let result = run(
        vec!["x".to_string()],
        noop_map(),
        1,
        draining_reduce(),
        0,
        Arc::new(default_hash_partition),
    )
    .await;
    assert!(matches!(result, Err(MapReduceError::InvalidConfig(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn map_callback_error_fails_the_whole_run() {
    let map_fn: Arc<MapFn> = Arc::new(|item: &str, _emitter: &Emitter| {
        Err(format!("cannot process {item}").into())
    });

    let result = run(
        vec!["x".to_string()],
        map_fn,
        1,
        draining_reduce(),
        2,
        Arc::new(default_hash_partition),
    )
    .await;
    assert!(matches!(
        result,
        Err(MapReduceError::MapFailed { worker: 0, .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn reduce_callback_error_fails_the_whole_run() {
    let reduce_fn: Arc<ReduceFn> =
        Arc::new(|key: &str, _values: &mut ValueIter, _shard| Err(format!("bad key {key}").into()));

    let result = run(
        vec!["x".to_string()],
        emit_one(),
        1,
        reduce_fn,
        1,
        Arc::new(default_hash_partition),
    )
    .await;
    assert!(matches!(result, Err(MapReduceError::ReduceFailed { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_key_surfaces_as_map_failure() {
    let map_fn: Arc<MapFn> = Arc::new(|_item: &str, emitter: &Emitter| {
        emitter.emit("", "v")?;
        Ok(())
    });

    let result = run(
        vec!["x".to_string()],
        map_fn,
        1,
        draining_reduce(),
        1,
        Arc::new(default_hash_partition),
    )
    .await;
    match result {
        Err(MapReduceError::MapFailed { source, .. }) => {
            assert_eq!(source.downcast_ref(), Some(&EmitError::EmptyKey));
        }
        other => panic!("expected MapFailed, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_map_callback_is_reported_not_swallowed() {
    let map_fn: Arc<MapFn> = Arc::new(|_item: &str, _emitter: &Emitter| panic!("out of memory"));

    let result = run(
        vec!["x".to_string()],
        map_fn,
        1,
        draining_reduce(),
        1,
        Arc::new(default_hash_partition),
    )
    .await;
    assert!(matches!(
        result,
        Err(MapReduceError::WorkerPanicked {
            phase: Phase::Map,
            ..
        })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_token_aborts_the_run() {
    let mut orchestrator = Orchestrator::new(2, 2).unwrap();
    orchestrator.cancellation_token().cancel();

    let result = orchestrator
        .run(
            vec!["x".to_string(), "y".to_string()],
            emit_one(),
            draining_reduce(),
            Arc::new(default_hash_partition),
        )
        .await;
    assert!(matches!(result, Err(MapReduceError::Cancelled)));
}
