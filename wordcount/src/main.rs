use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use shard_reduce_core::{
    default_hash_partition, Emitter, MapFn, Orchestrator, ReduceFn, ValueIter,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Counts words across text files with a two-phase map-reduce run.
#[derive(Parser)]
#[command(name = "wordcount")]
struct Args {
    /// Input text files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of map workers
    #[arg(short, long, default_value_t = 4)]
    mappers: usize,

    /// Number of reduce workers (also the shard count)
    #[arg(short, long, default_value_t = 4)]
    reducers: usize,

    /// Print the result as JSON instead of a text table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    files: usize,
    distinct_words: usize,
    total_words: u64,
    counts: BTreeMap<String, u64>,
}

fn normalize(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let mut inputs = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        inputs.push(contents);
    }
    info!(files = inputs.len(), "inputs loaded");

    let map_fn: Arc<MapFn> = Arc::new(|item: &str, emitter: &Emitter| {
        for token in item.split_whitespace() {
            let word = normalize(token);
            if !word.is_empty() {
                emitter.emit(&word, "1")?;
            }
        }
        Ok(())
    });

    let counts: Arc<Mutex<BTreeMap<String, u64>>> = Arc::new(Mutex::new(BTreeMap::new()));
    let reduce_counts = counts.clone();
    let reduce_fn: Arc<ReduceFn> = Arc::new(move |key: &str, values: &mut ValueIter, _shard| {
        let mut total = 0u64;
        while values.next().is_some() {
            total += 1;
        }
        reduce_counts.lock().unwrap().insert(key.to_string(), total);
        Ok(())
    });

    let mut orchestrator = Orchestrator::new(args.mappers, args.reducers)?;

    // Ctrl-C cancels the run; workers stop at the next item/key boundary.
    let cancel_token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, cancelling run");
            cancel_token.cancel();
        }
    });

    orchestrator
        .run(
            inputs,
            map_fn,
            reduce_fn,
            Arc::new(default_hash_partition),
        )
        .await?;

    let counts = Arc::try_unwrap(counts)
        .map_err(|_| anyhow::anyhow!("count map still shared after run"))?
        .into_inner()
        .unwrap();

    if args.json {
        let report = Report {
            files: args.files.len(),
            distinct_words: counts.len(),
            total_words: counts.values().sum(),
            counts,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (word, count) in &counts {
            println!("{word} {count}");
        }
    }

    info!(elapsed = ?start_time.elapsed(), "run complete");
    Ok(())
}
