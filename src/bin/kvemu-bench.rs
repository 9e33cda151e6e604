//! kvemu workload driver
//!
//! Runs a store / retrieve / iterate / group-delete workload against the
//! emulator and reports per-phase throughput.

use std::time::{Duration, Instant};

use clap::Parser;
use kvemu::protocol::BatchReader;
use kvemu::{Config, GroupCondition, IteratorMode, KvEmulator, PurgeOption, StoreOption};
use tracing_subscriber::{fmt, EnvFilter};

/// kvemu workload driver
#[derive(Parser, Debug)]
#[command(name = "kvemu-bench")]
#[command(about = "Drive a synthetic workload through the KV-SSD emulator")]
#[command(version)]
struct Args {
    /// Device capacity in MB (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    capacity_mb: u64,

    /// Number of keys to store
    #[arg(short, long, default_value = "100000")]
    keys: u64,

    /// Value size in bytes
    #[arg(short, long, default_value = "4096")]
    value_size: usize,

    /// Number of key groups (distinct 4-byte prefixes)
    #[arg(short, long, default_value = "16")]
    groups: u32,

    /// Worker threads for the store and retrieve phases
    #[arg(short, long, default_value = "4")]
    threads: u64,

    /// Iterator batch buffer size in KB
    #[arg(short, long, default_value = "32")]
    batch_kb: usize,

    /// Enable simulated device latency
    #[arg(long)]
    iops_model: bool,

    /// IOPS model coefficients, lowest order first (ns, ns/byte, ...)
    #[arg(long, value_delimiter = ',', default_value = "20000,2")]
    coefficients: Vec<f64>,
}

/// Key layout: 4-byte big-endian group id, then 8-byte big-endian index
fn make_key(group: u32, index: u64) -> [u8; 12] {
    let mut key = [0u8; 12];
    key[..4].copy_from_slice(&group.to_be_bytes());
    key[4..].copy_from_slice(&index.to_be_bytes());
    key
}

fn report(phase: &str, ops: u64, elapsed: Duration) {
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    tracing::info!(
        "{:<10} {:>10} ops in {:>8.3}s ({:>12.0} ops/s)",
        phase,
        ops,
        secs,
        ops as f64 / secs
    );
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvemu=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("kvemu workload driver v{}", kvemu::VERSION);

    let config = Config::builder()
        .capacity(args.capacity_mb * 1024 * 1024)
        .use_iops_model(args.iops_model)
        .iops_model_coefficients(args.coefficients.clone())
        .build();

    let engine = match KvEmulator::new(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to create emulator: {}", e);
            std::process::exit(1);
        }
    };

    let groups = args.groups.max(1);
    let threads = args.threads.max(1);
    let value = vec![0xA5u8; args.value_size];

    // -------------------------------------------------------------------------
    // Store
    // -------------------------------------------------------------------------
    let started = Instant::now();
    let stored = crossbeam::scope(|s| {
        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let engine = &engine;
                let value = &value;
                s.spawn(move |_| {
                    let mut ok = 0u64;
                    for i in (t..args.keys).step_by(threads as usize) {
                        let key = make_key((i % groups as u64) as u32, i);
                        match engine.store(&key, value, StoreOption::None) {
                            Ok(_) => ok += 1,
                            Err(e) => tracing::debug!("store {} failed: {}", i, e),
                        }
                    }
                    ok
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap_or(0)).sum::<u64>()
    });
    let stored = match stored {
        Ok(n) => n,
        Err(_) => {
            tracing::error!("store worker panicked");
            std::process::exit(1);
        }
    };
    report("store", stored, started.elapsed());

    // -------------------------------------------------------------------------
    // Retrieve
    // -------------------------------------------------------------------------
    let started = Instant::now();
    let read = crossbeam::scope(|s| {
        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let engine = &engine;
                let value_size = args.value_size;
                s.spawn(move |_| {
                    let mut buf = vec![0u8; value_size];
                    let mut ok = 0u64;
                    for i in (t..args.keys).step_by(threads as usize) {
                        let key = make_key((i % groups as u64) as u32, i);
                        if engine.retrieve(&key, 0, &mut buf).is_ok() {
                            ok += 1;
                        }
                    }
                    ok
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap_or(0)).sum::<u64>()
    })
    .unwrap_or(0);
    report("retrieve", read, started.elapsed());

    // -------------------------------------------------------------------------
    // Iterate one group in batches
    // -------------------------------------------------------------------------
    let started = Instant::now();
    let condition = GroupCondition::new(u32::MAX, 0);
    let mut iterated = 0u64;
    match engine.open_iterator(IteratorMode::KeyValue, condition, false) {
        Ok(handle) => {
            let mut buffer = vec![0u8; args.batch_kb * 1024];
            loop {
                let list = match engine.iterator_next_set(handle, &mut buffer) {
                    Ok(list) => list,
                    Err(e) => {
                        tracing::error!("next_set failed: {}", e);
                        break;
                    }
                };
                let records = BatchReader::new(&buffer[..list.len], list.num_entries, true, None);
                iterated += records.filter(|r| r.is_ok()).count() as u64;

                // A record larger than the whole buffer never fits
                if list.end || list.num_entries == 0 {
                    break;
                }
            }
            let _ = engine.close_iterator(handle);
        }
        Err(e) => tracing::error!("open_iterator failed: {}", e),
    }
    report("iterate", iterated, started.elapsed());

    // -------------------------------------------------------------------------
    // Group delete
    // -------------------------------------------------------------------------
    let started = Instant::now();
    let mut recovered = 0u64;
    for group in 0..groups {
        recovered += engine
            .delete_group(GroupCondition::new(u32::MAX, group))
            .unwrap_or(0);
    }
    report("del_group", groups as u64, started.elapsed());

    tracing::info!(
        recovered,
        remaining = engine.len(),
        used = engine.used_bytes(),
        "workload complete"
    );

    if let Err(e) = engine.purge(PurgeOption::Default) {
        tracing::error!("purge failed: {}", e);
    }
}
