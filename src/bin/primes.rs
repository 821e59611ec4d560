use std::collections::BTreeSet;
use std::process::exit;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use workq::range::DEFAULT_CHUNKS_PER_THREAD;
use workq::{
    trial_division, PoolKind, RangeProcessor, RayonThreadPool, Report, Result, ThreadPool,
    WorkQueue, WorkqError,
};

const DEFAULT_MAX: i64 = 100;

#[derive(Parser)]
#[command(name = "primes", version, about = "Finds primes in parallel on a work queue")]
struct Cli {
    /// Largest value to test
    #[arg(long, default_value_t = DEFAULT_MAX, allow_negative_numbers = true)]
    max: i64,

    /// Number of worker threads [default: number of CPUs]
    #[arg(long)]
    threads: Option<usize>,

    /// Thread pool implementation
    #[arg(long, value_enum, default_value_t = PoolKind::Queue)]
    pool: PoolKind,

    /// Number of chunks per worker thread
    #[arg(long, default_value_t = DEFAULT_CHUNKS_PER_THREAD, value_name = "N")]
    chunks_per_thread: usize,

    /// Also run the sequential baseline and fail if the results differ
    #[arg(long)]
    compare: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    env_logger::builder()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let threads = cli.threads.unwrap_or_else(num_cpus::get);

    info!("primes {}", env!("CARGO_PKG_VERSION"));
    info!("Searching [1, {}] with {} {:?} workers", cli.max, threads, cli.pool);

    let start = Instant::now();
    let primes = match cli.pool {
        PoolKind::Queue => search(WorkQueue::new(threads)?, &cli)?,
        PoolKind::Rayon => search(RayonThreadPool::new(threads)?, &cli)?,
    };
    let elapsed = start.elapsed();
    info!("Found {} primes in {:?}", primes.len(), elapsed);

    if cli.compare {
        let expected = trial_division(cli.max);
        if expected != primes {
            return Err(WorkqError::ResultMismatch {
                expected: expected.len(),
                actual: primes.len(),
            });
        }
        info!("Result matches the sequential baseline");
    }

    let report = Report::new(cli.max, threads, cli.pool, elapsed, &primes);
    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{:?}", report.primes);
    }

    Ok(())
}

fn search<P: ThreadPool>(pool: P, cli: &Cli) -> Result<BTreeSet<u64>> {
    let finder = RangeProcessor::new(pool).with_chunks_per_thread(cli.chunks_per_thread);
    let primes = finder.process(cli.max)?;
    finder.into_pool().join()?;
    Ok(primes)
}
