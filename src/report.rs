use std::collections::BTreeSet;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

/// Thread pool implementation used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PoolKind {
    /// The mutex and condition variable based [`WorkQueue`](crate::WorkQueue).
    Queue,
    /// The [`RayonThreadPool`](crate::RayonThreadPool).
    Rayon,
}

/// Summary of one prime search, printed by the `primes` binary.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Upper bound of the search.
    pub max: i64,
    /// Number of worker threads.
    pub threads: usize,
    /// Pool implementation.
    pub pool: PoolKind,
    /// Number of primes found.
    pub count: usize,
    /// Wall-clock time of the parallel search in milliseconds.
    pub elapsed_ms: f64,
    /// The primes, in ascending order.
    pub primes: &'a BTreeSet<u64>,
}

impl<'a> Report<'a> {
    /// Builds a report for a finished search.
    pub fn new(
        max: i64,
        threads: usize,
        pool: PoolKind,
        elapsed: Duration,
        primes: &'a BTreeSet<u64>,
    ) -> Self {
        Report {
            max,
            threads,
            pool,
            count: primes.len(),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            primes,
        }
    }
}
