use std::collections::BTreeSet;

use crossbeam::channel;
use log::debug;

use crate::primes::is_prime;
use crate::thread_pool::ThreadPool;
use crate::{Result, WorkqError};

/// Range partitioning and merging of per-chunk results.
pub mod chunk;

use self::chunk::partition;

/// Number of chunks handed to the pool per worker thread by default.
pub const DEFAULT_CHUNKS_PER_THREAD: usize = 4;

/// Matches from one chunk, sent back to the dispatching thread.
struct Partial {
    index: usize,
    found: Vec<u64>,
}

/// Filters the range `[1, max]` in parallel on a thread pool.
///
/// The range is cut into contiguous chunks, one job per chunk. Each job
/// collects its matches privately and hands them back once; after the pool
/// is quiescent the partials are concatenated in chunk order, which yields
/// the same ordered set as a sequential scan.
///
/// The processor never shuts its pool down, so it can be used for any
/// number of calls. Call [`into_pool`](Self::into_pool) and
/// [`join`](ThreadPool::join) for full cleanup.
pub struct RangeProcessor<P: ThreadPool> {
    pool: P,
    predicate: fn(u64) -> bool,
    chunks_per_thread: usize,
}

impl<P: ThreadPool> RangeProcessor<P> {
    /// Creates a processor that finds primes on the given pool.
    pub fn new(pool: P) -> Self {
        RangeProcessor {
            pool,
            predicate: is_prime,
            chunks_per_thread: DEFAULT_CHUNKS_PER_THREAD,
        }
    }

    /// Replaces the predicate applied to every value.
    ///
    /// The predicate runs concurrently on several workers and must be
    /// deterministic. If it panics, the chunk it was working on yields no
    /// matches and a warning is logged.
    pub fn with_predicate(mut self, predicate: fn(u64) -> bool) -> Self {
        self.predicate = predicate;
        self
    }

    /// Sets how many chunks are created per worker thread (at least one).
    pub fn with_chunks_per_thread(mut self, chunks_per_thread: usize) -> Self {
        self.chunks_per_thread = chunks_per_thread.max(1);
        self
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Consumes the processor, returning the underlying pool.
    pub fn into_pool(self) -> P {
        self.pool
    }

    /// Returns every value in `[1, max]` accepted by the predicate, in
    /// ascending order.
    ///
    /// Waits for the pool to become quiescent, so any other work submitted to
    /// the same pool is waited for as well.
    ///
    /// # Errors
    ///
    /// Returns [`WorkqError::NegativeBound`] if `max` is negative, before any
    /// job is submitted, and [`WorkqError::ShutDown`] if the pool no longer
    /// accepts jobs.
    pub fn process(&self, max: i64) -> Result<BTreeSet<u64>> {
        let max = u64::try_from(max).map_err(|_| WorkqError::NegativeBound(max))?;

        let count = self.pool.size().saturating_mul(self.chunks_per_thread);
        let chunks = partition(max, count);
        debug!(
            "Dispatching {} chunks over [1, {}] to {} workers",
            chunks.len(),
            max,
            self.pool.size()
        );

        let (tx, rx) = channel::unbounded();
        for (index, chunk) in chunks.iter().copied().enumerate() {
            let tx = tx.clone();
            let predicate = self.predicate;
            self.pool.spawn(move || {
                let found = chunk.values().filter(|&n| predicate(n)).collect();
                // The receiver outlives every job unless dispatch failed.
                let _ = tx.send(Partial { index, found });
            })?;
        }
        drop(tx);

        self.pool.finish();

        let mut partials = vec![None; chunks.len()];
        for Partial { index, found } in rx.try_iter() {
            partials[index] = Some(found);
        }
        let merged = chunk::merge(&chunks, partials);
        debug!("Merged {} matches from {} chunks", merged.len(), chunks.len());
        Ok(merged)
    }
}
