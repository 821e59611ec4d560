#![deny(missing_docs)]

//! A bounded work queue with quiescence waits, and a parallel prime finder
//! built on top of it.
//!
//! The [`WorkQueue`] runs jobs on a fixed set of worker threads. Callers can
//! wait for all outstanding work with [`ThreadPool::finish`] without stopping
//! the pool, or tear it down with [`ThreadPool::join`]. The
//! [`RangeProcessor`] splits an integer range into chunks, runs them on a
//! pool and merges the results into the same ordered set a sequential scan
//! would produce.

mod error;
/// Prime testing, the sequential baseline and the parallel entry point.
pub mod primes;
/// Parallel filtering of integer ranges.
pub mod range;
mod report;
/// Thread pool implementations with completion tracking.
pub mod thread_pool;

pub use error::{Result, WorkqError};
pub use primes::{find_primes, is_prime, trial_division};
pub use range::RangeProcessor;
pub use report::{PoolKind, Report};
pub use thread_pool::{RayonThreadPool, Spawner, ThreadPool, WorkQueue, DEFAULT_THREADS};
