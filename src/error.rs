use std::io;
use thiserror::Error;

/// Error type for work queue and prime finder operations.
#[derive(Error, Debug)]
pub enum WorkqError {
    /// IO error, e.g. a worker thread could not be spawned.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error while writing a report.
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The rayon thread pool could not be built.
    #[error("Failed to build rayon pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    /// A pool needs at least one worker thread.
    #[error("Invalid thread count {0}: at least one worker thread is required")]
    InvalidThreadCount(usize),

    /// The upper bound of a range must not be negative.
    #[error("Invalid range bound {0}: must not be negative")]
    NegativeBound(i64),

    /// A job was submitted after the pool was shut down.
    #[error("Work queue has been shut down")]
    ShutDown,

    /// Worker threads died instead of exiting cleanly.
    #[error("{0} worker thread(s) panicked")]
    WorkerPanicked(usize),

    /// The parallel result differs from the sequential baseline.
    #[error("Result mismatch: baseline found {expected} primes, parallel run found {actual}")]
    ResultMismatch {
        /// Number of primes found by the baseline.
        expected: usize,
        /// Number of primes found by the parallel run.
        actual: usize,
    },
}

/// Result type alias for workq operations.
pub type Result<T> = std::result::Result<T, WorkqError>;
