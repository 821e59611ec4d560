use std::any::Any;

use crate::Result;

/// Number of worker threads used by [`WorkQueue::with_default_threads`].
pub const DEFAULT_THREADS: usize = 5;

/// A boxed unit of work as stored in a pool's queue.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size pool of worker threads executing jobs concurrently.
///
/// Besides spawning, a pool tracks how many jobs are outstanding (queued or
/// running) so callers can wait for quiescence without stopping the pool.
pub trait ThreadPool {
    /// Creates a new thread pool, immediately spawning the given number of
    /// threads.
    ///
    /// # Errors
    ///
    /// Returns an error if `threads` is zero or a thread fails to spawn. All
    /// previously spawned threads are terminated in that case.
    fn new(threads: usize) -> Result<Self>
    where
        Self: Sized;

    /// Spawns a job into the thread pool.
    ///
    /// If the job panics the pool keeps operating with the same number of
    /// threads and the job still counts as finished.
    ///
    /// # Errors
    ///
    /// Returns [`WorkqError::ShutDown`](crate::WorkqError::ShutDown) if the
    /// pool has been shut down. The job is dropped without running.
    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static;

    /// Blocks until every spawned job has finished, including jobs spawned
    /// while waiting. The pool stays usable afterwards.
    ///
    /// Must not be called from a job running on the same pool.
    fn finish(&self);

    /// Stops accepting jobs and tells idle workers to exit. Running jobs are
    /// not interrupted; jobs that have not started yet are discarded.
    ///
    /// Calling it more than once has no further effect.
    fn shutdown(&self);

    /// Waits for all jobs, shuts the pool down and waits for every worker
    /// thread to terminate.
    fn join(self) -> Result<()>
    where
        Self: Sized;

    /// Returns the number of worker threads.
    fn size(&self) -> usize;
}

mod rayon_pool;
mod work_queue;

pub use self::rayon_pool::RayonThreadPool;
pub use self::work_queue::{Spawner, WorkQueue};

/// Extracts the message of a caught panic, if it carried one.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
