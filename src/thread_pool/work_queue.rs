use std::collections::VecDeque;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, warn};

use super::{panic_message, Job, ThreadPool, DEFAULT_THREADS};
use crate::{Result, WorkqError};

/// A thread pool with a single FIFO job queue and quiescence tracking.
///
/// The queue, the number of pending jobs and the shutdown flag live under one
/// mutex. Workers sleep on a condition variable until a job is queued or
/// shutdown is requested, and [`finish`](ThreadPool::finish) sleeps on a
/// second one that is signalled when the pending count drops to zero.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

/// A cloneable handle for submitting jobs to a [`WorkQueue`].
///
/// Jobs can capture a `Spawner` to submit follow-up jobs to the queue that
/// runs them. Those jobs are tracked like any other, so a
/// [`finish`](ThreadPool::finish) in progress keeps waiting for them.
#[derive(Clone)]
pub struct Spawner {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<State>,
    /// Signalled when a job is queued or shutdown is requested.
    available: Condvar,
    /// Signalled when `pending` drops to zero.
    idle: Condvar,
}

struct State {
    queue: VecDeque<Job>,
    /// Queued plus running jobs.
    pending: usize,
    shutdown: bool,
}

impl Shared {
    fn new() -> Self {
        Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                pending: 0,
                shutdown: false,
            }),
            available: Condvar::new(),
            idle: Condvar::new(),
        }
    }

    /// Jobs run outside the lock, so a poisoned mutex still holds a
    /// consistent state.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, job: Job) -> Result<()> {
        let mut state = self.lock();
        if state.shutdown {
            return Err(WorkqError::ShutDown);
        }
        state.queue.push_back(job);
        state.pending += 1;
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Blocks until a job is available, or returns `None` once shutdown has
    /// been requested.
    fn next_job(&self) -> Option<Job> {
        let mut state = self
            .available
            .wait_while(self.lock(), |state| {
                state.queue.is_empty() && !state.shutdown
            })
            .unwrap_or_else(PoisonError::into_inner);

        if state.shutdown {
            return None;
        }
        state.queue.pop_front()
    }

    fn complete(&self) {
        let mut state = self.lock();
        state.pending -= 1;
        if state.pending == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let _state = self
            .idle
            .wait_while(self.lock(), |state| state.pending > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn shutdown(&self) {
        let mut state = self.lock();
        if state.shutdown {
            return;
        }
        state.shutdown = true;
        let discarded = mem::take(&mut state.queue);
        state.pending -= discarded.len();
        let idle = state.pending == 0;
        drop(state);

        debug!("Work queue triggering shutdown");
        if !discarded.is_empty() {
            warn!("Discarding {} queued jobs on shutdown", discarded.len());
        }
        self.available.notify_all();
        if idle {
            self.idle.notify_all();
        }
        // Dropped outside the lock: captured values may run arbitrary code.
        drop(discarded);
    }
}

impl WorkQueue {
    /// Creates a work queue with [`DEFAULT_THREADS`] worker threads.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread fails to spawn.
    pub fn with_default_threads() -> Result<Self> {
        Self::new(DEFAULT_THREADS)
    }

    /// Returns a handle that submits jobs to this queue.
    pub fn spawner(&self) -> Spawner {
        Spawner {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns the number of jobs that are queued or running.
    pub fn pending(&self) -> usize {
        self.shared.lock().pending
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shared.lock().shutdown
    }

    fn join_workers(&mut self) -> Result<()> {
        let mut panicked = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }

        if panicked > 0 {
            return Err(WorkqError::WorkerPanicked(panicked));
        }
        debug!("All worker threads terminated");
        Ok(())
    }
}

impl ThreadPool for WorkQueue {
    fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(WorkqError::InvalidThreadCount(threads));
        }

        let shared = Arc::new(Shared::new());
        let mut workers = Vec::with_capacity(threads);
        for id in 0..threads {
            match spawn_worker(id, Arc::clone(&shared)) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    shared.shutdown();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(e);
                }
            }
        }

        debug!("Work queue initialized with {threads} worker threads");
        Ok(WorkQueue {
            shared,
            workers,
            size: threads,
        })
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Box::new(job))
    }

    fn finish(&self) {
        self.shared.wait_idle();
    }

    fn shutdown(&self) {
        self.shared.shutdown();
    }

    fn join(mut self) -> Result<()> {
        self.finish();
        self.shutdown();
        self.join_workers()
    }

    fn size(&self) -> usize {
        self.size
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shared.shutdown();
        if let Err(e) = self.join_workers() {
            error!("Error while dropping work queue: {e}");
        }
    }
}

impl Spawner {
    /// Submits a job to the queue this handle was created from.
    ///
    /// # Errors
    ///
    /// Returns [`WorkqError::ShutDown`] if the queue has been shut down.
    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Box::new(job))
    }
}

/// Spawns a single worker thread that pulls jobs from the shared queue until
/// shutdown is requested.
fn spawn_worker(id: usize, shared: Arc<Shared>) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name(format!("workq-worker-{id}"))
        .spawn(move || {
            while let Some(job) = shared.next_job() {
                debug!("Worker {id} executing job");
                // Catch panics so the worker loop continues
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    error!(
                        "Worker {id} job panicked, continuing: {}",
                        panic_message(&*payload)
                    );
                }
                shared.complete();
            }
            debug!("Worker {id}: shutdown requested, exiting");
        })?;
    Ok(handle)
}
