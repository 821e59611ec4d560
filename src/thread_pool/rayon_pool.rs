use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::{panic_message, ThreadPool};
use crate::{Result, WorkqError};

/// A thread pool backed by the `rayon` library.
///
/// Rayon schedules the jobs; completion tracking and shutdown are layered on
/// top with a pending counter guarded by a mutex. Jobs that have not started
/// when shutdown is requested are skipped. The worker threads are spawned
/// here rather than by rayon so they can be joined.
pub struct RayonThreadPool {
    pool: Option<rayon::ThreadPool>,
    tracker: Arc<Tracker>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

struct Tracker {
    state: Mutex<TrackerState>,
    /// Signalled when `pending` drops to zero.
    idle: Condvar,
}

struct TrackerState {
    pending: usize,
    shutdown: bool,
}

impl Tracker {
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<()> {
        let mut state = self.lock();
        if state.shutdown {
            return Err(WorkqError::ShutDown);
        }
        state.pending += 1;
        Ok(())
    }

    fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    fn complete(&self) {
        let mut state = self.lock();
        state.pending -= 1;
        if state.pending == 0 {
            self.idle.notify_all();
        }
    }
}

impl RayonThreadPool {
    /// Drops the rayon pool, which tells its threads to exit, and waits for
    /// each of them to terminate.
    fn join_workers(&mut self) -> Result<()> {
        drop(self.pool.take());

        let mut panicked = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }

        if panicked > 0 {
            return Err(WorkqError::WorkerPanicked(panicked));
        }
        debug!("All rayon threads terminated");
        Ok(())
    }
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(WorkqError::InvalidThreadCount(threads));
        }

        let handles = Arc::new(Mutex::new(Vec::with_capacity(threads)));
        let spawned = Arc::clone(&handles);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|id| format!("workq-rayon-{id}"))
            .spawn_handler(move |worker| {
                let mut builder = thread::Builder::new();
                if let Some(name) = worker.name() {
                    builder = builder.name(name.to_owned());
                }
                if let Some(stack_size) = worker.stack_size() {
                    builder = builder.stack_size(stack_size);
                }
                let handle = builder.spawn(move || worker.run())?;
                spawned
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(handle);
                Ok(())
            })
            .build()?;
        let workers = mem::take(&mut *handles.lock().unwrap_or_else(PoisonError::into_inner));

        debug!("Rayon pool initialized with {threads} threads");
        Ok(RayonThreadPool {
            pool: Some(pool),
            tracker: Arc::new(Tracker {
                state: Mutex::new(TrackerState {
                    pending: 0,
                    shutdown: false,
                }),
                idle: Condvar::new(),
            }),
            workers,
            size: threads,
        })
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let pool = self.pool.as_ref().ok_or(WorkqError::ShutDown)?;
        self.tracker.begin()?;

        let tracker = Arc::clone(&self.tracker);
        pool.spawn(move || {
            if tracker.is_shutdown() {
                debug!("Skipping job queued before shutdown");
            } else if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                error!("Rayon job panicked, continuing: {}", panic_message(&*payload));
            }
            tracker.complete();
        });
        Ok(())
    }

    fn finish(&self) {
        let _state = self
            .tracker
            .idle
            .wait_while(self.tracker.lock(), |state| state.pending > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn shutdown(&self) {
        let mut state = self.tracker.lock();
        if !state.shutdown {
            state.shutdown = true;
            debug!("Rayon pool triggering shutdown");
        }
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

impl Drop for RayonThreadPool {
    fn drop(&mut self) {
        self.shutdown();
        if let Err(e) = self.join_workers() {
            error!("Error while dropping rayon pool: {e}");
        }
    }
}
