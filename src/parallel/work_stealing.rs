//! A work-stealing pool of plain threads with idle-counter termination detection.
//!
//! Every worker owns a [`WorkQueue`]. A worker takes items from its own queue first and
//! only pushes to its own queue. When its queue is empty it increments the shared idle
//! counter and scans the other queues for something to steal; a successful steal
//! decrements the counter again. Since a worker is only counted idle while its own queue
//! is empty, the counter reaching the worker count means every queue is empty and no
//! worker can produce new items, so all workers stop.

use crate::error::{Result, RmiError};
use crate::parallel::WorkQueue;
use crate::utils::concatenate_vectors;
use log::{trace, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

/// Spins between steal attempts before yielding the thread.
const SPINS_BEFORE_YIELD: u32 = 64;

/// A pool of worker threads sharing items of type `I` by work stealing.
#[derive(Debug)]
pub struct WorkStealingPool<I> {
    queues: Vec<WorkQueue<I>>,
    idle: AtomicUsize,
    abort: AtomicBool,
}

/// The handle a work function gets to push follow-up items onto its worker's queue.
#[derive(Debug)]
pub struct Worker<'p, I> {
    pool: &'p WorkStealingPool<I>,
    index: usize,
}

impl<I> Worker<'_, I> {
    /// Index of this worker, in `0..threads`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Queues `item` on this worker's queue, where idle workers may steal it.
    pub fn push(&self, item: I) {
        self.pool.queues[self.index].push(item);
    }
}

/// Sets the abort flag if the worker unwinds, so the others stop waiting for it.
struct AbortOnPanic<'a>(&'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

#[derive(Debug, Default)]
struct WorkerStats {
    processed: usize,
    steals: usize,
}

impl<I: Send> WorkStealingPool<I> {
    /// Creates a pool of `threads` workers. No thread is started until [`run`].
    ///
    /// [`run`]: #method.run
    pub fn new(threads: usize) -> Result<WorkStealingPool<I>> {
        if threads == 0 {
            return Err(RmiError::InvalidThreadCount(threads));
        }
        Ok(WorkStealingPool {
            queues: (0..threads).map(|_| WorkQueue::new()).collect(),
            idle: AtomicUsize::new(0),
            abort: AtomicBool::new(false),
        })
    }

    /// Number of workers.
    pub fn threads(&self) -> usize {
        self.queues.len()
    }

    /// Processes `seed` and everything it transitively pushes, then returns the outputs
    /// of all workers concatenated in worker order.
    ///
    /// `work` is called once per item. It may push follow-up items through the
    /// [`Worker`] and append results to the worker's output buffer.
    ///
    /// Fails with [`RmiError::Spawn`] if a worker thread cannot be started (the workers
    /// already running are stopped first) and with [`RmiError::WorkerPanicked`] if `work`
    /// panics.
    ///
    /// # Examples
    /// ```
    /// use rmi::parallel::WorkStealingPool;
    ///
    /// // Count the leaves of a complete binary tree of depth 10.
    /// let mut pool = WorkStealingPool::new(4).unwrap();
    /// let leaves = pool
    ///     .run(0_u32, |worker, depth, out: &mut Vec<u32>| {
    ///         if depth == 10 {
    ///             out.push(depth);
    ///         } else {
    ///             worker.push(depth + 1);
    ///             worker.push(depth + 1);
    ///         }
    ///     })
    ///     .unwrap();
    /// assert_eq!(leaves.len(), 1024);
    /// ```
    pub fn run<O, F>(&mut self, seed: I, work: F) -> Result<Vec<O>>
    where
        O: Send,
        F: Fn(&Worker<'_, I>, I, &mut Vec<O>) + Sync,
    {
        self.reset();
        self.queues[0].push(seed);

        let pool = &*self;
        let work = &work;
        let mut outputs = thread::scope(|scope| -> Result<Vec<Vec<O>>> {
            let mut handles = Vec::with_capacity(pool.threads());
            let mut spawn_error = None;
            for index in 0..pool.threads() {
                let spawned = thread::Builder::new()
                    .name(format!("rmi-worker-{index}"))
                    .spawn_scoped(scope, move || pool.work_loop(index, work));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        pool.abort.store(true, Ordering::SeqCst);
                        warn!(
                            "failed to spawn worker {index} of {}, aborting: {err}",
                            pool.threads()
                        );
                        spawn_error = Some(err);
                        break;
                    }
                }
            }

            let mut outputs = Vec::with_capacity(handles.len());
            let mut panicked = false;
            for handle in handles {
                match handle.join() {
                    Ok(output) => outputs.push(output),
                    Err(_) => panicked = true,
                }
            }

            if let Some(err) = spawn_error {
                return Err(RmiError::Spawn(err));
            }
            if panicked {
                return Err(RmiError::WorkerPanicked);
            }
            Ok(outputs)
        })?;

        Ok(concatenate_vectors(&mut outputs))
    }

    fn reset(&mut self) {
        for queue in &self.queues {
            queue.clear();
        }
        *self.idle.get_mut() = 0;
        *self.abort.get_mut() = false;
    }

    fn work_loop<O, F>(&self, index: usize, work: &F) -> Vec<O>
    where
        F: Fn(&Worker<'_, I>, I, &mut Vec<O>),
    {
        let _guard = AbortOnPanic(&self.abort);
        let worker = Worker { pool: self, index };
        let mut stats = WorkerStats::default();
        let mut output = Vec::new();

        while let Some(item) = self.next_item(index, &mut stats) {
            work(&worker, item, &mut output);
            stats.processed += 1;
        }

        trace!(
            "worker {index} done: {} items, {} steals, {} outputs",
            stats.processed,
            stats.steals,
            output.len()
        );
        output
    }

    /// Pops a local item, or steals one. Returns `None` once every worker is idle or the
    /// pool was aborted.
    fn next_item(&self, index: usize, stats: &mut WorkerStats) -> Option<I> {
        if let Some(item) = self.queues[index].pop() {
            return Some(item);
        }

        let threads = self.threads();
        self.idle.fetch_add(1, Ordering::SeqCst);
        let mut attempts = 0_u32;
        loop {
            if self.abort.load(Ordering::SeqCst) || self.idle.load(Ordering::SeqCst) >= threads {
                return None;
            }

            for offset in 1..threads {
                let victim = (index + offset) % threads;
                if let Some(item) = self.queues[victim].steal() {
                    self.idle.fetch_sub(1, Ordering::SeqCst);
                    stats.steals += 1;
                    return Some(item);
                }
            }

            attempts += 1;
            if attempts < SPINS_BEFORE_YIELD {
                std::hint::spin_loop();
            } else {
                thread::yield_now();
            }
        }
    }
}
