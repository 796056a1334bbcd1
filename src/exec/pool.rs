use super::{BatchOutcome, ExecError, Executor, Perform, TaskResult};
use crate::core::Batch;
use std::num::NonZero;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, error};

/// Runs the tasks of a batch on a fixed size `rayon` pool.
/// Every finished task reports back over a channel; the barrier waits for as many reports as
/// tasks were dispatched.
pub struct ThreadPool {
    pool: rayon::ThreadPool,
    sender: Sender<TaskResult>,
    receiver: Receiver<TaskResult>,
    dispatched: usize,
}

impl ThreadPool {
    /// Creates a pool with `workers` threads.
    ///
    /// # Errors
    /// - If the threads cannot be spawned.
    pub fn new(workers: NonZero<usize>) -> Result<Self, ExecError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|index| format!("pairplan-worker-{index}"))
            .build()?;
        let (sender, receiver) = channel();
        debug!(workers = workers.get(), "worker pool started");

        Ok(Self {
            pool,
            sender,
            receiver,
            dispatched: 0,
        })
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("workers", &self.workers())
            .field("dispatched", &self.dispatched)
            .finish_non_exhaustive()
    }
}

impl Executor for ThreadPool {
    fn run_batch_concurrently(&mut self, batch: &Batch, perform: &Perform) {
        for task in batch.iter() {
            let perform = Arc::clone(perform);
            let sender = self.sender.clone();
            self.pool.spawn(move || {
                // The receiver lives as long as the executor, which outlives its batches.
                let _ = sender.send(TaskResult::capture(task, &perform));
            });
            self.dispatched += 1;
        }
    }

    fn await_batch_completion(&mut self) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        while outcome.results.len() < self.dispatched {
            match self.receiver.recv() {
                Ok(result) => outcome.results.push(result),
                Err(_) => {
                    error!("worker pool disconnected before the batch drained");
                    break;
                }
            }
        }

        self.dispatched = 0;
        outcome
    }
}
