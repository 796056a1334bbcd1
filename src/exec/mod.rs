//! Runtimes that execute a schedule.
//!
//! An executor receives one batch at a time. It may run the tasks of a batch in any order or all
//! at once, but must finish every one of them before the next batch is handed over. Disjoint
//! batches plus this barrier mean no two running tasks ever share a partition, so partitions need
//! no locking.

mod pool;
mod sequential;

pub use pool::ThreadPool;
pub use sequential::Sequential;

use crate::core::{Batch, Schedule, Task};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The comparison work for a single task, supplied by the caller.
pub type Perform = Arc<dyn Fn(Task) -> anyhow::Result<()> + Send + Sync>;

/// Error setting up an executor.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A runtime able to process the batches of a schedule.
pub trait Executor {
    /// Starts `perform` for every task of `batch`, in any order and possibly in parallel.
    fn run_batch_concurrently(&mut self, batch: &Batch, perform: &Perform);

    /// Blocks until every task started by the last call to
    /// [`run_batch_concurrently`](Executor::run_batch_concurrently) has finished.
    fn await_batch_completion(&mut self) -> BatchOutcome;
}

/// Result of a single task, as recorded by an executor.
#[derive(Debug)]
pub struct TaskResult {
    pub task: Task,
    pub result: Result<(), String>,
}

impl TaskResult {
    /// Runs `perform` for `task`, turning errors and panics into a failed result.
    #[must_use]
    pub fn capture(task: Task, perform: &Perform) -> Self {
        let result = match catch_unwind(AssertUnwindSafe(|| perform(task))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(format!("{error:#}")),
            Err(panic) => Err(panic_message(panic.as_ref())),
        };
        Self { task, result }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked".to_owned())
}

/// Results of every task of one batch, in completion order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<TaskResult>,
}

/// A task that failed during execution.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskFailure {
    pub batch: usize,
    pub task: Task,
    pub message: String,
}

/// Summary of executing a whole schedule.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionReport {
    pub batches: usize,
    pub completed: usize,
    pub failures: Vec<TaskFailure>,
}

impl ExecutionReport {
    /// Returns whether every task succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl std::fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} batches, {} tasks completed, {} failed",
            self.batches,
            self.completed,
            self.failures.len()
        )?;
        for failure in &self.failures {
            writeln!(f, "batch {}: {}: {}", failure.batch, failure.task, failure.message)?;
        }
        Ok(())
    }
}

/// Executes the batches of `schedule` strictly in order, waiting for each one to drain.
/// Failed tasks are recorded and do not stop the run.
pub fn execute(schedule: &Schedule, executor: &mut dyn Executor, perform: &Perform) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for (index, batch) in schedule.batches().iter().enumerate() {
        debug_assert!(batch.is_disjoint(), "Batch {index} is not disjoint: {batch}");

        executor.run_batch_concurrently(batch, perform);
        let outcome = executor.await_batch_completion();
        debug!(batch = index, tasks = outcome.results.len(), "batch completed");

        for TaskResult { task, result } in outcome.results {
            match result {
                Ok(()) => report.completed += 1,
                Err(message) => {
                    warn!(batch = index, %task, %message, "task failed");
                    report.failures.push(TaskFailure {
                        batch: index,
                        task,
                        message,
                    });
                }
            }
        }
        report.batches += 1;
    }

    info!(
        batches = report.batches,
        completed = report.completed,
        failed = report.failures.len(),
        "schedule executed"
    );
    report
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::{execute, Executor, Perform};
    use crate::algo::Greedy;
    use crate::core::{Planner, Task, TaskUniverse};
    use ahash::HashMap;
    use rand::Rng;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Executes a greedy schedule with a perform that fails when a partition is used by two
    /// tasks at once, or when a task starts before every task of the earlier batches finished.
    pub fn check(executor: &mut dyn Executor) -> anyhow::Result<()> {
        const PARTITIONS: usize = 9;

        let universe = TaskUniverse::build(PARTITIONS)?;
        let schedule = Greedy::default().plan(&universe);

        // Number of tasks in all batches before the one holding the task.
        let mut preceding = HashMap::default();
        let mut total = 0;
        for batch in schedule.batches() {
            for task in batch.iter() {
                preceding.insert(task, total);
            }
            total += batch.len();
        }

        let busy: Arc<Vec<AtomicBool>> =
            Arc::new((0..PARTITIONS).map(|_| AtomicBool::new(false)).collect());
        let finished = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(Mutex::new(Vec::new()));

        let perform: Perform = {
            let done = Arc::clone(&done);
            Arc::new(move |task: Task| -> anyhow::Result<()> {
                let required = preceding.get(&task).copied().unwrap_or_default();
                if finished.load(Ordering::SeqCst) < required {
                    anyhow::bail!("{task} started before the previous batch drained");
                }

                for partition in task.partitions() {
                    if busy[partition].swap(true, Ordering::SeqCst) {
                        anyhow::bail!("partition {partition} in use");
                    }
                }
                let jitter = rand::thread_rng().gen_range(0..3);
                std::thread::sleep(Duration::from_millis(jitter));
                for partition in task.partitions() {
                    busy[partition].store(false, Ordering::SeqCst);
                }

                done.lock().map_err(|_| anyhow::anyhow!("poisoned"))?.push(task);
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };

        let report = execute(&schedule, executor, &perform);
        assert!(report.is_success(), "{report}");
        assert_eq!(report.batches, schedule.len());
        assert_eq!(report.completed, universe.len());

        let mut done = done.lock().map_err(|_| anyhow::anyhow!("poisoned"))?.clone();
        done.sort_unstable();
        let mut expected: Vec<Task> = universe.tasks().collect();
        expected.sort_unstable();
        assert_eq!(done, expected);
        Ok(())
    }
}
