use super::backfill;
use crate::core::{Batch, Partition, PlanConfig, Planner, Schedule, Task, TaskUniverse};
use ahash::{HashSet, HashSetExt};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Single pass greedy planner.
///
/// Every batch is seeded with the first pending cross task, then one forward sweep over the
/// rest of the queue admits each task whose partitions are still free. A skipped task waits for
/// a later batch. After the sweep one diagonal task is backfilled if a partition is left free.
/// Diagonals that never fit are emitted as singleton batches at the end.
///
/// Work per batch is linear in the pending queue, `O(T^2)` overall for `T` cross tasks.
/// The batch count is not minimal; a round robin tournament needs fewer for even `N`.
#[derive(Clone, Debug, Default)]
pub struct Greedy {
    config: PlanConfig,
}

impl Greedy {
    /// Creates the planner with the given limits.
    #[must_use]
    pub const fn new(config: PlanConfig) -> Self {
        Self { config }
    }
}

impl Planner for Greedy {
    fn plan(&mut self, universe: &TaskUniverse) -> Schedule {
        schedule(universe, self.config.width())
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::PLANNERS)]
static INSTANCE: fn(&PlanConfig) -> Box<dyn Planner> = |config| Box::new(Greedy::new(*config));

fn schedule(universe: &TaskUniverse, width: usize) -> Schedule {
    let mut pending: Vec<(Partition, Partition)> = universe
        .cross()
        .iter()
        .filter_map(|task| match *task {
            Task::Cross(first, second) => Some((first, second)),
            Task::Diagonal(_) => None,
        })
        .collect();
    let mut diagonals: BTreeSet<Partition> = (0..universe.partitions()).collect();
    let mut batches = Vec::new();

    while !pending.is_empty() {
        let mut batch = Batch::new();
        let mut active = HashSet::with_capacity(universe.partitions());
        let mut deferred = Vec::with_capacity(pending.len());

        // The seed task always fits: the batch is empty and the width is at least one.
        for (first, second) in pending.drain(..) {
            if batch.len() < width && !active.contains(&first) && !active.contains(&second) {
                active.insert(first);
                active.insert(second);
                batch.push(Task::Cross(first, second));
            } else {
                deferred.push((first, second));
            }
        }
        pending = deferred;

        if batch.len() < width {
            if let Some(task) = backfill(&active, &mut diagonals) {
                active.extend(task.partitions());
                batch.push(task);
            }
        }

        debug!(
            batch = batches.len(),
            tasks = batch.len(),
            active = active.len(),
            "closed batch"
        );
        batches.push(batch);
    }

    batches.extend(
        diagonals
            .into_iter()
            .map(|partition| Batch::from(vec![Task::Diagonal(partition)])),
    );

    info!(
        partitions = universe.partitions(),
        batches = batches.len(),
        "planned greedy schedule"
    );
    Schedule::new(universe.partitions(), batches)
}
