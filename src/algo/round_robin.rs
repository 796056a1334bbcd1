use super::backfill;
use crate::core::{Batch, Partition, PlanConfig, Planner, Schedule, Task, TaskUniverse};
use ahash::{HashSet, HashSetExt};
use std::collections::BTreeSet;
use tracing::info;

/// Round robin tournament planner based on the circle method.
///
/// For even `N` it needs `N - 1` rounds of `N / 2` pairs, the fewest batches any
/// cover of the cross tasks can have. For odd `N` a phantom partition is added and the partition
/// paired with it in a round gets its diagonal task there instead.
/// Remaining diagonals share batches, since they never overlap.
#[derive(Clone, Debug, Default)]
pub struct RoundRobin {
    config: PlanConfig,
}

impl RoundRobin {
    /// Creates the planner with the given limits.
    #[must_use]
    pub const fn new(config: PlanConfig) -> Self {
        Self { config }
    }
}

impl Planner for RoundRobin {
    fn plan(&mut self, universe: &TaskUniverse) -> Schedule {
        schedule(universe, self.config.width())
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::PLANNERS)]
static INSTANCE: fn(&PlanConfig) -> Box<dyn Planner> = |config| Box::new(RoundRobin::new(*config));

/// Returns the pairs of one round. Pairs with `phantom` are dropped.
fn round(players: usize, round: usize, phantom: Partition) -> Vec<(Partition, Partition)> {
    let rotating = players - 1;
    let mut pairs = vec![(round, players - 1)];
    for offset in 1..players / 2 {
        let first = (round + offset) % rotating;
        let second = (round + rotating - offset) % rotating;
        pairs.push((first.min(second), first.max(second)));
    }
    pairs.retain(|&(first, second)| first != phantom && second != phantom);
    pairs.sort_unstable();
    pairs
}

fn schedule(universe: &TaskUniverse, width: usize) -> Schedule {
    let partitions = universe.partitions();
    let mut diagonals: BTreeSet<Partition> = (0..partitions).collect();
    let mut batches = Vec::new();

    if partitions > 1 {
        let players = partitions + partitions % 2;
        for number in 0..players - 1 {
            for chunk in round(players, number, partitions).chunks(width) {
                let mut batch = Batch::new();
                let mut active = HashSet::with_capacity(partitions);
                for &(first, second) in chunk {
                    active.insert(first);
                    active.insert(second);
                    batch.push(Task::Cross(first, second));
                }
                if batch.len() < width {
                    if let Some(task) = backfill(&active, &mut diagonals) {
                        batch.push(task);
                    }
                }
                batches.push(batch);
            }
        }
    }

    let remaining: Vec<Task> = diagonals.into_iter().map(Task::Diagonal).collect();
    batches.extend(remaining.chunks(width).map(|chunk| Batch::from(chunk.to_vec())));

    info!(partitions, batches = batches.len(), "planned round robin schedule");
    Schedule::new(partitions, batches)
}
