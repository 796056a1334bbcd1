mod backfill;
mod greedy;
mod round_robin;

pub use backfill::backfill;
pub use greedy::Greedy;
pub use round_robin::RoundRobin;

use crate::core::{PlanConfig, Planner};

/// Constructors of every available planner.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static PLANNERS: [fn(&PlanConfig) -> Box<dyn Planner>];

#[cfg(test)]
pub(crate) mod test_util {
    use crate::core::{Planner, TaskUniverse};
    use rand::Rng;

    /// Checks exact cover, disjointness, batch count, width and determinism for a range of sizes.
    pub fn check(planner: &mut dyn Planner, width: usize) -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let sampled = (0..4).map(|_| rng.gen_range(30..80));

        for partitions in (1..=24).chain(sampled) {
            let universe = TaskUniverse::build(partitions)?;
            let schedule = planner.plan(&universe);

            if let Err(violation) = schedule.validate(&universe) {
                anyhow::bail!("{} with {partitions} partitions: {violation}", planner.name());
            }
            assert!(schedule.is_disjoint());
            assert_eq!(schedule.task_count(), universe.len());
            assert!(schedule.len() <= universe.len());
            assert!(schedule.max_width() <= partitions.min(width));
            assert_eq!(schedule, planner.plan(&universe), "{} is not deterministic", planner.name());
        }

        Ok(())
    }
}
