#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

//! Plans an all-pairs-plus-self comparison workload over `N` partitions into batches whose tasks
//! never share a partition, and runs such plans on a worker pool one batch at a time.

pub mod algo;
pub mod core;
pub mod data;
pub mod exec;

use crate::core::{Planner, Schedule, TaskUniverse, UniverseError};

/// Builds the task universe for `partitions` partitions and plans it with `planner`.
///
/// # Errors
/// - [`UniverseError::InvalidSize`] if `partitions` is zero.
///
/// # Panics
/// - If the schedule breaks exact cover or disjointness in debug mode.
pub fn plan(partitions: usize, planner: &mut dyn Planner) -> Result<Schedule, UniverseError> {
    let universe = TaskUniverse::build(partitions)?;
    let schedule = planner.plan(&universe);

    debug_assert!(
        schedule.validate(&universe).is_ok(),
        "Schedule is invalid: {schedule:?}"
    );

    Ok(schedule)
}
