use super::{Partition, Task};
use thiserror::Error;

/// Error building a task universe.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum UniverseError {
    #[error("at least one partition is required, got {partitions}")]
    InvalidSize { partitions: usize },
}

/// A schedule breaks exact cover or disjointness.
/// Produced planners never trigger it; a violation means the planner is defective
/// or the schedule came from outside.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ScheduleIntegrityViolation {
    #[error("batch {batch} is empty")]
    EmptyBatch { batch: usize },
    #[error("batch {batch} uses partition {partition} in more than one task")]
    Overlap { batch: usize, partition: Partition },
    #[error("task {task} is scheduled more than once")]
    Duplicate { task: Task },
    #[error("task {task} in batch {batch} is not part of the universe")]
    Foreign { batch: usize, task: Task },
    #[error("task {task} is never scheduled")]
    Missing { task: Task },
}
