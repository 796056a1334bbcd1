mod error;
mod schedule;
mod universe;

pub use error::*;
pub use schedule::*;
pub use universe::*;

use serde::{Deserialize, Serialize};
use std::num::NonZero;

/// Turns a task universe into a schedule.
pub trait Planner {
    /// Plans every task of the universe into disjoint batches.
    fn plan(&mut self, universe: &TaskUniverse) -> Schedule;

    /// Returns the name of the planner.
    fn name(&self) -> &'static str;
}

/// Limits applied by planners.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Largest number of tasks in one batch, usually the worker pool size. Unbounded if absent.
    pub max_width: Option<NonZero<usize>>,
}

impl PlanConfig {
    /// Creates a configuration with a batch width limit.
    #[must_use]
    pub const fn with_max_width(max_width: Option<NonZero<usize>>) -> Self {
        Self { max_width }
    }

    /// Returns the width limit as a plain number.
    #[must_use]
    pub fn width(&self) -> usize {
        self.max_width.map_or(usize::MAX, NonZero::get)
    }
}
