use super::UniverseError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Index of a data partition, in `0..N`.
pub type Partition = usize;

/// A unit of comparison work over one or two partitions.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// Comparison of two distinct partitions, lower index first.
    Cross(Partition, Partition),
    /// Self-comparison of a single partition.
    Diagonal(Partition),
}

impl Task {
    /// Creates a cross task between two partitions, ordering them by index.
    #[must_use]
    pub const fn cross(first: Partition, second: Partition) -> Self {
        if first <= second {
            Self::Cross(first, second)
        } else {
            Self::Cross(second, first)
        }
    }

    /// Returns the same task with cross partitions ordered by index.
    /// Tasks are identified by their partition set, so `Cross(3, 1)` and `Cross(1, 3)` are one task.
    #[must_use]
    pub const fn normalized(self) -> Self {
        match self {
            Self::Cross(first, second) => Self::cross(first, second),
            Self::Diagonal(_) => self,
        }
    }

    /// Returns whether the task is a self-comparison.
    #[must_use]
    pub const fn is_diagonal(&self) -> bool {
        matches!(self, Self::Diagonal(_))
    }

    /// Returns the partitions the task touches.
    pub fn partitions(self) -> impl Iterator<Item = Partition> {
        let (first, second) = match self {
            Self::Cross(first, second) => (first, Some(second)),
            Self::Diagonal(partition) => (partition, None),
        };
        std::iter::once(first).chain(second)
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cross(first, second) => write!(f, "cross({first}, {second})"),
            Self::Diagonal(partition) => write!(f, "diagonal({partition})"),
        }
    }
}

/// All the work required for `N` partitions: every unordered pair once and every partition with itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskUniverse {
    partitions: usize,
    cross: Vec<Task>,
    diagonal: Vec<Task>,
}

impl TaskUniverse {
    /// Enumerates the tasks for `partitions` partitions.
    /// Cross tasks are ordered by ascending first index, then ascending second index.
    /// Planners depend on this order to stay reproducible.
    ///
    /// # Errors
    /// - [`UniverseError::InvalidSize`] if `partitions` is zero.
    pub fn build(partitions: usize) -> Result<Self, UniverseError> {
        if partitions < 1 {
            return Err(UniverseError::InvalidSize { partitions });
        }

        let cross = (0..partitions)
            .flat_map(|first| (first + 1..partitions).map(move |second| Task::Cross(first, second)))
            .collect();
        let diagonal = (0..partitions).map(Task::Diagonal).collect();

        Ok(Self {
            partitions,
            cross,
            diagonal,
        })
    }

    /// Returns the number of partitions.
    #[must_use]
    pub const fn partitions(&self) -> usize {
        self.partitions
    }

    /// Returns the cross tasks in enumeration order.
    #[must_use]
    pub fn cross(&self) -> &[Task] {
        &self.cross
    }

    /// Returns the diagonal tasks in ascending partition order.
    #[must_use]
    pub fn diagonal(&self) -> &[Task] {
        &self.diagonal
    }

    /// Returns the total number of tasks, `N * (N + 1) / 2`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cross.len() + self.diagonal.len()
    }

    /// Always false, a universe has at least one partition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over cross tasks followed by diagonal tasks.
    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.cross.iter().chain(&self.diagonal).copied()
    }

    /// Returns whether the task is part of this universe.
    #[must_use]
    pub fn contains(&self, task: Task) -> bool {
        match task.normalized() {
            Task::Cross(first, second) => first != second && second < self.partitions,
            Task::Diagonal(partition) => partition < self.partitions,
        }
    }
}
