use super::{Partition, ScheduleIntegrityViolation, Task, TaskUniverse};
use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Tasks that may run at the same time because no partition repeats among them.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Batch {
    tasks: Vec<Task>,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Appends a task. The caller keeps the batch disjoint.
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the batch has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterates over the tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Task> + '_ {
        self.tasks.iter().copied()
    }

    /// Iterates over every partition referenced by the batch, with repetitions.
    pub fn partitions(&self) -> impl Iterator<Item = Partition> + '_ {
        self.iter().flat_map(Task::partitions)
    }

    /// Returns whether every partition appears in at most one task.
    #[must_use]
    pub fn is_disjoint(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.len() * 2);
        self.partitions().all(|partition| seen.insert(partition))
    }
}

impl From<Vec<Task>> for Batch {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl Display for Batch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, task) in self.tasks.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{task}")?;
        }
        Ok(())
    }
}

/// Ordered batches covering a task universe.
/// Batches run one after another; tasks inside a batch run concurrently.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schedule {
    partitions: usize,
    batches: Vec<Batch>,
}

impl Schedule {
    /// Creates a schedule from batches planned for `partitions` partitions.
    #[must_use]
    pub const fn new(partitions: usize, batches: Vec<Batch>) -> Self {
        Self {
            partitions,
            batches,
        }
    }

    /// Returns the number of partitions the schedule was planned for.
    #[must_use]
    pub const fn partitions(&self) -> usize {
        self.partitions
    }

    /// Returns the batches in execution order.
    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Returns the number of batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns whether the schedule has no batches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Returns the number of tasks across all batches.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// Returns the size of the largest batch, the most workers the schedule can keep busy.
    #[must_use]
    pub fn max_width(&self) -> usize {
        self.batches.iter().map(Batch::len).max().unwrap_or_default()
    }

    /// Returns whether every batch is disjoint.
    #[must_use]
    pub fn is_disjoint(&self) -> bool {
        self.batches.iter().all(Batch::is_disjoint)
    }

    /// Checks that the schedule covers `universe` exactly once and that every batch is disjoint.
    ///
    /// # Errors
    /// - The first violation found, scanning batches in order, then missing tasks in enumeration order.
    pub fn validate(&self, universe: &TaskUniverse) -> Result<(), ScheduleIntegrityViolation> {
        let mut scheduled = HashSet::with_capacity(universe.len());

        for (batch, tasks) in self.batches.iter().enumerate() {
            if tasks.is_empty() {
                return Err(ScheduleIntegrityViolation::EmptyBatch { batch });
            }

            let mut active = HashSet::with_capacity(tasks.len() * 2);
            for task in tasks.iter().map(Task::normalized) {
                if !universe.contains(task) {
                    return Err(ScheduleIntegrityViolation::Foreign { batch, task });
                }
                if let Some(partition) = task.partitions().find(|&p| !active.insert(p)) {
                    return Err(ScheduleIntegrityViolation::Overlap { batch, partition });
                }
                if !scheduled.insert(task) {
                    return Err(ScheduleIntegrityViolation::Duplicate { task });
                }
            }
        }

        match universe.tasks().find(|task| !scheduled.contains(task)) {
            Some(task) => Err(ScheduleIntegrityViolation::Missing { task }),
            None => Ok(()),
        }
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, batch) in self.batches.iter().enumerate() {
            writeln!(f, "batch {i}: {batch}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn schedule(batches: Vec<Vec<Task>>) -> Schedule {
        Schedule::new(2, batches.into_iter().map(Batch::from).collect())
    }

    fn valid() -> Vec<Vec<Task>> {
        vec![
            vec![Task::Cross(0, 1)],
            vec![Task::Diagonal(0)],
            vec![Task::Diagonal(1)],
        ]
    }

    #[test]
    fn validate_accepts_exact_cover() -> anyhow::Result<()> {
        let universe = TaskUniverse::build(2)?;
        assert_eq!(schedule(valid()).validate(&universe), Ok(()));
        Ok(())
    }

    #[test]
    fn validate_accepts_reversed_cross() -> anyhow::Result<()> {
        let universe = TaskUniverse::build(2)?;
        let mut batches = valid();
        batches[0][0] = Task::Cross(1, 0);
        assert_eq!(schedule(batches).validate(&universe), Ok(()));
        Ok(())
    }

    #[test]
    fn validate_detects_empty_batch() -> anyhow::Result<()> {
        let universe = TaskUniverse::build(2)?;
        let mut batches = valid();
        batches.insert(1, Vec::new());
        assert_eq!(
            schedule(batches).validate(&universe),
            Err(ScheduleIntegrityViolation::EmptyBatch { batch: 1 })
        );
        Ok(())
    }

    #[test]
    fn validate_detects_overlap() -> anyhow::Result<()> {
        let universe = TaskUniverse::build(2)?;
        let batches = vec![
            vec![Task::Cross(0, 1), Task::Diagonal(1)],
            vec![Task::Diagonal(0)],
        ];
        assert_eq!(
            schedule(batches).validate(&universe),
            Err(ScheduleIntegrityViolation::Overlap {
                batch: 0,
                partition: 1
            })
        );
        Ok(())
    }

    #[test]
    fn validate_detects_duplicate() -> anyhow::Result<()> {
        let universe = TaskUniverse::build(2)?;
        let mut batches = valid();
        batches.push(vec![Task::Cross(1, 0)]);
        assert_eq!(
            schedule(batches).validate(&universe),
            Err(ScheduleIntegrityViolation::Duplicate {
                task: Task::Cross(0, 1)
            })
        );
        Ok(())
    }

    #[test]
    fn validate_detects_foreign() -> anyhow::Result<()> {
        let universe = TaskUniverse::build(2)?;
        let mut batches = valid();
        batches[1].push(Task::Diagonal(2));
        assert_eq!(
            schedule(batches).validate(&universe),
            Err(ScheduleIntegrityViolation::Foreign {
                batch: 1,
                task: Task::Diagonal(2)
            })
        );

        let batches = vec![vec![Task::Cross(1, 1)]];
        assert!(matches!(
            schedule(batches).validate(&universe),
            Err(ScheduleIntegrityViolation::Foreign { .. })
        ));
        Ok(())
    }

    #[test]
    fn validate_detects_missing() -> anyhow::Result<()> {
        let universe = TaskUniverse::build(2)?;
        let mut batches = valid();
        batches.pop();
        assert_eq!(
            schedule(batches).validate(&universe),
            Err(ScheduleIntegrityViolation::Missing {
                task: Task::Diagonal(1)
            })
        );
        Ok(())
    }

    #[test]
    fn batch_disjointness() {
        let batch = Batch::from(vec![Task::Cross(0, 1), Task::Cross(2, 3), Task::Diagonal(4)]);
        assert!(batch.is_disjoint());
        let batch = Batch::from(vec![Task::Cross(0, 1), Task::Diagonal(0)]);
        assert!(!batch.is_disjoint());
    }

    #[test]
    fn schedule_statistics_and_display() {
        let schedule = schedule(vec![
            vec![Task::Cross(0, 1), Task::Cross(2, 3)],
            vec![Task::Diagonal(0)],
        ]);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.task_count(), 3);
        assert_eq!(schedule.max_width(), 2);
        assert_eq!(
            schedule.to_string(),
            "batch 0: cross(0, 1) cross(2, 3)\nbatch 1: diagonal(0)\n"
        );
    }

    #[test]
    fn schedule_serialization() -> anyhow::Result<()> {
        let schedule = schedule(valid());
        let serialized = crate::data::to_string(&schedule)?;
        let mut reader = std::io::Cursor::new(serialized);
        let deserialized: Schedule = crate::data::deserialize(&mut reader)?;
        assert_eq!(schedule, deserialized);
        Ok(())
    }
}
