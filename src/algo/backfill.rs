use crate::core::{Partition, Task};
use ahash::HashSet;
use std::collections::BTreeSet;

/// Picks at most one diagonal task that fits next to the `active` partitions of a batch.
/// Scans `pending` in ascending order and removes the first partition that is not active.
/// Returns `None` when every pending diagonal conflicts with the batch or none are left.
pub fn backfill(active: &HashSet<Partition>, pending: &mut BTreeSet<Partition>) -> Option<Task> {
    let partition = pending.iter().copied().find(|p| !active.contains(p))?;
    pending.remove(&partition);
    Some(Task::Diagonal(partition))
}
