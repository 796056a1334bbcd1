use crate::core::{Planner, TaskUniverse};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::ops::RangeInclusive;

/// Report of planning a range of partition counts with one planner.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    planner: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(planner: String) -> Self {
        let entries = Vec::new();
        Self { planner, entries }
    }

    /// Get the planner name.
    #[must_use]
    pub fn planner_name(&self) -> &str {
        &self.planner
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Planner: {}", self.planner)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of planning a single partition count.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub partitions: usize,
    pub tasks: usize,
    pub batches: usize,
    pub max_width: usize,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{}: {} tasks in {} batches, widest {} in {:.4} sec",
            self.partitions, self.tasks, self.batches, self.max_width, self.time
        )
    }
}

/// Plan every partition count in `partitions` and collect the schedule sizes.
///
/// # Errors
/// - If the range contains zero.
///
/// # Panics
/// - If a produced schedule breaks exact cover or disjointness.
pub fn run(partitions: RangeInclusive<usize>, planner: &mut dyn Planner) -> anyhow::Result<Report> {
    let mut report = Report::new(planner.name().into());

    for count in partitions {
        let universe = TaskUniverse::build(count)?;

        let time = std::time::Instant::now();
        let schedule = planner.plan(&universe);
        let time = time.elapsed().as_secs_f64();

        if let Err(violation) = schedule.validate(&universe) {
            panic!("Invalid schedule created for {count} partitions: {violation}");
        }

        report.entries.push(ReportEntry {
            partitions: count,
            tasks: universe.len(),
            batches: schedule.len(),
            max_width: schedule.max_width(),
            time,
        });
    }

    Ok(report)
}
