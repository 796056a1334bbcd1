use super::{BatchOutcome, Executor, Perform, TaskResult};
use crate::core::Batch;

/// Runs every task inline on the calling thread, in batch order.
/// The barrier is trivial: all work is done when dispatch returns.
#[derive(Debug, Default)]
pub struct Sequential {
    outcome: BatchOutcome,
}

impl Executor for Sequential {
    fn run_batch_concurrently(&mut self, batch: &Batch, perform: &Perform) {
        self.outcome
            .results
            .extend(batch.iter().map(|task| TaskResult::capture(task, perform)));
    }

    fn await_batch_completion(&mut self) -> BatchOutcome {
        std::mem::take(&mut self.outcome)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::exec::test_util::check;

    #[test]
    fn test_sequential() -> anyhow::Result<()> {
        check(&mut Sequential::default())
    }
}
