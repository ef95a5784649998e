//! Reduction of per-worker bests into the answer of a run.

use log::debug;

use crate::best::{BestSolution, Solution};

/// Collects one best solution per top-level worker, process or strategy
/// instance and, once everything is in, yields the shortest of them.
/// Ties go to whichever was collected first.
#[derive(Clone, Debug, Default)]
pub struct ResultAggregator {
  collected: Vec<Solution>,
}

impl ResultAggregator {
  /// An empty aggregator.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds the final best of one worker. Workers that never produced a tour
  /// are skipped.
  pub fn collect(&mut self, best: BestSolution) {
    if let Some(solution) = best.into_solution() {
      debug!(
        "collected result #{}: length {}",
        self.collected.len(),
        solution.length
      );
      self.collected.push(solution);
    }
  }

  /// Number of solutions collected so far.
  pub fn len(&self) -> usize {
    self.collected.len()
  }

  /// Returns `true` if nothing was collected.
  pub fn is_empty(&self) -> bool {
    self.collected.is_empty()
  }

  /// The shortest collected solution, the first one on ties.
  pub fn finish(self) -> Option<Solution> {
    self
      .collected
      .into_iter()
      .min_by(|a, b| a.length.total_cmp(&b.length))
  }
}

impl Extend<BestSolution> for ResultAggregator {
  fn extend<I: IntoIterator<Item = BestSolution>>(&mut self, iter: I) {
    iter.into_iter().for_each(|best| self.collect(best));
  }
}

impl FromIterator<BestSolution> for ResultAggregator {
  fn from_iter<I: IntoIterator<Item = BestSolution>>(iter: I) -> Self {
    let mut aggregator = Self::new();
    aggregator.extend(iter);
    aggregator
  }
}
