use std::{num::NonZeroUsize, thread};

use log::info;
use rayon::ThreadPoolBuilder;

use super::{ExecutionStrategy, Parallel, Problem};
use crate::{
  best::BestSolution,
  config::Config,
  error::{Error, Result},
  evolution::Evolution,
  selection::AdjacentRankSelector,
};

/// The serial generational loop with its three per-generation phases
/// (initialization, fitness evaluation, offspring creation) split across a
/// dedicated `rayon` pool.
///
/// Each slot is computed by exactly one task and draws from its own random
/// source, so the outcome equals [`Serial`](super::Serial)'s for the same
/// seed whatever the thread count. The best tour is only touched by the
/// driving thread between phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataParallel {
  /// Size of the thread pool.
  pub threads: usize,
}

impl DataParallel {
  /// A strategy running on `threads` threads.
  pub fn new(threads: usize) -> Self {
    Self { threads }
  }
}

impl Default for DataParallel {
  /// One thread per available core.
  fn default() -> Self {
    Self::new(thread::available_parallelism().map_or(1, NonZeroUsize::get))
  }
}

impl ExecutionStrategy for DataParallel {
  fn name(&self) -> &'static str {
    "data-parallel"
  }

  fn validate(&self, _config: &Config) -> Result<()> {
    if self.threads == 0 {
      return Err(Error::invalid_config("thread count must be positive"));
    }
    Ok(())
  }

  fn execute(&self, problem: &Problem<'_>) -> Result<Vec<BestSolution>> {
    let config = problem.config();
    self.validate(config)?;
    info!(
      "data-parallel: {} points, population {}, {} generations on {} threads",
      problem.num_points(),
      config.population_size,
      config.generations,
      self.threads
    );

    let pool = ThreadPoolBuilder::new()
      .num_threads(self.threads)
      .thread_name(|i| format!("evotour-{i}"))
      .build()?;
    let mut evolution = Evolution::new(
      problem,
      Parallel(&pool),
      AdjacentRankSelector,
      0,
      config.population_size,
    );
    for generation in 0..config.generations {
      evolution.step(generation)?;
    }
    Ok(vec![evolution.finish()])
  }
}
