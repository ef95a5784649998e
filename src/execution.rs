//! Execution strategies and the phase executors they drive.
//!
//! An [`ExecutionStrategy`] decides how the generational loop is spread over
//! workers and how their best tours are reconciled. Every strategy hands one
//! [`BestSolution`] per top-level worker back to the
//! [`Optimizer`](crate::optimizer::Optimizer), which reduces them into the
//! answer of the run.
//!
//! | Strategy           | Workers                 | Parents         | Best tour kept in          |
//! |:-------------------|:------------------------|:----------------|:---------------------------|
//! | [`Serial`]         | the calling thread      | adjacent ranks  | a local value              |
//! | [`DataParallel`]   | a `rayon` pool          | adjacent ranks  | the driving thread         |
//! | [`WorkerPool`]     | persistent threads      | random partner  | a [`SharedBest`]           |
//! | [`Distributed`]    | ranks sharing no memory | random ranks    | each rank, synced by argmin |
//!
//! [`SharedBest`]: crate::best::SharedBest

use std::ops::Range;

use rayon::prelude::*;

use crate::{
  best::BestSolution,
  config::Config,
  error::Result,
  geometry::{validate_points, Point},
  mutation::SwapMutation,
  recombination::OrderCrossover,
};

mod data_parallel;
mod distributed;
mod serial;
mod worker_pool;

pub use data_parallel::DataParallel;
pub use distributed::{Distributed, COORDINATOR};
pub use serial::Serial;
pub use worker_pool::WorkerPool;

/// A validated point list and configuration, plus the operators built from
/// them. Shared read-only by every worker of a run.
#[derive(Clone, Copy, Debug)]
pub struct Problem<'a> {
  points: &'a [Point],
  config: &'a Config,
  crossover: OrderCrossover,
  mutation: SwapMutation,
}

impl<'a> Problem<'a> {
  /// Checks `points` and `config` and builds the operators.
  pub fn new(points: &'a [Point], config: &'a Config) -> Result<Self> {
    validate_points(points)?;
    config.validate()?;
    Ok(Self {
      points,
      config,
      crossover: OrderCrossover,
      mutation: config.mutation()?,
    })
  }

  /// Points to visit.
  pub fn points(&self) -> &'a [Point] {
    self.points
  }

  /// Number of points, i.e. the length of every tour.
  pub fn num_points(&self) -> usize {
    self.points.len()
  }

  /// Run configuration.
  pub fn config(&self) -> &'a Config {
    self.config
  }

  /// Crossover operator.
  pub fn crossover(&self) -> &OrderCrossover {
    &self.crossover
  }

  /// Mutation operator.
  pub fn mutation(&self) -> &SwapMutation {
    &self.mutation
  }
}

/// How the generational loop is parallelized.
pub trait ExecutionStrategy {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  /// Checks strategy parameters against `config` before any work starts.
  fn validate(&self, _config: &Config) -> Result<()> {
    Ok(())
  }

  /// Runs the whole search and returns one best solution per top-level
  /// worker.
  fn execute(&self, problem: &Problem<'_>) -> Result<Vec<BestSolution>>;
}

/// Runs one phase of a generation: computes a value for every slot of
/// `slots`, then returns all of them in slot order. Returning is the barrier
/// between phases.
pub(crate) trait PhaseExecutor {
  fn for_each_slot<T, F>(&self, slots: Range<usize>, f: F) -> Vec<T>
  where
    T: Send,
    F: Fn(usize) -> T + Sync + Send;
}

/// Computes slots one after another on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Sequential;

impl PhaseExecutor for Sequential {
  fn for_each_slot<T, F>(&self, slots: Range<usize>, f: F) -> Vec<T>
  where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
  {
    slots.map(f).collect()
  }
}

/// Splits slots across the threads of a `rayon` pool. Every slot is written
/// by exactly one task.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Parallel<'p>(pub &'p rayon::ThreadPool);

impl PhaseExecutor for Parallel<'_> {
  fn for_each_slot<T, F>(&self, slots: Range<usize>, f: F) -> Vec<T>
  where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
  {
    self.0.install(|| slots.into_par_iter().map(f).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;

  #[test]
  fn test_problem_validation() {
    let points = [Point::new(1, 0.0, 0.0), Point::new(2, 1.0, 0.0)];
    let config = Config::default();
    let problem = Problem::new(&points, &config).unwrap();
    assert_eq!(problem.num_points(), 2);
    assert_eq!(problem.mutation().rate(), 0.01);

    assert!(matches!(
      Problem::new(&[], &config),
      Err(Error::InvalidInput(_))
    ));
    let bad = Config::builder().population_size(0).build();
    assert!(matches!(
      Problem::new(&points, &bad),
      Err(Error::InvalidConfig(_))
    ));
  }

  #[test]
  fn test_phase_executors_agree() {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(3)
      .build()
      .unwrap();
    let square = |i: usize| i * i;
    let sequential = Sequential.for_each_slot(0..100, square);
    let parallel = Parallel(&pool).for_each_slot(0..100, square);
    assert_eq!(sequential, parallel);
    assert_eq!(Sequential.for_each_slot(5..5, square), Vec::<usize>::new());
    assert_eq!(Parallel(&pool).for_each_slot(1..3, square), [1, 4]);
  }
}
