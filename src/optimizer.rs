//! Entry point of a run.

use std::time::Instant;

use log::info;
use typed_builder::TypedBuilder;

use crate::{
  aggregation::ResultAggregator,
  best::Solution,
  config::Config,
  error::{Error, Result},
  execution::{ExecutionStrategy, Problem},
  geometry::Point,
  tour::Tour,
};

/// Searches for a short closed tour through `points` with the given
/// execution strategy.
///
/// # Examples
/// ```
/// # use evotour::{Config, Optimizer, Point, Serial};
/// let points = vec![
///   Point::new(1, 0.0, 0.0),
///   Point::new(2, 0.0, 1.0),
///   Point::new(3, 1.0, 1.0),
///   Point::new(4, 1.0, 0.0),
/// ];
/// let optimizer = Optimizer::builder()
///   .points(points)
///   .config(Config::builder().population_size(20).mutation_rate(0.2).build())
///   .strategy(Serial)
///   .build();
/// let best = optimizer.optimize().unwrap();
/// assert!((best.length - 4.0).abs() < 1e-9);
/// ```
#[derive(TypedBuilder, Debug)]
pub struct Optimizer<E> {
  /// Points to visit, read-only for the whole run.
  points: Vec<Point>,
  /// Run parameters.
  #[builder(default)]
  config: Config,
  /// How the search is parallelized.
  strategy: E,
}

impl<E: ExecutionStrategy> Optimizer<E> {
  /// Points this optimizer visits.
  pub fn points(&self) -> &[Point] {
    &self.points
  }

  /// Run parameters.
  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Runs the search to completion and returns the shortest tour any worker
  /// found.
  ///
  /// Every parameter is checked before work starts. A run either returns one
  /// tour or fails; nothing is retried.
  pub fn optimize(&self) -> Result<Solution> {
    let problem = Problem::new(&self.points, &self.config)?;
    self.strategy.validate(&self.config)?;
    let name = self.strategy.name();
    let n = problem.num_points();

    // a single point has exactly one tour and nothing to recombine
    if n == 1 {
      info!("{name}: single point, nothing to optimize");
      return Ok(Solution::new(Tour::identity(1), 0.0));
    }

    let started = Instant::now();
    let aggregator: ResultAggregator =
      self.strategy.execute(&problem)?.into_iter().collect();
    let workers = aggregator.len();
    let best = aggregator
      .finish()
      .ok_or_else(|| Error::invalid_input("no worker produced a tour"))?;
    best.tour.check(n)?;
    info!(
      "{name}: best length {} out of {workers} results in {:.2?}",
      best.length,
      started.elapsed()
    );
    Ok(best)
  }
}
