use log::info;

use super::{ExecutionStrategy, Problem, Sequential};
use crate::{
  best::BestSolution, error::Result, evolution::Evolution,
  selection::AdjacentRankSelector,
};

/// One logical worker owning the whole population, everything on the
/// calling thread.
///
/// Parents of slot `i` are the tours ranked `i - 1` and `i`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Serial;

impl ExecutionStrategy for Serial {
  fn name(&self) -> &'static str {
    "serial"
  }

  fn execute(&self, problem: &Problem<'_>) -> Result<Vec<BestSolution>> {
    let config = problem.config();
    info!(
      "serial: {} points, population {}, {} generations",
      problem.num_points(),
      config.population_size,
      config.generations
    );

    let mut evolution = Evolution::new(
      problem,
      Sequential,
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

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{config::Config, geometry::Point};

  #[test]
  fn test_serial_runs_are_reproducible() {
    let points: Vec<_> = (0..9)
      .map(|i| Point::new(i, (i * 7 % 5) as f64, (i * 3 % 4) as f64))
      .collect();
    let config = Config::builder().population_size(20).generations(30).build();
    let problem = Problem::new(&points, &config).unwrap();

    let first = Serial.execute(&problem).unwrap();
    let second = Serial.execute(&problem).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert!(first[0].tour().unwrap().is_permutation_of(9));
  }

  #[test]
  fn test_zero_generations_scores_initial_population() {
    let points = [
      Point::new(1, 0.0, 0.0),
      Point::new(2, 3.0, 0.0),
      Point::new(3, 0.0, 4.0),
    ];
    let config = Config::builder().generations(0).build();
    let problem = Problem::new(&points, &config).unwrap();
    let best = Serial.execute(&problem).unwrap().remove(0);
    assert!((best.length() - 12.0).abs() < 1e-9);
  }
}
