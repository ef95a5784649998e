//! The generational loop shared by the serial, data-parallel and distributed
//! strategies.

use log::trace;

use crate::{
  best::{BestSolution, Solution},
  error::Result,
  execution::{PhaseExecutor, Problem},
  geometry::tour_length,
  mutation::Mutation,
  population::{Population, Ranking},
  random::slot_rng,
  recombination::Recombination,
  selection::ParentSelection,
  tour::Tour,
};

/// One scope's population and best tour, evolved one generation at a time.
///
/// Each generation runs three phases through the executor: fitness
/// evaluation, then (on the driving thread) ranking and the best-tour
/// update, then offspring creation. Slot `i` of generation `g` draws its
/// random numbers from its own source derived from `(seed, stream, g, i)`,
/// so the outcome does not depend on how the executor schedules slots.
pub(crate) struct Evolution<'p, X, S> {
  problem: &'p Problem<'p>,
  executor: X,
  selector: S,
  stream: usize,
  population: Population,
  best: BestSolution,
}

impl<'p, X, S> Evolution<'p, X, S>
where
  X: PhaseExecutor,
  S: ParentSelection + Sync,
{
  /// Fills `size` slots with random tours.
  pub fn new(
    problem: &'p Problem<'p>,
    executor: X,
    selector: S,
    stream: usize,
    size: usize,
  ) -> Self {
    let n = problem.num_points();
    let seed = problem.config().seed;
    let tours = executor.for_each_slot(0..size, |slot| {
      Tour::random(n, &mut slot_rng(seed, stream, 0, slot))
    });
    Self {
      problem,
      executor,
      selector,
      stream,
      population: Population::new(tours),
      best: BestSolution::new(),
    }
  }

  /// Best tour this scope has seen so far.
  pub fn best(&self) -> &BestSolution {
    &self.best
  }

  /// Current population.
  pub fn population(&self) -> &Population {
    &self.population
  }

  /// Evaluates and ranks the current population, records its best member
  /// and replaces the population with the next generation.
  pub fn step(&mut self, generation: usize) -> Result<()> {
    let ranking = self.evaluate();
    let (elite, length) = ranking.best();
    let tours = self.population.tours();
    if self.best.offer(&tours[elite], length) {
      trace!(
        "stream {} generation {generation}: best length {length}",
        self.stream
      );
    }

    let n = self.problem.num_points();
    let seed = self.problem.config().seed;
    let (stream, selector) = (self.stream, &self.selector);
    let crossover = self.problem.crossover();
    let mutation = self.problem.mutation();
    let offspring = self.executor.for_each_slot(1..tours.len(), |slot| {
      let mut rng = slot_rng(seed, stream, generation + 1, slot);
      let (first, second) = selector.parents(&ranking, slot, &mut rng);
      let mut child =
        crossover.recombine(&tours[first], &tours[second], &mut rng);
      mutation.mutate(&mut child, &mut rng);
      child.check(n).map(|()| child)
    });

    let mut next = Vec::with_capacity(tours.len());
    next.push(tours[elite].clone());
    for child in offspring {
      next.push(child?);
    }
    self.population = Population::new(next);
    Ok(())
  }

  /// Takes a better tour found elsewhere. If it improves on this scope's
  /// best it also replaces the last slot of the population, so it takes
  /// part in the next generation.
  pub fn adopt(&mut self, solution: Solution) -> bool {
    let improved = self.best.offer(&solution.tour, solution.length);
    if improved {
      self.population.replace_last(solution.tour);
    }
    improved
  }

  /// Evaluates the last generation and returns the best tour ever seen.
  pub fn finish(mut self) -> BestSolution {
    let ranking = self.evaluate();
    let (elite, length) = ranking.best();
    self.best.offer(&self.population.tours()[elite], length);
    self.best
  }

  fn evaluate(&self) -> Ranking {
    let points = self.problem.points();
    let tours = self.population.tours();
    Ranking::new(
      self
        .executor
        .for_each_slot(0..tours.len(), |slot| tour_length(&tours[slot], points)),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    config::Config,
    execution::{Parallel, Sequential},
    geometry::Point,
    selection::{AdjacentRankSelector, RandomRankSelector},
  };

  fn circle(n: usize) -> Vec<Point> {
    (0..n)
      .map(|i| {
        let angle = i as f64 * std::f64::consts::TAU / n as f64;
        Point::new(i as i64, angle.cos() * 10.0, angle.sin() * 10.0)
      })
      .collect()
  }

  #[test]
  fn test_population_size_and_permutations_hold() {
    let points = circle(12);
    let config = Config::builder().mutation_rate(0.3).build();
    let problem = Problem::new(&points, &config).unwrap();
    let mut evolution =
      Evolution::new(&problem, Sequential, RandomRankSelector, 0, 17);
    for generation in 0..30 {
      evolution.step(generation).unwrap();
      let population = evolution.population();
      assert_eq!(population.len(), 17);
      assert!(population.tours().iter().all(|t| t.is_permutation_of(12)));
    }
  }

  #[test]
  fn test_best_is_non_increasing() {
    let points = circle(15);
    let config = Config::builder().mutation_rate(0.05).build();
    let problem = Problem::new(&points, &config).unwrap();
    let mut evolution =
      Evolution::new(&problem, Sequential, AdjacentRankSelector, 0, 20);
    let mut previous = f64::INFINITY;
    for generation in 0..60 {
      evolution.step(generation).unwrap();
      let current = evolution.best().length();
      assert!(current <= previous);
      previous = current;
    }
    assert!(evolution.finish().length() <= previous);
  }

  #[test]
  fn test_elite_is_carried_into_slot_zero() {
    let points = circle(8);
    let config = Config::default();
    let problem = Problem::new(&points, &config).unwrap();
    let mut evolution =
      Evolution::new(&problem, Sequential, AdjacentRankSelector, 3, 10);
    evolution.step(0).unwrap();
    let elite = evolution.best().tour().cloned().unwrap();
    assert_eq!(evolution.population().tours()[0], elite);
  }

  #[test]
  fn test_executors_produce_identical_runs() {
    let points = circle(20);
    let config = Config::builder().mutation_rate(0.1).seed(5).build();
    let problem = Problem::new(&points, &config).unwrap();
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(4)
      .build()
      .unwrap();

    let mut sequential =
      Evolution::new(&problem, Sequential, AdjacentRankSelector, 0, 30);
    let mut parallel =
      Evolution::new(&problem, Parallel(&pool), AdjacentRankSelector, 0, 30);
    for generation in 0..25 {
      sequential.step(generation).unwrap();
      parallel.step(generation).unwrap();
      assert_eq!(sequential.population(), parallel.population());
    }
    assert_eq!(sequential.finish(), parallel.finish());
  }

  #[test]
  fn test_adopt_only_takes_improvements() {
    let points = circle(6);
    let config = Config::default();
    let problem = Problem::new(&points, &config).unwrap();
    let mut evolution =
      Evolution::new(&problem, Sequential, RandomRankSelector, 0, 4);
    evolution.step(0).unwrap();

    let worse = Solution::new(Tour::identity(6), f64::MAX);
    assert!(!evolution.adopt(worse));

    let optimal = Tour::identity(6);
    let length = tour_length(&optimal, &points);
    if evolution.best().length() > length {
      assert!(evolution.adopt(Solution::new(optimal.clone(), length)));
      assert_eq!(evolution.population().tours()[3], optimal);
    }
    assert!(evolution.best().length() <= length);
  }

  #[test]
  fn test_single_slot_partition_keeps_elite_only() {
    let points = circle(5);
    let config = Config::default();
    let problem = Problem::new(&points, &config).unwrap();
    let mut evolution =
      Evolution::new(&problem, Sequential, RandomRankSelector, 1, 1);
    let initial = evolution.population().clone();
    evolution.step(0).unwrap();
    assert_eq!(evolution.population(), &initial);
  }
}
