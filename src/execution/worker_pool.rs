use std::{
  collections::VecDeque,
  sync::{Mutex, PoisonError},
  thread,
};

use log::{debug, info, trace};
use rand::RngCore;

use super::{ExecutionStrategy, Problem};
use crate::{
  best::{BestSolution, SharedBest},
  config::Config,
  error::{Error, Result},
  geometry::tour_length,
  mutation::Mutation,
  random::{slot_rng, worker_rng},
  recombination::Recombination,
  tour::Tour,
};

/// Persistent worker threads draining a shared queue of starting tours.
///
/// The queue is filled with `population_size` random tours before any
/// worker starts. Each worker pops tours until the queue is empty and runs
/// a private improvement loop on every one of them: `generations` times,
/// cross the current tour with a fresh random tour, mutate the child and
/// keep it if it is shorter. Every candidate is offered to one
/// [`SharedBest`] as soon as it is evaluated.
///
/// Worker `i` draws from a random source seeded with `seed + i`; which worker
/// gets which task depends on scheduling, so runs are not reproducible
/// tour for tour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerPool {
  /// Number of worker threads.
  pub workers: usize,
}

impl WorkerPool {
  /// A pool of `workers` threads.
  pub fn new(workers: usize) -> Self {
    Self { workers }
  }
}

impl Default for WorkerPool {
  fn default() -> Self {
    Self::new(4)
  }
}

impl ExecutionStrategy for WorkerPool {
  fn name(&self) -> &'static str {
    "worker-pool"
  }

  fn validate(&self, _config: &Config) -> Result<()> {
    if self.workers == 0 {
      return Err(Error::invalid_config("worker count must be positive"));
    }
    Ok(())
  }

  fn execute(&self, problem: &Problem<'_>) -> Result<Vec<BestSolution>> {
    let config = problem.config();
    self.validate(config)?;
    info!(
      "worker-pool: {} points, {} tasks of {} steps on {} workers",
      problem.num_points(),
      config.population_size,
      config.generations,
      self.workers
    );

    let n = problem.num_points();
    let queue: Mutex<VecDeque<Tour>> = Mutex::new(
      (0..config.population_size)
        .map(|slot| Tour::random(n, &mut slot_rng(config.seed, 0, 0, slot)))
        .collect(),
    );
    let best = SharedBest::new();

    thread::scope(|s| {
      let handles: Vec<_> = (0..self.workers)
        .map(|worker| {
          let (queue, best) = (&queue, &best);
          s.spawn(move || run_worker(problem, worker, queue, best))
        })
        .collect();

      let mut outcome = Ok(());
      for (worker, handle) in handles.into_iter().enumerate() {
        let joined = handle
          .join()
          .unwrap_or(Err(Error::WorkerPanicked(worker)));
        if outcome.is_ok() {
          outcome = joined;
        }
      }
      outcome
    })?;

    Ok(vec![best.into_inner()])
  }
}

fn next_task(queue: &Mutex<VecDeque<Tour>>) -> Option<Tour> {
  queue
    .lock()
    .unwrap_or_else(PoisonError::into_inner)
    .pop_front()
}

fn run_worker(
  problem: &Problem<'_>,
  worker: usize,
  queue: &Mutex<VecDeque<Tour>>,
  best: &SharedBest,
) -> Result<()> {
  let mut rng = worker_rng(problem.config().seed, worker);
  let mut tasks = 0;
  while let Some(task) = next_task(queue) {
    improve(problem, worker, task, &mut rng, best)?;
    tasks += 1;
  }
  debug!("worker {worker} exiting after {tasks} tasks");
  Ok(())
}

/// Local improvement of one starting tour. Never reads the shared best.
fn improve(
  problem: &Problem<'_>,
  worker: usize,
  start: Tour,
  rng: &mut dyn RngCore,
  best: &SharedBest,
) -> Result<()> {
  let n = problem.num_points();
  let points = problem.points();
  let mut length = tour_length(&start, points);
  let mut current = start;
  best.offer(&current, length);

  for step in 0..problem.config().generations {
    let partner = Tour::random(n, rng);
    let mut child = problem.crossover().recombine(&current, &partner, rng);
    problem.mutation().mutate(&mut child, rng);
    child.check(n)?;

    let child_length = tour_length(&child, points);
    if best.offer(&child, child_length) {
      trace!(
        "worker {worker} step {step}: shared best improved to {child_length}"
      );
    }
    if child_length < length {
      current = child;
      length = child_length;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use log::{LevelFilter, Log, Metadata, Record};

  use super::*;
  use crate::geometry::Point;

  /// Keeps every formatted log message.
  struct Capture(Mutex<Vec<String>>);

  impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
      true
    }

    fn log(&self, record: &Record) {
      self.0.lock().unwrap().push(record.args().to_string());
    }

    fn flush(&self) {}
  }

  static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

  fn ring(n: i64) -> Vec<Point> {
    (0..n)
      .map(|i| {
        let angle = i as f64 * 2.399_963;
        Point::new(i, angle.cos() * (1.0 + i as f64), angle.sin() * 3.0)
      })
      .collect()
  }

  #[test]
  fn test_result_is_a_valid_tour() {
    let points = ring(10);
    let config = Config::builder().population_size(12).generations(40).build();
    let problem = Problem::new(&points, &config).unwrap();
    let mut bests = WorkerPool::new(3).execute(&problem).unwrap();
    assert_eq!(bests.len(), 1);
    let best = bests.remove(0).into_solution().unwrap();
    assert!(best.tour.is_permutation_of(10));
    assert!((tour_length(&best.tour, &points) - best.length).abs() < 1e-9);
  }

  #[test]
  fn test_never_worse_than_best_starting_tour() {
    let points = ring(8);
    let config = Config::builder().population_size(6).generations(0).build();
    let problem = Problem::new(&points, &config).unwrap();
    let initial = (0..6)
      .map(|slot| {
        let tour = Tour::random(8, &mut slot_rng(config.seed, 0, 0, slot));
        tour_length(&tour, &points)
      })
      .fold(f64::INFINITY, f64::min);

    let best = WorkerPool::new(2).execute(&problem).unwrap().remove(0);
    assert_eq!(best.length(), initial);

    let config = Config::builder().population_size(6).generations(50).build();
    let problem = Problem::new(&points, &config).unwrap();
    let best = WorkerPool::new(2).execute(&problem).unwrap().remove(0);
    assert!(best.length() <= initial);
  }

  #[test]
  fn test_more_workers_than_tasks() {
    let points = ring(5);
    let config = Config::builder().population_size(2).generations(10).build();
    let problem = Problem::new(&points, &config).unwrap();
    let best = WorkerPool::new(8).execute(&problem).unwrap().remove(0);
    assert!(best.tour().unwrap().is_permutation_of(5));
  }

  #[test]
  fn test_improvement_traces_name_the_worker() {
    if log::set_logger(&CAPTURE).is_ok() {
      log::set_max_level(LevelFilter::Trace);
    }
    let points = ring(12);
    let config = Config::builder().population_size(2).generations(200).build();
    let problem = Problem::new(&points, &config).unwrap();
    WorkerPool::new(2).execute(&problem).unwrap();

    let messages = CAPTURE.0.lock().unwrap();
    assert!(messages.iter().any(|m| {
      m.starts_with("worker ") && m.contains(" step ") && m.contains("improved")
    }));
  }

  #[test]
  fn test_rejects_zero_workers() {
    assert!(matches!(
      WorkerPool::new(0).validate(&Config::default()),
      Err(Error::InvalidConfig(_))
    ));
  }
}
