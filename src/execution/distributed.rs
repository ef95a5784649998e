use std::thread;

use log::{debug, info};

use super::{ExecutionStrategy, Problem, Sequential};
use crate::{
  best::{BestSolution, Solution},
  collective::{Communicator, LocalCluster},
  config::Config,
  error::{Error, Result},
  evolution::Evolution,
  geometry::Point,
  selection::RandomRankSelector,
};

/// Rank that owns the point list and gathers the final results.
pub const COORDINATOR: usize = 0;

/// Independent ranks that share nothing but message channels, kept in step
/// by periodic global synchronizations.
///
/// The coordinator distributes the point list before generation 0. Every
/// rank then evolves its own slice of the population with uniformly random
/// parent selection. After generation `g` with `g % sync_interval == 0` all
/// ranks reduce their local best lengths to the global minimum and the rank
/// that holds it (the lowest one on ties) broadcasts its tour; ranks that
/// were behind adopt it. At the end the coordinator gathers every rank's
/// best.
///
/// Ranks run on their own threads connected by a [`LocalCluster`]. Rank `r`
/// uses random stream `r`, so runs are reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Distributed {
  /// Number of ranks.
  pub processes: usize,
  /// Generations between global synchronizations.
  pub sync_interval: usize,
}

impl Distributed {
  /// `processes` ranks synchronizing every 10 generations.
  pub fn new(processes: usize) -> Self {
    Self {
      processes,
      sync_interval: 10,
    }
  }

  /// Sets the number of generations between synchronizations.
  pub fn with_sync_interval(self, sync_interval: usize) -> Self {
    Self {
      sync_interval,
      ..self
    }
  }

  fn run_rank<C: Communicator>(
    &self,
    comm: &C,
    points: Option<Vec<Point>>,
    config: Config,
  ) -> Result<Option<Vec<BestSolution>>> {
    let rank = comm.rank();
    let points = comm.broadcast_points(COORDINATOR, points)?;
    let problem = Problem::new(&points, &config)?;
    let size = partition(config.population_size, comm.size())[rank];

    let mut evolution =
      Evolution::new(&problem, Sequential, RandomRankSelector, rank, size);
    for generation in 0..config.generations {
      evolution.step(generation)?;
      if generation % self.sync_interval == 0 {
        let global = exchange_best(comm, generation as u64, evolution.best())?;
        let length = global.length;
        let adopted = evolution.adopt(global);
        debug!(
          "rank {rank} synchronized at generation {generation}: global best \
           {length}, adopted: {adopted}"
        );
      }
    }

    let best = evolution.finish();
    debug!("rank {rank} finished with local best {}", best.length());
    comm.gather(config.generations as u64, COORDINATOR, best)
  }
}

impl Default for Distributed {
  fn default() -> Self {
    Self::new(4)
  }
}

impl ExecutionStrategy for Distributed {
  fn name(&self) -> &'static str {
    "distributed"
  }

  fn validate(&self, config: &Config) -> Result<()> {
    if self.processes == 0 {
      return Err(Error::invalid_config("process count must be positive"));
    }
    if self.sync_interval == 0 {
      return Err(Error::invalid_config("sync interval must be positive"));
    }
    if config.population_size < self.processes {
      return Err(Error::invalid_config(format!(
        "population of {} cannot be split over {} processes",
        config.population_size, self.processes
      )));
    }
    Ok(())
  }

  fn execute(&self, problem: &Problem<'_>) -> Result<Vec<BestSolution>> {
    let config = *problem.config();
    self.validate(&config)?;
    info!(
      "distributed: {} points, population {}, {} generations on {} ranks, \
       syncing every {}",
      problem.num_points(),
      config.population_size,
      config.generations,
      self.processes,
      self.sync_interval
    );

    let outcomes: Vec<_> = thread::scope(|s| {
      let handles: Vec<_> = LocalCluster::new(self.processes)
        .into_iter()
        .map(|comm| {
          let points =
            (comm.rank() == COORDINATOR).then(|| problem.points().to_vec());
          s.spawn(move || self.run_rank(&comm, points, config))
        })
        .collect();
      handles
        .into_iter()
        .enumerate()
        .map(|(rank, handle)| {
          handle.join().unwrap_or(Err(Error::WorkerPanicked(rank)))
        })
        .collect()
    });

    let mut gathered = None;
    let mut errors = Vec::new();
    for outcome in outcomes {
      match outcome {
        Ok(Some(bests)) => gathered = Some(bests),
        Ok(None) => {}
        Err(error) => errors.push(error),
      }
    }
    // a failing rank hangs up on its peers; report the cause, not the echo
    if let Some(index) = errors
      .iter()
      .position(|e| !matches!(e, Error::Disconnected { .. }))
      .or((!errors.is_empty()).then_some(0))
    {
      return Err(errors.swap_remove(index));
    }
    gathered.ok_or(Error::Disconnected {
      rank: COORDINATOR,
      peer: COORDINATOR,
    })
  }
}

/// Splits `total` slots over `parts` ranks. The first `total % parts` ranks
/// get one slot more than the rest.
pub(crate) fn partition(total: usize, parts: usize) -> Vec<usize> {
  let (base, rest) = (total / parts, total % parts);
  (0..parts).map(|i| base + usize::from(i < rest)).collect()
}

/// One synchronization: argmin-reduces the local best lengths of all ranks,
/// then broadcasts the winning rank's tour. Every rank returns the same
/// global best.
pub(crate) fn exchange_best<C: Communicator + ?Sized>(
  comm: &C,
  epoch: u64,
  local: &BestSolution,
) -> Result<Solution> {
  let winner = comm.all_reduce_min_loc(epoch, local.length())?;
  let tour = if comm.rank() == winner.rank {
    local.tour().cloned()
  } else {
    None
  };
  let tour = comm.broadcast_tour(epoch, winner.rank, tour)?;
  Ok(Solution::new(tour, winner.length))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    collective::LocalCommunicator, geometry::tour_length, random::worker_rng,
    tour::Tour,
  };

  fn run_ranks<T: Send>(
    size: usize,
    f: impl Fn(LocalCommunicator) -> T + Sync,
  ) -> Vec<T> {
    let f = &f;
    thread::scope(|s| {
      let handles: Vec<_> = LocalCluster::new(size)
        .into_iter()
        .map(|comm| s.spawn(move || f(comm)))
        .collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
  }

  fn grid(n: i64) -> Vec<Point> {
    (0..n)
      .map(|i| Point::new(i, (i % 4) as f64 * 2.0, (i / 4) as f64 * 3.0))
      .collect()
  }

  #[test]
  fn test_exchange_reaches_global_minimum_everywhere() {
    let points = grid(7);
    let locals: Vec<_> = (0..5)
      .map(|rank| {
        let tour = Tour::random(7, &mut worker_rng(3, rank));
        let length = tour_length(&tour, &points);
        Solution::new(tour, length)
      })
      .collect();
    let minimum = locals
      .iter()
      .map(|s| s.length)
      .fold(f64::INFINITY, f64::min);

    let captured = run_ranks(locals.len(), |comm| {
      let before = BestSolution::from(locals[comm.rank()].clone());
      let after = exchange_best(&comm, 10, &before).unwrap();
      (before.length(), after)
    });
    for (before, after) in &captured {
      assert!(*before >= minimum);
      assert_eq!(after.length, minimum);
      assert_eq!(tour_length(&after.tour, &points), minimum);
    }
  }

  #[test]
  fn test_exchange_ties_go_to_lowest_rank() {
    let tours = [
      Tour::try_from_vec(vec![0, 1, 2]).unwrap(),
      Tour::try_from_vec(vec![2, 1, 0]).unwrap(),
      Tour::try_from_vec(vec![1, 2, 0]).unwrap(),
      Tour::try_from_vec(vec![0, 2, 1]).unwrap(),
    ];
    let lengths = [9.0, 4.0, 6.0, 4.0];
    let results = run_ranks(4, |comm| {
      let rank = comm.rank();
      let local: BestSolution =
        Solution::new(tours[rank].clone(), lengths[rank]).into();
      exchange_best(&comm, 0, &local).unwrap()
    });
    for result in results {
      assert_eq!(result, Solution::new(tours[1].clone(), 4.0));
    }
  }

  #[test]
  fn test_exchange_with_overflowed_lengths_still_sends_a_tour() {
    let results = run_ranks(3, |comm| {
      let mut local = BestSolution::new();
      local.offer(&Tour::identity(4), f64::INFINITY);
      exchange_best(&comm, 0, &local).unwrap()
    });
    for result in results {
      assert_eq!(result, Solution::new(Tour::identity(4), f64::INFINITY));
    }
  }

  #[test]
  fn test_partition_covers_population() {
    assert_eq!(partition(10, 3), [4, 3, 3]);
    assert_eq!(partition(8, 4), [2, 2, 2, 2]);
    assert_eq!(partition(5, 5), [1, 1, 1, 1, 1]);
    for parts in 1..=7 {
      assert_eq!(partition(100, parts).iter().sum::<usize>(), 100);
    }
  }

  #[test]
  fn test_runs_are_reproducible_and_gather_every_rank() {
    let points = grid(10);
    let config = Config::builder().population_size(30).generations(25).build();
    let problem = Problem::new(&points, &config).unwrap();
    let strategy = Distributed::new(3).with_sync_interval(5);

    let first = strategy.execute(&problem).unwrap();
    let second = strategy.execute(&problem).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    for best in &first {
      let tour = best.tour().unwrap();
      assert!(tour.is_permutation_of(10));
      assert!((tour_length(tour, &points) - best.length()).abs() < 1e-9);
    }
  }

  #[test]
  fn test_single_process() {
    let points = grid(6);
    let config = Config::builder().population_size(8).generations(12).build();
    let problem = Problem::new(&points, &config).unwrap();
    let bests = Distributed::new(1).execute(&problem).unwrap();
    assert_eq!(bests.len(), 1);
    assert!(bests[0].tour().unwrap().is_permutation_of(6));
  }

  #[test]
  fn test_validation() {
    let config = Config::builder().population_size(4).build();
    for strategy in [
      Distributed::new(0),
      Distributed::new(2).with_sync_interval(0),
      Distributed::new(5),
    ] {
      assert!(matches!(
        strategy.validate(&config),
        Err(Error::InvalidConfig(_))
      ));
    }
    assert!(Distributed::new(4).validate(&config).is_ok());
  }
}
