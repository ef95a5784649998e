use std::{env, time::Instant};

use evotour::*;
use itertools::Itertools;
use rand::prelude::*;

fn main() -> Result<()> {
  // `RUST_LOG=debug` shows synchronizations and worker exits too
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("info"),
  )
  .init();

  // a TSPLIB file from the command line, or 150 random points
  let points = match env::args().nth(1) {
    Some(path) => tsplib::load(path)?,
    None => {
      let mut rng = StdRng::seed_from_u64(7);
      (1..=150)
        .map(|id| {
          Point::new(id, rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0))
        })
        .collect()
    }
  };

  let config = Config::builder()
    .population_size(120)
    .generations(300)
    .mutation_rate(0.01)
    .build();

  run(&points, config, Serial)?;
  run(&points, config, DataParallel::default())?;
  run(&points, config, WorkerPool::new(4))?;
  run(&points, config, Distributed::new(4).with_sync_interval(10))?;
  Ok(())
}

fn run<E: ExecutionStrategy>(
  points: &[Point],
  config: Config,
  strategy: E,
) -> Result<()> {
  let name = strategy.name();
  let started = Instant::now();
  let best = Optimizer::builder()
    .points(points.to_vec())
    .config(config)
    .strategy(strategy)
    .build()
    .optimize()?;

  println!(
    "{name:>13}: length {:.3} in {:.2?}",
    best.length,
    started.elapsed()
  );
  // print point ids rather than indices, the way the input numbers them
  println!(
    "{:>13}  {}",
    "",
    best.tour.iter().map(|&i| points[i].id).join(" ")
  );
  Ok(())
}
