//! **Evotour** searches for short closed tours through a set of points in the
//! plane with a genetic algorithm, and lets you choose how that search is
//! spread over threads or independent ranks.
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! # The genetic algorithm
//!
//! A candidate solution is a [`Tour`]: a permutation of point indices, read
//! as a closed loop. Its fitness is its [length](geometry::tour_length), and
//! shorter is better. Every generation runs the same steps:
//! 1. **Evaluate** each tour of the population
//! 2. **Rank** the population by ascending length and carry the best tour
//!    unchanged into slot `0` of the next generation (elitism)
//! 3. **Select** two parents for every other slot
//! 4. **Recombine** them with an [order crossover](recombination::OrderCrossover)
//! 5. **Mutate** the child with [swaps](mutation::SwapMutation)
//!
//! After the last generation the final population is evaluated once more.
//! Elitism guarantees the best length a worker has seen never increases.
//!
//! # Execution strategies
//!
//! How the loop above is run is decided by an [`ExecutionStrategy`]:
//!
//! | Strategy         | Parallelism                       | Parents        | Reproducible |
//! |:-----------------|:----------------------------------|:---------------|:------------:|
//! | [`Serial`]       | none                              | adjacent ranks | yes          |
//! | [`DataParallel`] | phases split over a `rayon` pool  | adjacent ranks | yes          |
//! | [`WorkerPool`]   | threads draining a task queue     | random tour    | no           |
//! | [`Distributed`]  | ranks exchanging messages only    | random ranks   | yes          |
//!
//! [`Serial`] and [`DataParallel`] return identical tours for the same seed:
//! every slot of every generation draws from its own random source, so the
//! thread count only changes how fast the answer arrives.
//!
//! [`WorkerPool`] does not run generations at all. Each starting tour from
//! the queue is improved on its own by repeatedly crossing it with fresh
//! random tours, and every candidate is offered to one
//! [`SharedBest`](best::SharedBest), which compares and writes under a single
//! lock.
//!
//! [`Distributed`] splits the population over ranks that only talk through a
//! [`Communicator`](collective::Communicator). Every few generations they
//! agree on the globally shortest tour with an argmin reduction followed by a
//! broadcast, and at the end the coordinator gathers every rank's best.
//!
//! Whatever the strategy, the [`Optimizer`] reduces the per-worker bests with
//! a [`ResultAggregator`](aggregation::ResultAggregator) and returns the
//! shortest one.
//!
//! # Operators
//!
//! The steps of a generation are traits: [`ParentSelection`],
//! [`Recombination`] and [`Mutation`]. The engine only calls them through
//! these traits, and each strategy picks its own parent selection from the
//! table above. Operators never touch shared state and receive their random
//! source as an argument, which is what makes them safe to call from any
//! strategy.
//!
//! # Logging
//!
//! The crate reports through the [`log`] facade: `info` when a run starts and
//! ends, `debug` for synchronizations and worker exits, `trace` whenever a
//! best tour improves. Install any logger in your binary to see them.
//!
//! # Example
//!
//! Load a TSPLIB file, run it on four ranks and print the result:
//! ```no_run
//! # fn main() -> evotour::Result<()> {
//! use evotour::{tsplib, Config, Distributed, Optimizer};
//!
//! let points = tsplib::load("att532.tsp")?;
//! let config = Config::builder()
//!   .population_size(200)
//!   .generations(500)
//!   .mutation_rate(0.02)
//!   .build();
//! let optimizer = Optimizer::builder()
//!   .points(points)
//!   .config(config)
//!   // synchronize the ranks every 25 generations
//!   .strategy(Distributed::new(4).with_sync_interval(25))
//!   .build();
//! let best = optimizer.optimize()?;
//! println!("{:?} has length {}", best.tour, best.length);
//! # Ok(())
//! # }
//! ```
//!
//! There is a runnable comparison of all four strategies in the *demos*
//! folder in the root of the project.
//!
//! [`ParentSelection`]: crate::selection::ParentSelection
//! [`Recombination`]: crate::recombination::Recombination
//! [`Mutation`]: crate::mutation::Mutation

#![warn(missing_docs)]

pub mod aggregation;
pub mod best;
pub mod collective;
pub mod config;
pub mod error;
mod evolution;
pub mod execution;
pub mod geometry;
pub mod mutation;
pub mod optimizer;
pub mod population;
pub mod random;
pub mod recombination;
pub mod selection;
pub mod tour;
pub mod tsplib;

pub use best::Solution;
pub use config::Config;
pub use error::{Error, Result};
pub use execution::{
  DataParallel, Distributed, ExecutionStrategy, Serial, WorkerPool,
};
pub use geometry::Point;
pub use optimizer::Optimizer;
pub use tour::Tour;
