//! Run configuration shared by every execution strategy.

use typed_builder::TypedBuilder;

use crate::{
  error::{Error, Result},
  mutation::SwapMutation,
};

/// Parameters of one optimization run.
///
/// Strategy-specific knobs (thread, worker and process counts, the
/// synchronization interval) live on the strategy values themselves.
///
/// # Examples
/// ```
/// # use evotour::Config;
/// let config = Config::builder()
///   .population_size(50)
///   .generations(200)
///   .seed(7)
///   .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.mutation_rate, 0.01);
/// ```
#[derive(TypedBuilder, Clone, Copy, Debug, PartialEq)]
pub struct Config {
  /// Number of tours per generation, summed over all workers. Must be
  /// positive.
  #[builder(default = 100)]
  pub population_size: usize,
  /// Number of generations (worker-pool: improvement steps per task).
  #[builder(default = 100)]
  pub generations: usize,
  /// Per-position swap probability of the mutation, within `[0, 1]`.
  #[builder(default = 0.01)]
  pub mutation_rate: f64,
  /// Base seed every random source of the run is derived from.
  #[builder(default = 42)]
  pub seed: u64,
}

impl Default for Config {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl Config {
  /// Fails with [`Error::InvalidConfig`] if a value is out of range.
  pub fn validate(&self) -> Result<()> {
    if self.population_size == 0 {
      return Err(Error::invalid_config("population size must be positive"));
    }
    self.mutation().map(|_| ())
  }

  /// The swap mutation described by this configuration.
  pub fn mutation(&self) -> Result<SwapMutation> {
    SwapMutation::new(self.mutation_rate)
  }
}
