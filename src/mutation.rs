//! Mutation operators.

use rand::{Rng, RngCore};

use crate::{
  error::{Error, Result},
  tour::Tour,
};

/// An operator that mutates a single tour in place.
///
/// Implementations must keep the tour a permutation. They must not touch
/// shared state, since strategies call them concurrently for different slots.
pub trait Mutation {
  /// Mutates given tour.
  fn mutate(&self, tour: &mut Tour, rng: &mut dyn RngCore);
}

/// Visits every position and, with probability `rate`, swaps its entry with
/// the entry at a uniformly chosen position (possibly the same one).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SwapMutation {
  rate: f64,
}

impl SwapMutation {
  /// Creates a swap mutation with per-position probability `rate`.
  ///
  /// Fails if `rate` is not within `[0, 1]`.
  pub fn new(rate: f64) -> Result<Self> {
    if (0.0..=1.0).contains(&rate) {
      Ok(Self { rate })
    } else {
      Err(Error::invalid_config(format!(
        "mutation rate must be within [0, 1], got {rate}"
      )))
    }
  }

  /// Per-position swap probability.
  pub fn rate(&self) -> f64 {
    self.rate
  }
}

impl Mutation for SwapMutation {
  fn mutate(&self, tour: &mut Tour, rng: &mut dyn RngCore) {
    let n = tour.len();
    for i in 0..n {
      if rng.gen::<f64>() < self.rate {
        let j = rng.gen_range(0..n);
        tour.swap(i, j);
      }
    }
  }
}
