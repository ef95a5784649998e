//! Parent selection operators.
//!
//! Every generation the best-ranked tour is carried unchanged into slot `0`
//! of the next generation (elitism). Each remaining slot `i` is filled by
//! crossing the two parents a [`ParentSelection`] picks for it.

use rand::{Rng, RngCore};

use crate::population::Ranking;

/// Picks the two parents of the offspring that will fill slot `slot`
/// (`slot >= 1`) of the next generation.
///
/// Returned values are slot indices into the population `ranking` was
/// computed for.
pub trait ParentSelection {
  /// Returns `(first, second)` parent slots.
  fn parents(
    &self,
    ranking: &Ranking,
    slot: usize,
    rng: &mut dyn RngCore,
  ) -> (usize, usize);
}

/// Crosses the tours ranked `slot - 1` and `slot`. Deterministic: the
/// random source is never touched.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct AdjacentRankSelector;

impl ParentSelection for AdjacentRankSelector {
  fn parents(
    &self,
    ranking: &Ranking,
    slot: usize,
    _: &mut dyn RngCore,
  ) -> (usize, usize) {
    (ranking.slot(slot - 1), ranking.slot(slot))
  }
}

/// Picks both parents uniformly at random from the whole ranked pool,
/// possibly the same tour twice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RandomRankSelector;

impl ParentSelection for RandomRankSelector {
  fn parents(
    &self,
    ranking: &Ranking,
    _: usize,
    rng: &mut dyn RngCore,
  ) -> (usize, usize) {
    let n = ranking.len();
    (
      ranking.slot(rng.gen_range(0..n)),
      ranking.slot(rng.gen_range(0..n)),
    )
  }
}
