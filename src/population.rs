//! Populations of candidate tours and their ranking.

use std::cmp::Ordering;

use crate::{geometry::Length, tour::Tour};

/// A fixed-size, ordered collection of tours owned by one scope (a whole run
/// or one worker's partition of it).
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
  tours: Vec<Tour>,
}

impl Population {
  /// Wraps given tours.
  ///
  /// # Panics
  ///
  /// Panics if `tours` is empty.
  pub fn new(tours: Vec<Tour>) -> Self {
    assert!(!tours.is_empty(), "population cannot be empty");
    Self { tours }
  }

  /// Number of slots.
  pub fn len(&self) -> usize {
    self.tours.len()
  }

  /// Always `false`: populations cannot be empty.
  pub fn is_empty(&self) -> bool {
    self.tours.is_empty()
  }

  /// Tours in slot order.
  pub fn tours(&self) -> &[Tour] {
    &self.tours
  }

  /// Replaces the tour in the last slot.
  pub(crate) fn replace_last(&mut self, tour: Tour) {
    if let Some(last) = self.tours.last_mut() {
      *last = tour;
    }
  }
}

/// Slot indices of a population ordered by ascending tour length.
///
/// Sorting is stable, so equally long tours keep their slot order. `NaN`
/// lengths rank last.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
  order: Vec<usize>,
  lengths: Vec<Length>,
}

impl Ranking {
  /// Ranks slots by their `lengths`.
  pub fn new(lengths: Vec<Length>) -> Self {
    let mut order: Vec<usize> = (0..lengths.len()).collect();
    order.sort_by(|&a, &b| compare_lengths(lengths[a], lengths[b]));
    Self { order, lengths }
  }

  /// Slot of the `rank`-th shortest tour, `0` being the best.
  pub fn slot(&self, rank: usize) -> usize {
    self.order[rank]
  }

  /// Slot and length of the shortest tour.
  pub fn best(&self) -> (usize, Length) {
    let slot = self.order[0];
    (slot, self.lengths[slot])
  }

  /// Number of ranked slots.
  pub fn len(&self) -> usize {
    self.order.len()
  }

  /// Returns `true` if nothing was ranked.
  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Length of the tour in `slot`.
  pub fn length_of(&self, slot: usize) -> Length {
    self.lengths[slot]
  }
}

fn compare_lengths(a: Length, b: Length) -> Ordering {
  match (a.is_nan(), b.is_nan()) {
    (false, false) => a.total_cmp(&b),
    (a_nan, b_nan) => a_nan.cmp(&b_nan),
  }
}
