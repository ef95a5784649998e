//! Best-so-far tracking.
//!
//! A [`BestSolution`] belongs to exactly one scope and is updated through
//! `&mut`. When several threads report into the same scope they go through
//! a [`SharedBest`], whose only mutating operation compares and writes under
//! one lock acquisition.

use std::sync::{Mutex, PoisonError};

use crate::{geometry::Length, tour::Tour};

/// A tour together with its length.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
  /// Visiting order.
  pub tour: Tour,
  /// Closed tour length.
  pub length: Length,
}

impl Solution {
  /// Pairs a tour with its length.
  pub fn new(tour: Tour, length: Length) -> Self {
    Self { tour, length }
  }
}

/// The best solution a scope has observed so far.
///
/// Starts out "infinitely bad" and only ever improves: its length never
/// increases.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BestSolution(Option<Solution>);

impl BestSolution {
  /// A best solution that any candidate with a non-`NaN` length improves on.
  pub fn new() -> Self {
    Self(None)
  }

  /// Current best length, `f64::INFINITY` until something was offered.
  pub fn length(&self) -> Length {
    self.0.as_ref().map_or(Length::INFINITY, |s| s.length)
  }

  /// Current best tour, if any.
  pub fn tour(&self) -> Option<&Tour> {
    self.0.as_ref().map(|s| &s.tour)
  }

  /// Current best solution, if any.
  pub fn solution(&self) -> Option<&Solution> {
    self.0.as_ref()
  }

  /// Records `tour` if `length` is strictly shorter than the current best,
  /// or if nothing was recorded yet. Returns whether it was recorded. `NaN`
  /// lengths are never recorded.
  pub fn offer(&mut self, tour: &Tour, length: Length) -> bool {
    if self.improves(length) {
      self.0 = Some(Solution::new(tour.clone(), length));
      true
    } else {
      false
    }
  }

  /// Like [`BestSolution::offer`] but takes ownership of the candidate.
  pub fn offer_owned(&mut self, solution: Solution) -> bool {
    if self.improves(solution.length) {
      self.0 = Some(solution);
      true
    } else {
      false
    }
  }

  // the first candidate is recorded even if its length overflowed
  fn improves(&self, length: Length) -> bool {
    match &self.0 {
      Some(best) => length < best.length,
      None => !length.is_nan(),
    }
  }

  /// Unwraps the best solution, `None` if nothing was ever offered.
  pub fn into_solution(self) -> Option<Solution> {
    self.0
  }
}

impl From<Solution> for BestSolution {
  fn from(solution: Solution) -> Self {
    Self(Some(solution))
  }
}

/// A [`BestSolution`] shared by concurrent writers.
///
/// There is deliberately no way to read the current length and write a new
/// tour in two steps: [`SharedBest::offer`] holds the lock across both the
/// comparison and the write, so a worse candidate can never overwrite a
/// better one that raced ahead of it.
#[derive(Debug, Default)]
pub struct SharedBest(Mutex<BestSolution>);

impl SharedBest {
  /// An "infinitely bad" shared best.
  pub fn new() -> Self {
    Self::default()
  }

  /// Compares `length` with the current best and records `tour` if it is
  /// strictly shorter, atomically. Returns whether it was recorded.
  pub fn offer(&self, tour: &Tour, length: Length) -> bool {
    // a poisoned lock still guards a consistent value: the critical section
    // below is a single compare-and-assign
    self
      .0
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .offer(tour, length)
  }

  /// A snapshot of the current best length. Only meant for reporting; never
  /// base an update on it.
  pub fn length(&self) -> Length {
    self.0.lock().unwrap_or_else(PoisonError::into_inner).length()
  }

  /// Unwraps the shared value once all writers are done.
  pub fn into_inner(self) -> BestSolution {
    self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
  }
}
