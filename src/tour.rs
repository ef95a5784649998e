//! Tours: permutations of point indices.

use std::ops::Deref;

use rand::{seq::SliceRandom, RngCore};

use crate::error::{Error, Result};

/// A closed visiting order, i.e. a permutation of `0..n` where `n` is the
/// number of points.
///
/// Derefs to `[usize]`. The only ways to change a tour in place are
/// [`Tour::swap`], which cannot break the permutation, and the operators of
/// this crate, whose output is checked with [`Tour::check`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tour(Vec<usize>);

impl Tour {
  /// The identity tour `0, 1, .., n - 1`.
  pub fn identity(n: usize) -> Self {
    Self((0..n).collect())
  }

  /// A uniformly random permutation of `0..n` (Fisher–Yates shuffle of the
  /// identity tour).
  pub fn random(n: usize, rng: &mut dyn RngCore) -> Self {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    Self(order)
  }

  /// Wraps `order` after checking that it is a permutation of
  /// `0..order.len()`.
  pub fn try_from_vec(order: Vec<usize>) -> Result<Self> {
    let tour = Self(order);
    tour.check(tour.len())?;
    Ok(tour)
  }

  /// Wraps `order` without checking it.
  pub(crate) fn from_vec_unchecked(order: Vec<usize>) -> Self {
    Self(order)
  }

  /// Returns `true` if this tour visits each of `0..n` exactly once.
  pub fn is_permutation_of(&self, n: usize) -> bool {
    if self.0.len() != n {
      return false;
    }
    let mut seen = vec![false; n];
    self.0.iter().all(|&i| {
      i < n && !std::mem::replace(&mut seen[i], true)
    })
  }

  /// Fails with [`Error::NotAPermutation`] unless this tour is a permutation
  /// of `0..n`.
  pub fn check(&self, n: usize) -> Result<()> {
    if self.is_permutation_of(n) {
      Ok(())
    } else {
      Err(Error::NotAPermutation {
        len: self.0.len(),
        expected: n,
      })
    }
  }

  /// Exchanges the entries at positions `a` and `b`.
  pub fn swap(&mut self, a: usize, b: usize) {
    self.0.swap(a, b);
  }

  /// Unwraps the visiting order.
  pub fn into_vec(self) -> Vec<usize> {
    self.0
  }
}

impl Deref for Tour {
  type Target = [usize];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl From<Tour> for Vec<usize> {
  fn from(tour: Tour) -> Self {
    tour.0
  }
}
