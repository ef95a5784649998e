//! Recombination operators.

use rand::{Rng, RngCore};

use crate::tour::Tour;

/// An operator that creates one offspring tour from two parent tours.
///
/// Implementations must return a permutation of the same index set whenever
/// both parents are permutations of it. They must not touch shared state,
/// since strategies call them concurrently for different slots.
pub trait Recombination {
  /// Combines `first` and `second` into an offspring.
  fn recombine(&self, first: &Tour, second: &Tour, rng: &mut dyn RngCore)
    -> Tour;
}

/// Order crossover (OX).
///
/// Picks two cut points `start <= end` uniformly over the index range, copies
/// `first[start..=end]` into the offspring at the same positions, then fills
/// the remaining positions from left to right with the entries of `second`
/// in the order they appear there, skipping entries already copied.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct OrderCrossover;

impl OrderCrossover {
  /// Crossover with explicit, inclusive cut points.
  ///
  /// # Panics
  ///
  /// Panics if the parents differ in length, if `start > end` or if `end` is
  /// out of bounds.
  pub fn cross(first: &Tour, second: &Tour, start: usize, end: usize) -> Tour {
    let n = first.len();
    assert_eq!(n, second.len(), "parents must have the same length");
    assert!(start <= end && end < n, "invalid cut [{start}, {end}] for {n}");

    let mut child: Vec<Option<usize>> = vec![None; n];
    let mut taken = vec![false; n];
    for i in start..=end {
      child[i] = Some(first[i]);
      taken[first[i]] = true;
    }

    // `cursor` only moves forward, so `second`'s order is kept and every
    // missing entry is found exactly once
    let mut cursor = 0;
    for slot in child.iter_mut().filter(|s| s.is_none()) {
      while taken[second[cursor]] {
        cursor += 1;
      }
      *slot = Some(second[cursor]);
      taken[second[cursor]] = true;
      cursor += 1;
    }

    Tour::from_vec_unchecked(child.into_iter().flatten().collect())
  }
}

impl Recombination for OrderCrossover {
  fn recombine(
    &self,
    first: &Tour,
    second: &Tour,
    rng: &mut dyn RngCore,
  ) -> Tour {
    let n = first.len();
    let a = rng.gen_range(0..n);
    let b = rng.gen_range(0..n);
    Self::cross(first, second, a.min(b), a.max(b))
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;

  fn tour(order: &[usize]) -> Tour {
    Tour::try_from_vec(order.to_vec()).unwrap()
  }

  #[test]
  fn test_known_cut() {
    let p1 = tour(&[0, 1, 2, 3, 4, 5, 6, 7]);
    let p2 = tour(&[7, 6, 5, 4, 3, 2, 1, 0]);
    // keeps 2, 3, 4 in place, fills with 7, 6, 5, 1, 0 in p2's order
    assert_eq!(
      OrderCrossover::cross(&p1, &p2, 2, 4),
      tour(&[7, 6, 2, 3, 4, 5, 1, 0])
    );
  }

  #[test]
  fn test_full_cut_copies_first_parent() {
    let p1 = tour(&[2, 0, 3, 1]);
    let p2 = tour(&[1, 3, 0, 2]);
    assert_eq!(OrderCrossover::cross(&p1, &p2, 0, 3), p1);
  }

  #[test]
  fn test_single_entry() {
    let p = Tour::identity(1);
    assert_eq!(OrderCrossover::cross(&p, &p, 0, 0), p);
  }

  #[test]
  fn test_offspring_properties() {
    let mut rng = StdRng::seed_from_u64(3);
    for n in 1..40 {
      for _ in 0..20 {
        let p1 = Tour::random(n, &mut rng);
        let p2 = Tour::random(n, &mut rng);
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        let (start, end) = (a.min(b), a.max(b));
        let child = OrderCrossover::cross(&p1, &p2, start, end);

        assert!(child.is_permutation_of(n));
        // the cut segment of the first parent stays in place
        assert_eq!(&child[start..=end], &p1[start..=end]);
        // everything else keeps the second parent's relative order
        let segment = &p1[start..=end];
        let expected: Vec<usize> =
          p2.iter().copied().filter(|i| !segment.contains(i)).collect();
        let filled: Vec<usize> = child
          .iter()
          .enumerate()
          .filter(|(pos, _)| *pos < start || *pos > end)
          .map(|(_, &i)| i)
          .collect();
        assert_eq!(filled, expected);
      }
    }
  }

  #[test]
  fn test_random_cuts_yield_permutations() {
    let mut rng = StdRng::seed_from_u64(5);
    for n in 1..30 {
      let p1 = Tour::random(n, &mut rng);
      let p2 = Tour::random(n, &mut rng);
      for _ in 0..10 {
        assert!(OrderCrossover.recombine(&p1, &p2, &mut rng).is_permutation_of(n));
      }
    }
  }
}
