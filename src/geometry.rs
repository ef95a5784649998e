//! Points on a plane and the length of closed tours over them.

use itertools::Itertools;

use crate::error::{Error, Result};

/// Length of a tour or of a single edge. Lower is better.
pub type Length = f64;

/// A point to visit. Never mutated after loading, so all workers share the
/// same slice without synchronization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
  /// Identifier as it appeared in the input.
  pub id: i64,
  /// Horizontal coordinate.
  pub x: f64,
  /// Vertical coordinate.
  pub y: f64,
}

impl Point {
  /// Creates a point.
  pub fn new(id: i64, x: f64, y: f64) -> Self {
    Self { id, x, y }
  }

  /// Euclidean distance to `other`.
  pub fn distance(&self, other: &Self) -> Length {
    distance(self, other)
  }
}

/// Euclidean distance between two points.
pub fn distance(a: &Point, b: &Point) -> Length {
  (a.x - b.x).hypot(a.y - b.y)
}

/// Length of the closed tour visiting `points` in the order given by `tour`,
/// including the edge from the last entry back to the first. A single-entry
/// tour is a self-loop of length zero.
///
/// # Panics
///
/// Panics if an index in `tour` is out of bounds of `points`.
pub fn tour_length(tour: &[usize], points: &[Point]) -> Length {
  tour
    .iter()
    .circular_tuple_windows()
    .map(|(&a, &b)| distance(&points[a], &points[b]))
    .sum()
}

/// Rejects point lists that cannot be optimized: empty ones, ones with
/// non-finite coordinates and ones spread so wide that a tour length could
/// overflow.
pub(crate) fn validate_points(points: &[Point]) -> Result<()> {
  if points.is_empty() {
    return Err(Error::invalid_input("point list is empty"));
  }
  if let Some(p) = points.iter().find(|p| !(p.x.is_finite() && p.y.is_finite()))
  {
    return Err(Error::invalid_input(format!(
      "point {} has non-finite coordinates ({}, {})",
      p.id, p.x, p.y
    )));
  }

  // no edge is longer than the bounding box diagonal
  let extent = |coordinate: fn(&Point) -> f64| {
    points
      .iter()
      .map(coordinate)
      .minmax()
      .into_option()
      .map_or(0.0, |(min, max)| max - min)
  };
  let diagonal = extent(|p| p.x).hypot(extent(|p| p.y));
  if !(diagonal * points.len() as f64).is_finite() {
    return Err(Error::invalid_input(
      "points are spread too wide for tour lengths to stay finite",
    ));
  }
  Ok(())
}
