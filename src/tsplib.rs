//! Reading point lists from TSPLIB-style coordinate files.
//!
//! Only what is needed to get points out of a `.tsp` file is understood:
//! every line before `NODE_COORD_SECTION` is skipped, each following line
//! is an `id x y` record, and an `EOF` line (or the end of the input) ends
//! the section. Blank lines are ignored and markers are case-insensitive.

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use crate::{
  error::{Error, Result},
  geometry::Point,
};

const SECTION_HEADER: &str = "NODE_COORD_SECTION";
const EOF_MARKER: &str = "EOF";

/// Parses the coordinate section of a TSPLIB file.
///
/// # Examples
/// ```
/// let text = "NAME: tiny\nTYPE: TSP\nNODE_COORD_SECTION\n1 0 0\n2 3 4\nEOF\n";
/// let points = evotour::tsplib::parse(text.as_bytes()).unwrap();
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[1].distance(&points[0]), 5.0);
/// ```
pub fn parse(reader: impl BufRead) -> Result<Vec<Point>> {
  let mut lines = reader.lines().enumerate();
  let mut line_count = 0;

  let mut found_section = false;
  for (index, line) in lines.by_ref() {
    line_count = index + 1;
    if line?.trim().eq_ignore_ascii_case(SECTION_HEADER) {
      found_section = true;
      break;
    }
  }
  if !found_section {
    return Err(Error::Parse {
      line: line_count,
      reason: format!("no {SECTION_HEADER} found"),
    });
  }

  let mut points = Vec::new();
  for (index, line) in lines {
    let line = line?;
    let record = line.trim();
    if record.is_empty() {
      continue;
    }
    if record.eq_ignore_ascii_case(EOF_MARKER) {
      break;
    }
    points.push(parse_record(index + 1, record)?);
  }
  Ok(points)
}

/// Opens `path` and [`parse`]s it.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Point>> {
  parse(BufReader::new(File::open(path)?))
}

fn parse_record(line: usize, record: &str) -> Result<Point> {
  let parse_error = |reason: String| Error::Parse { line, reason };
  let fields: Vec<&str> = record.split_whitespace().collect();
  let [id, x, y] = fields[..] else {
    return Err(parse_error(format!(
      "expected `id x y`, found {} fields",
      fields.len()
    )));
  };

  let id = id
    .parse::<i64>()
    .map_err(|e| parse_error(format!("bad id `{id}`: {e}")))?;
  let coordinate = |value: &str| {
    value
      .parse::<f64>()
      .map_err(|e| parse_error(format!("bad coordinate `{value}`: {e}")))
  };
  let (x, y) = (coordinate(x)?, coordinate(y)?);
  if !x.is_finite() || !y.is_finite() {
    return Err(Error::invalid_input(format!(
      "point {id} on line {line} has a non-finite coordinate"
    )));
  }
  Ok(Point::new(id, x, y))
}
