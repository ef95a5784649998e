//! Error type shared by the whole crate.

use thiserror::Error as ThisError;

/// Everything that can stop a run. None of these are retried: a run either
/// completes with one best tour or aborts with one of these.
#[derive(Debug, ThisError)]
pub enum Error {
  /// A configuration value is out of its allowed range.
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
  /// The point list cannot be optimized.
  #[error("invalid input: {0}")]
  InvalidInput(String),
  /// An operator produced something that is not a permutation of
  /// `0..expected`.
  #[error("tour of length {len} is not a permutation of 0..{expected}")]
  NotAPermutation {
    /// Length of the offending tour.
    len: usize,
    /// Number of points the tour should visit.
    expected: usize,
  },
  /// A rank entered a collective operation out of step with a peer.
  #[error(
    "rank {rank} expected `{expected}` from rank {peer} but received `{found}`"
  )]
  CollectiveMismatch {
    /// Rank that detected the mismatch.
    rank: usize,
    /// Peer the mismatching message came from.
    peer: usize,
    /// Collective and epoch the receiving rank was in.
    expected: String,
    /// Collective and epoch the message was sent from.
    found: String,
  },
  /// A peer rank hung up in the middle of a collective.
  #[error("rank {rank} lost contact with rank {peer}")]
  Disconnected {
    /// Rank that noticed.
    rank: usize,
    /// Rank that went away.
    peer: usize,
  },
  /// A worker thread panicked before finishing its work.
  #[error("worker {0} panicked")]
  WorkerPanicked(usize),
  /// The data-parallel thread pool could not be built.
  #[error(transparent)]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
  /// Reading a point file failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
  /// A point file line could not be parsed.
  #[error("malformed point record on line {line}: {reason}")]
  Parse {
    /// 1-based line number.
    line: usize,
    /// What was wrong with it.
    reason: String,
  },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
    Self::InvalidConfig(message.into())
  }

  pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
    Self::InvalidInput(message.into())
  }
}
