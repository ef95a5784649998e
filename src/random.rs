//! Deterministic derivation of independent random sources.
//!
//! Nothing in this crate touches a process-wide generator. Every worker (or,
//! inside the generational engine, every population slot of every
//! generation) owns a [`StdRng`] derived from the run's base seed, so a run
//! is reproducible no matter how its work is scheduled across threads.

use rand::{rngs::StdRng, SeedableRng};

/// Random source of worker `worker` seeded with `seed + worker`.
pub fn worker_rng(seed: u64, worker: usize) -> StdRng {
  StdRng::seed_from_u64(seed.wrapping_add(worker as u64))
}

/// Random source for one `slot` of one `generation` of the population owned
/// by `stream` (a rank or a strategy instance).
pub(crate) fn slot_rng(
  seed: u64,
  stream: usize,
  generation: usize,
  slot: usize,
) -> StdRng {
  let mixed = [stream, generation, slot]
    .into_iter()
    .fold(mix(seed), |acc, v| mix(acc ^ v as u64));
  StdRng::seed_from_u64(mixed)
}

/// SplitMix64 finalizer.
fn mix(mut z: u64) -> u64 {
  z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
  z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  z ^ (z >> 31)
}
