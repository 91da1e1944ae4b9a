//! Deterministic seed mixing and per-phase random streams for arena generation.

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

pub(crate) const STREAM_AUTOMATON: u64 = 1;
pub(crate) const STREAM_DETAIL: u64 = 2;
pub(crate) const STREAM_SPAWNS: u64 = 3;

pub(crate) fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

/// Each generation phase draws from its own stream so adding draws in one phase
/// leaves the others untouched.
pub(crate) fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(mix_seed_stream(seed, stream))
}

/// Uniform-enough draw in `0..bound`; `bound` must be non-zero.
pub(crate) fn roll_below(rng: &mut ChaCha8Rng, bound: usize) -> usize {
    debug_assert!(bound > 0);
    (rng.next_u64() % bound as u64) as usize
}

pub(crate) fn roll_range(rng: &mut ChaCha8Rng, min_value: usize, max_value: usize) -> usize {
    debug_assert!(min_value <= max_value);
    min_value + roll_below(rng, max_value - min_value + 1)
}
