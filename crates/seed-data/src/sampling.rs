//! Sampling without replacement.

use rand::Rng;
use rand::seq::SliceRandom;

/// Picks up to `k` distinct elements of `pool` in random order.
///
/// Requests larger than the pool clamp to the pool size. The pool itself is
/// never reordered or mutated.
pub fn sample_distinct<'a, T>(pool: &'a [T], k: usize, rng: &mut impl Rng) -> Vec<&'a T> {
    pool.choose_multiple(rng, k).collect()
}
