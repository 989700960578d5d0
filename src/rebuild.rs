// MIT License
//
// Copyright (c) 2020 Gregory Meyer
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Rejection samplers shared by subtable and top-level rebuilds.
//!
//! Both samplers draw fresh functions from the family until a predicate
//! holds: injectivity over the live keys for subtables, the space-balance
//! criterion for the top level. Under universal hashing each draw
//! succeeds with probability at least 1/2, so neither loop carries a
//! retry cap.

use rand::Rng;

use crate::error::Error;
use crate::hash::{HashFamily, UniversalHash};

/// Unwraps a sampler result, panicking with the error's message.
///
/// Range errors are hard precondition violations; every caller checks
/// ranges before mutating shared state, so the panic leaves the table as
/// it was.
pub(crate) fn sampled<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{}", err),
    }
}

/// Draws functions onto `[0, buckets)` until one is injective over
/// `keys`.
pub(crate) fn find_perfect_hash<R: Rng>(
    keys: &[u64],
    buckets: u64,
    family: HashFamily,
    rng: &mut R,
) -> Result<UniversalHash, Error> {
    let mut occupied = vec![false; buckets as usize];

    loop {
        let hash = family.new_hash(buckets, rng)?;

        if is_injective(&hash, keys, &mut occupied) {
            return Ok(hash);
        }
    }
}

fn is_injective(hash: &UniversalHash, keys: &[u64], occupied: &mut [bool]) -> bool {
    for slot in occupied.iter_mut() {
        *slot = false;
    }

    for &key in keys {
        let index = hash.index(key);

        if occupied[index] {
            return false;
        }

        occupied[index] = true;
    }

    true
}

/// Draws functions onto `[0, slots)` until the distribution they induce
/// over `keys` satisfies the balance criterion for `threshold`.
///
/// Returns the winning function together with its distribution: entry
/// `i` counts the keys mapped to slot `i`.
pub(crate) fn find_balanced_hash<R: Rng>(
    keys: &[u64],
    slots: u64,
    threshold: u64,
    family: HashFamily,
    rng: &mut R,
) -> Result<(UniversalHash, Vec<usize>), Error> {
    let mut counts = vec![0usize; slots as usize];

    loop {
        let hash = family.new_hash(slots, rng)?;

        for count in counts.iter_mut() {
            *count = 0;
        }

        for &key in keys {
            counts[hash.index(key)] += 1;
        }

        let total: u128 = counts.iter().map(|&count| subtable_buckets(count) as u128).sum();

        if is_balanced(total, threshold, slots) {
            return Ok((hash, counts));
        }
    }
}

/// The bucket array size a subtable holding `pairs` pairs would use:
/// zero for an unallocated slot, otherwise `2m(m − 1)` with capacity
/// `m = 2·pairs`.
pub(crate) fn subtable_buckets(pairs: usize) -> usize {
    if pairs == 0 {
        return 0;
    }

    let capacity = 2 * pairs;

    2 * capacity * (capacity - 1)
}

/// The space-balance criterion: `Σ sⱼ ≤ 32M²/s(M) + 4M`, evaluated in
/// the division-free form `(Σ sⱼ − 4M)·s(M) ≤ 32M²`.
pub(crate) fn is_balanced(total_buckets: u128, threshold: u64, slots: u64) -> bool {
    let threshold = u128::from(threshold);
    let slack = 4 * threshold;

    if total_buckets <= slack {
        return true;
    }

    (total_buckets - slack) * u128::from(slots) <= 32 * threshold * threshold
}
