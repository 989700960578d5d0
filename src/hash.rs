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

//! A universal family of integer hash functions.
//!
//! Functions have the form `k ↦ ((a·k + b) mod P) mod R` with `a` drawn
//! from `[1, P)` and `b` from `[0, P)`. For any two distinct keys below
//! `P`, a uniformly drawn member of the family maps them to the same
//! index with probability at most `1/R`, which is what makes rejection
//! sampling for collision-free and balanced functions terminate quickly.

use rand::Rng;

use crate::error::Error;

/// The default family prime, `2^61 − 1`.
///
/// Any prime strictly greater than every hash range the map will request
/// works; this one keeps even the quadratic bucket ranges of large
/// subtables expressible while still fitting multiplications in 128 bits.
pub const DEFAULT_PRIME: u64 = (1 << 61) - 1;

/// A single hash function onto `[0, range)`.
///
/// The parameters fully determine the function, so values may be copied
/// and evaluated freely from any thread. Keys must be drawn from
/// `[0, prime)`; keys at or above the prime alias with smaller keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UniversalHash {
    a: u64,
    b: u64,
    prime: u64,
    range: u64,
}

impl UniversalHash {
    /// Evaluates the function, returning a bucket index in `[0, range)`.
    #[inline]
    pub fn index(&self, key: u64) -> usize {
        debug_assert!(key < self.prime);

        let widened = u128::from(self.a) * u128::from(key) + u128::from(self.b);

        ((widened % u128::from(self.prime)) as u64 % self.range) as usize
    }

    /// The range this function maps onto.
    pub fn range(&self) -> u64 {
        self.range
    }
}

/// A source of independent, uniformly distributed [`UniversalHash`]
/// functions sharing one prime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HashFamily {
    prime: u64,
}

impl HashFamily {
    /// Creates a family over the given prime.
    ///
    /// The primality of `prime` is not verified; a composite modulus
    /// silently weakens the universality guarantee.
    pub fn new(prime: u64) -> Self {
        assert!(prime > 1, "hash family prime must be greater than 1");

        Self { prime }
    }

    /// The prime shared by every function in the family.
    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Checks that a range is expressible under the family prime.
    pub fn check_range(&self, range: u64) -> Result<(), Error> {
        if range == 0 || range >= self.prime {
            return Err(Error::RangeTooLarge {
                range,
                prime: self.prime,
            });
        }

        Ok(())
    }

    /// Draws a fresh function onto `[0, range)`.
    ///
    /// Each call returns an independent member of the family; nothing is
    /// cached between calls.
    pub fn new_hash<R: Rng>(&self, range: u64, rng: &mut R) -> Result<UniversalHash, Error> {
        self.check_range(range)?;

        Ok(UniversalHash {
            a: rng.gen_range(1..self.prime),
            b: rng.gen_range(0..self.prime),
            prime: self.prime,
            range,
        })
    }
}

impl Default for HashFamily {
    fn default() -> Self {
        Self::new(DEFAULT_PRIME)
    }
}
