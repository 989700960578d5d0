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

//! A single-level perfect hash table.

use rand::thread_rng;

use crate::hash::{HashFamily, UniversalHash};
use crate::rebuild::{self, sampled};

/// The bucket array size for a table of the given capacity, `2m(m − 1)`.
///
/// A quadratically sized array is what lets a uniformly drawn universal
/// hash function be collision-free with probability at least 1/2.
pub(crate) fn buckets_for_capacity(capacity: usize) -> usize {
    2 * capacity * (capacity - 1)
}

/// The capacity a table should have to hold `pairs` pairs, `2·max(1, n)`.
pub(crate) fn capacity_for_pairs(pairs: usize) -> usize {
    2 * pairs.max(1)
}

/// Doubles `capacity` until it holds `pairs` pairs.
pub(crate) fn grown_capacity(capacity: usize, pairs: usize) -> usize {
    let mut capacity = capacity;

    while pairs > capacity {
        capacity *= 2;
    }

    capacity
}

/// A hash table whose current hash function is collision-free over its
/// live keys.
///
/// Lookups execute exactly one hash evaluation and one bucket probe.
/// Inserting a colliding or over-capacity pair triggers a local rebuild:
/// the table redraws hash functions from its family until one is
/// injective over the live keys plus the new one, doubling its capacity
/// first if the pair count demands it. Erasure never shrinks the table.
///
/// Keys must lie in `[0, P)` for the family prime `P`; insertion asserts
/// this, as keys at or above the prime alias with smaller keys and would
/// make a collision-free function unfindable.
pub struct PerfectTable<V> {
    buckets: Vec<Option<(u64, V)>>,
    hash: UniversalHash,
    family: HashFamily,
    len: usize,
    capacity: usize,
}

impl<V> PerfectTable<V> {
    /// Creates an empty table sized to hold at least `pairs_hint` pairs,
    /// using the default hash family.
    pub fn new(pairs_hint: usize) -> Self {
        Self::with_family(pairs_hint, HashFamily::default())
    }

    /// Creates an empty table sized to hold at least `pairs_hint` pairs.
    ///
    /// # Panics
    ///
    /// Panics if the implied bucket array size is not expressible under
    /// the family prime.
    pub fn with_family(pairs_hint: usize, family: HashFamily) -> Self {
        let capacity = capacity_for_pairs(pairs_hint);
        let buckets = buckets_for_capacity(capacity);
        let hash = sampled(family.new_hash(buckets as u64, &mut thread_rng()));

        let mut table = Vec::new();
        table.resize_with(buckets, || None);

        Self {
            buckets: table,
            hash,
            family,
            len: 0,
            capacity,
        }
    }

    /// Builds a table from a list of pairs.
    ///
    /// The keys must be distinct; a duplicate would make the perfection
    /// sampler diverge. Callers that cannot guarantee distinctness should
    /// insert pair by pair instead.
    ///
    /// # Panics
    ///
    /// Panics if the implied bucket array size is not expressible under
    /// the family prime.
    pub fn from_pairs(pairs: Vec<(u64, V)>, family: HashFamily) -> Self {
        debug_assert!({
            let mut keys: Vec<u64> = pairs.iter().map(|(key, _)| *key).collect();
            keys.sort_unstable();
            keys.windows(2).all(|pair| pair[0] != pair[1])
        });

        let capacity = capacity_for_pairs(pairs.len());
        let buckets = buckets_for_capacity(capacity);
        let keys: Vec<u64> = pairs.iter().map(|(key, _)| *key).collect();
        let hash = sampled(rebuild::find_perfect_hash(
            &keys,
            buckets as u64,
            family,
            &mut thread_rng(),
        ));

        let mut table = Vec::new();
        table.resize_with(buckets, || None);

        let mut this = Self {
            buckets: table,
            hash,
            family,
            len: pairs.len(),
            capacity,
        };

        for (key, value) in pairs {
            let index = this.hash.index(key);
            debug_assert!(this.buckets[index].is_none());
            this.buckets[index] = Some((key, value));
        }

        this
    }

    /// The number of pairs in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of pairs the table can hold without rebuilding.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The size of the bucket array, `2m(m − 1)` for capacity `m`.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The family this table draws hash functions from.
    pub fn family(&self) -> HashFamily {
        self.family
    }

    /// Returns a reference to the value stored under `key`, if any.
    pub fn get(&self, key: u64) -> Option<&V> {
        match &self.buckets[self.hash.index(key)] {
            Some((stored, value)) if *stored == key => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value stored under `key`, if
    /// any.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        match &mut self.buckets[self.hash.index(key)] {
            Some((stored, value)) if *stored == key => Some(value),
            _ => None,
        }
    }

    /// Whether a pair with the given key is present.
    pub fn contains_key(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a pair, returning `true` iff it was actually stored.
    ///
    /// A pair whose key is already present is rejected without touching
    /// the table, even when an insertion would otherwise have triggered a
    /// rebuild.
    ///
    /// # Panics
    ///
    /// Panics if `key` is at or above the family prime, or if a required
    /// rebuild would need a bucket range the prime cannot express.
    pub fn insert(&mut self, key: u64, value: V) -> bool {
        assert!(
            key < self.family.prime(),
            "key {} is outside the hash universe [0, {})",
            key,
            self.family.prime()
        );

        if self.contains_key(key) {
            return false;
        }

        let index = self.hash.index(key);

        if self.len + 1 > self.capacity || self.buckets[index].is_some() {
            let capacity = grown_capacity(self.capacity, self.len + 1);
            sampled(self.family.check_range(buckets_for_capacity(capacity) as u64));

            self.len += 1;
            self.rebuild_with(Some((key, value)));
        } else {
            self.len += 1;
            self.buckets[index] = Some((key, value));
        }

        true
    }

    /// Removes the pair stored under `key`, returning its value.
    ///
    /// The capacity, hash function, and bucket array are kept; erasure
    /// never shrinks a table.
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let index = self.hash.index(key);

        let hit = matches!(&self.buckets[index], Some((stored, _)) if *stored == key);

        if !hit {
            return None;
        }

        self.len -= 1;

        self.buckets[index].take().map(|(_, value)| value)
    }

    /// Grows the table to hold at least `pairs` pairs, rebuilding if the
    /// capacity actually increased. The capacity never shrinks.
    ///
    /// # Panics
    ///
    /// Panics if the implied bucket array size is not expressible under
    /// the family prime.
    pub fn reserve(&mut self, pairs: usize) {
        let capacity = capacity_for_pairs(pairs);

        if capacity > self.capacity {
            sampled(self.family.check_range(buckets_for_capacity(capacity) as u64));

            self.capacity = capacity;
            self.rebuild_with(None);
        }
    }

    /// Removes every pair without shrinking the bucket array.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = None;
        }

        self.len = 0;
    }

    /// Iterates over the live pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &V)> + '_ {
        self.buckets
            .iter()
            .filter_map(|bucket| bucket.as_ref().map(|(key, value)| (*key, value)))
    }

    /// Moves every live pair into `out`, leaving the table empty but
    /// keeping its capacity and bucket array.
    pub(crate) fn drain_into(&mut self, out: &mut Vec<(u64, V)>) {
        for bucket in self.buckets.iter_mut() {
            if let Some(pair) = bucket.take() {
                out.push(pair);
            }
        }

        self.len = 0;
    }

    /// Redraws the hash function and re-places every live pair, first
    /// doubling the capacity until the pair count fits. `new_pair`, if
    /// present, is already counted in `len`.
    fn rebuild_with(&mut self, new_pair: Option<(u64, V)>) {
        self.capacity = grown_capacity(self.capacity, self.len);
        let buckets = buckets_for_capacity(self.capacity);

        let mut pairs = Vec::with_capacity(self.len);
        for bucket in self.buckets.iter_mut() {
            if let Some(pair) = bucket.take() {
                pairs.push(pair);
            }
        }
        pairs.extend(new_pair);

        let keys: Vec<u64> = pairs.iter().map(|(key, _)| *key).collect();
        self.hash = sampled(rebuild::find_perfect_hash(
            &keys,
            buckets as u64,
            self.family,
            &mut thread_rng(),
        ));

        self.buckets.resize_with(buckets, || None);

        for (key, value) in pairs {
            let index = self.hash.index(key);
            debug_assert!(self.buckets[index].is_none());
            self.buckets[index] = Some((key, value));
        }
    }

    /// Asserts the table's structural invariants: the bucket array is
    /// quadratic in the capacity, the pair count matches, the capacity is
    /// not exceeded, and every live pair sits in the bucket its key
    /// hashes to (which makes the hash collision-free over live keys).
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        assert_eq!(self.buckets.len(), buckets_for_capacity(self.capacity));
        assert!(self.len <= self.capacity);

        let mut live = 0;

        for (index, bucket) in self.buckets.iter().enumerate() {
            if let Some((key, _)) = bucket {
                assert_eq!(self.hash.index(*key), index);
                live += 1;
            }
        }

        assert_eq!(live, self.len);
    }
}
