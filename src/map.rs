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

//! A concurrent dynamic perfect hash map.

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use rand::thread_rng;

use crate::hash::{HashFamily, UniversalHash, DEFAULT_PRIME};
use crate::rebuild::{self, sampled};
use crate::table::{self, PerfectTable};

#[cfg(test)]
mod tests;

/// Tuning constants, fixed at construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// The threshold growth constant `c` in `M = (1 + c)·max(n, 4)`.
    /// Must be at least 1.
    pub growth: usize,

    /// The top-level scaling constant `κ` in `s(M) = κ·M`. Must be at
    /// least 1; the linear-space analysis of Dietzfelbinger et al. wants
    /// `κ ≥ 8√30/15 ≈ 2.921`.
    pub top_scale: usize,

    /// The prime `P` shared by every hash function the map draws. Must
    /// exceed every bucket range the map will request, and bounds the
    /// key universe to `[0, P)`.
    pub prime: u64,
}

impl Config {
    fn validate(&self) {
        assert!(self.growth >= 1, "growth constant must be at least 1");
        assert!(self.top_scale >= 1, "top-level scale must be at least 1");
        assert!(self.prime > 1, "hash family prime must be greater than 1");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            growth: 2,
            top_scale: 3,
            prime: DEFAULT_PRIME,
        }
    }
}

/// A concurrent hash map with worst-case O(1) lookup, implemented with
/// dynamic perfect hashing.
///
/// The map is the two-level scheme of Dietzfelbinger, Karlin, Mehlhorn,
/// Meyer auf der Heide, Rohnert, and Tarjan: a top-level hash partitions
/// keys across [`PerfectTable`] subtables, each of which keeps a
/// collision-free hash over a quadratically sized bucket array. Every
/// lookup evaluates exactly two hash functions and probes exactly two
/// buckets, no matter how many pairs the map holds or how it got there.
///
/// Inserts and erasures are expected amortized O(1). An insert that
/// collides inside its subtable rebuilds just that subtable; an insert
/// that would break the global space-balance criterion, or the
/// `(1 + c)·max(n, 4)`-th update since the last full rebuild, rebuilds
/// the whole map.
///
/// Reads run concurrently under a shared lock. Writers take the lock in
/// its upgradeable mode, so the duplicate/presence check runs alongside
/// readers and only the actual mutation excludes them. Full rebuilds hold
/// the lock exclusively, so a reader never observes a partially rebuilt
/// map.
///
/// Keys are `u64` values drawn from `[0, P)` for the configured family
/// prime `P`. The hash functions are affine maps modulo `P`, so the key
/// itself is the hash input; funneling keys through a general-purpose
/// hasher first could identify two live keys and make a collision-free
/// subtable function unfindable.
pub struct PerfectMap<V> {
    state: RwLock<State<V>>,
}

struct State<V> {
    slots: Vec<Option<PerfectTable<V>>>,
    hash: UniversalHash,
    len: usize,
    ops: usize,
    threshold: usize,
    buckets_total: usize,
    family: HashFamily,
    growth: usize,
    top_scale: usize,
}

impl<V> PerfectMap<V> {
    /// Creates an empty map with the default configuration.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map sized for at least `pairs_hint` pairs.
    pub fn with_capacity(pairs_hint: usize) -> Self {
        Self::with_capacity_and_config(pairs_hint, Config::default())
    }

    /// Creates an empty map sized for at least `pairs_hint` pairs, with
    /// the given constants.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid or the implied top-level
    /// range is not expressible under the configured prime.
    pub fn with_capacity_and_config(pairs_hint: usize, config: Config) -> Self {
        config.validate();

        let family = HashFamily::new(config.prime);
        let threshold = (1 + config.growth) * pairs_hint.max(4);
        let slot_count = config.top_scale * threshold;
        let hash = sampled(family.new_hash(slot_count as u64, &mut thread_rng()));

        let mut slots = Vec::new();
        slots.resize_with(slot_count, || None);

        Self {
            state: RwLock::new(State {
                slots,
                hash,
                len: 0,
                ops: 0,
                threshold,
                buckets_total: 0,
                family,
                growth: config.growth,
                top_scale: config.top_scale,
            }),
        }
    }

    /// The number of pairs in the map.
    pub fn len(&self) -> usize {
        self.state.read().len
    }

    /// Whether the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a pair with the given key is present.
    pub fn contains_key(&self, key: u64) -> bool {
        let state = self.state.read();

        state
            .subtable(key)
            .map_or(false, |table| table.contains_key(key))
    }

    /// Returns a clone of the value stored under `key`, if any.
    pub fn get(&self, key: u64) -> Option<V>
    where
        V: Clone,
    {
        self.get_and(key, V::clone)
    }

    /// Applies `func` to the value stored under `key`, if any, and
    /// returns the result. This is the access path for values that are
    /// expensive or impossible to clone.
    pub fn get_and<F: FnOnce(&V) -> T, T>(&self, key: u64, func: F) -> Option<T> {
        let state = self.state.read();

        state.subtable(key).and_then(|table| table.get(key)).map(func)
    }

    /// Calls `func` on every pair under one shared-lock acquisition, so
    /// the pairs visited form a consistent snapshot of the map.
    pub fn for_each<F: FnMut(u64, &V)>(&self, mut func: F) {
        let state = self.state.read();

        for table in state.slots.iter().flatten() {
            for (key, value) in table.iter() {
                func(key, value);
            }
        }
    }

    /// Inserts a pair, returning `true` iff it was actually stored.
    ///
    /// A pair whose key is already present is rejected without touching
    /// the map. The duplicate check runs under the upgradeable lock mode,
    /// concurrently with readers; the lock is upgraded only once the
    /// insertion is known to go ahead.
    ///
    /// # Panics
    ///
    /// Panics if `key` is at or above the configured family prime.
    pub fn insert(&self, key: u64, value: V) -> bool {
        let state = self.state.upgradable_read();

        assert!(
            key < state.family.prime(),
            "key {} is outside the hash universe [0, {})",
            key,
            state.family.prime()
        );

        if state
            .subtable(key)
            .map_or(false, |table| table.contains_key(key))
        {
            return false;
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        state.insert_new(key, value);

        true
    }

    /// Applies `func` to the value stored under `key` in place,
    /// returning whether the key was present.
    ///
    /// Modification does not count against the rebuild budget; only
    /// inserts and removals do.
    pub fn modify<F: FnOnce(&mut V)>(&self, key: u64, func: F) -> bool {
        let state = self.state.upgradable_read();

        if !state
            .subtable(key)
            .map_or(false, |table| table.contains_key(key))
        {
            return false;
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);

        state.modify_present(key, func)
    }

    /// Removes the pair stored under `key`, returning its value.
    ///
    /// The presence check runs under the upgradeable lock mode; removal
    /// of an absent key never excludes readers.
    pub fn remove(&self, key: u64) -> Option<V> {
        let state = self.state.upgradable_read();

        if !state
            .subtable(key)
            .map_or(false, |table| table.contains_key(key))
        {
            return None;
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);

        state.remove_present(key)
    }

    /// Rebuilds both levels from scratch: a fresh top-level hash chosen
    /// for balance, then a fresh collision-free hash for every subtable.
    pub fn rebuild(&self) {
        self.state.write().full_rebuild(None);
    }

    /// Removes every pair, keeping the current top-level shape.
    pub fn clear(&self) {
        self.state.write().reset_empty();
    }

    /// Asserts the structural invariants of both levels. Intended for
    /// tests; takes the shared lock.
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        let state = self.state.read();

        assert_eq!(state.slots.len(), state.top_scale * state.threshold);
        assert!(state.ops <= state.threshold);

        let mut total_pairs = 0;
        let mut total_buckets = 0;

        for (index, slot) in state.slots.iter().enumerate() {
            if let Some(table) = slot {
                table.check_invariants();

                for (key, _) in table.iter() {
                    assert_eq!(state.hash.index(key), index);
                }

                total_pairs += table.len();
                total_buckets += table.bucket_count();
            }
        }

        assert_eq!(total_pairs, state.len);
        assert_eq!(total_buckets, state.buckets_total);
        assert!(rebuild::is_balanced(
            total_buckets as u128,
            state.threshold as u64,
            state.slots.len() as u64,
        ));
    }
}

impl<V> Default for PerfectMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> State<V> {
    fn subtable(&self, key: u64) -> Option<&PerfectTable<V>> {
        self.slots[self.hash.index(key)].as_ref()
    }

    /// Stores a pair whose key is known to be absent.
    fn insert_new(&mut self, key: u64, value: V) {
        self.len += 1;
        self.ops += 1;

        if self.ops > self.threshold {
            self.full_rebuild(Some((key, value)));
            return;
        }

        let index = self.hash.index(key);

        if self.slots[index].is_none() {
            let table = PerfectTable::with_family(0, self.family);
            self.buckets_total += table.bucket_count();
            self.slots[index] = Some(table);
        }

        let threshold = self.threshold;
        let slot_count = self.slots.len();
        let buckets_total = self.buckets_total;

        if let Some(table) = &mut self.slots[index] {
            if table.len() + 1 <= table.capacity() {
                // Within capacity: a collision here at most redraws the
                // subtable hash at the same size, so no sⱼ grows.
                table.insert(key, value);
                return;
            }

            // Over capacity: the subtable would double. Admit the growth
            // only if the balance criterion survives it.
            let capacity = table::grown_capacity(table.capacity(), table.len() + 1);
            let grown = table::buckets_for_capacity(capacity);
            let hypothetical = buckets_total - table.bucket_count() + grown;

            if rebuild::is_balanced(hypothetical as u128, threshold as u64, slot_count as u64) {
                let before = table.bucket_count();
                table.insert(key, value);
                let after = table.bucket_count();

                self.buckets_total += after - before;
                return;
            }
        }

        self.full_rebuild(Some((key, value)));
    }

    /// Mutates the value of a pair known to be present.
    fn modify_present<F: FnOnce(&mut V)>(&mut self, key: u64, func: F) -> bool {
        let index = self.hash.index(key);

        match &mut self.slots[index] {
            Some(table) => match table.get_mut(key) {
                Some(value) => {
                    func(value);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Removes a pair known to be present.
    fn remove_present(&mut self, key: u64) -> Option<V> {
        let index = self.hash.index(key);

        let value = match &mut self.slots[index] {
            Some(table) => table.remove(key),
            None => None,
        };

        if value.is_some() {
            self.len -= 1;
            self.ops += 1;

            if self.ops >= self.threshold {
                self.full_rebuild(None);
            }
        }

        value
    }

    /// Rebuilds both levels around the current pairs plus `extra`.
    /// `extra`, if present, is already counted in `len`.
    fn full_rebuild(&mut self, extra: Option<(u64, V)>) {
        let threshold = (1 + self.growth) * self.len.max(4);
        let slot_count = self.top_scale * threshold;
        sampled(self.family.check_range(slot_count as u64));

        let mut pairs = Vec::with_capacity(self.len);
        for table in self.slots.iter_mut().flatten() {
            table.drain_into(&mut pairs);
        }
        pairs.extend(extra);

        if pairs.is_empty() {
            self.reset_empty();
            return;
        }

        debug_assert_eq!(pairs.len(), self.len);

        self.threshold = threshold;
        self.slots.resize_with(slot_count, || None);

        let keys: Vec<u64> = pairs.iter().map(|(key, _)| *key).collect();
        let (hash, counts) = sampled(rebuild::find_balanced_hash(
            &keys,
            slot_count as u64,
            threshold as u64,
            self.family,
            &mut thread_rng(),
        ));
        self.hash = hash;

        // Recycle subtables whose capacity matches their new load; free
        // the rest so every live subtable ends at m = 2·max(1, d).
        let mut buckets_total = 0;

        for (slot, &count) in self.slots.iter_mut().zip(&counts) {
            if count == 0 {
                *slot = None;
                continue;
            }

            let wanted = table::capacity_for_pairs(count);

            match slot {
                Some(table) if table.capacity() <= wanted => {
                    table.clear();
                    table.reserve(count);
                }
                _ => *slot = Some(PerfectTable::with_family(count, self.family)),
            }

            if let Some(table) = slot {
                buckets_total += table.bucket_count();
            }
        }

        for (key, value) in pairs {
            let index = self.hash.index(key);

            if let Some(table) = &mut self.slots[index] {
                let before = table.bucket_count();
                table.insert(key, value);
                buckets_total += table.bucket_count() - before;
            }
        }

        self.buckets_total = buckets_total;
        self.ops = 0;
    }

    /// Resets to the empty shape for the current threshold: every slot
    /// freed and a fresh top-level hash, with the slot array kept.
    fn reset_empty(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }

        self.hash = sampled(
            self.family
                .new_hash(self.slots.len() as u64, &mut thread_rng()),
        );
        self.len = 0;
        self.ops = 0;
        self.buckets_total = 0;
    }
}
