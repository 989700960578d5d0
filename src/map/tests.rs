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

use super::*;

#[test]
fn new_map_is_empty() {
    let map: PerfectMap<i64> = PerfectMap::new();

    assert_eq!(map.len(), 0);
    assert!(map.is_empty());

    for key in 0..64 {
        assert_eq!(map.get(key), None);
        assert!(!map.contains_key(key));
    }

    map.check_invariants();
}

#[test]
fn insert_get_remove_cycle() {
    let map = PerfectMap::new();

    assert_eq!(map.len(), 0);
    assert!(map.insert(5, 6));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(5), Some(6));
    assert!(map.contains_key(5));
    assert_eq!(map.remove(5), Some(6));
    assert_eq!(map.len(), 0);
    assert_eq!(map.get(5), None);
    assert_eq!(map.remove(5), None);

    map.check_invariants();
}

#[test]
fn insertion() {
    const MAX_VALUE: u64 = 512;

    let map = PerfectMap::with_capacity(MAX_VALUE as usize);

    for i in 0..MAX_VALUE {
        assert!(map.insert(i, i));

        assert!(!map.is_empty());
        assert_eq!(map.len(), (i + 1) as usize);
    }

    map.check_invariants();

    for i in 0..MAX_VALUE {
        assert_eq!(map.get(i), Some(i));
    }

    for i in MAX_VALUE..2 * MAX_VALUE {
        assert_eq!(map.get(i), None);
    }
}

#[test]
fn growth() {
    const MAX_VALUE: u64 = 512;

    let map = PerfectMap::with_capacity(0);

    for i in 0..MAX_VALUE {
        assert!(map.insert(i, -(i as i64)));
    }

    map.check_invariants();
    assert_eq!(map.len(), MAX_VALUE as usize);

    for i in 0..MAX_VALUE {
        assert_eq!(map.get(i), Some(-(i as i64)));
    }
}

#[test]
fn duplicate_insertion_is_rejected() {
    let map = PerfectMap::new();

    assert!(map.insert(0, 0));
    assert!(!map.insert(0, 99));
    assert_eq!(map.get(0), Some(0));
    assert_eq!(map.len(), 1);

    // Fill until rebuilds have certainly happened; duplicates must still
    // be rejected without disturbing the stored value.
    for i in 1..256 {
        assert!(map.insert(i, i as i64));
    }

    assert!(!map.insert(0, 99));
    assert_eq!(map.get(0), Some(0));

    map.check_invariants();
}

#[test]
fn removal() {
    const MAX_VALUE: u64 = 512;

    let map = PerfectMap::new();

    for i in 0..MAX_VALUE {
        assert!(map.insert(i, i));
    }

    for i in 0..MAX_VALUE {
        assert_eq!(map.remove(i), Some(i));
        assert_eq!(map.len(), (MAX_VALUE - i - 1) as usize);
    }

    map.check_invariants();

    for i in 0..MAX_VALUE {
        assert_eq!(map.get(i), None);
    }

    assert!(map.is_empty());
}

#[test]
fn interleaved_inserts_and_removes_keep_invariants() {
    let map = PerfectMap::new();

    for round in 0u64..8 {
        for i in 0..128u64 {
            map.insert(i, i + round);
        }

        map.check_invariants();

        for i in (0..128u64).step_by(2) {
            assert!(map.remove(i).is_some());
        }

        map.check_invariants();

        for i in (0..128u64).step_by(2) {
            assert_eq!(map.get(i), None);
        }

        for i in (1..128u64).step_by(2) {
            assert!(map.contains_key(i));
        }

        for i in (0..128u64).step_by(2) {
            assert!(map.insert(i, i + round));
        }
    }

    assert_eq!(map.len(), 128);
    map.check_invariants();
}

#[test]
fn forced_rebuild_preserves_contents() {
    const MAX_VALUE: u64 = 256;

    let map = PerfectMap::new();

    for i in 0..MAX_VALUE {
        map.insert(i, -(i as i64));
    }

    map.rebuild();

    assert_eq!(map.len(), MAX_VALUE as usize);
    map.check_invariants();

    for i in 0..MAX_VALUE {
        assert_eq!(map.get(i), Some(-(i as i64)));
    }
}

#[test]
fn rebuild_of_an_empty_map() {
    let map: PerfectMap<i64> = PerfectMap::new();

    map.rebuild();

    assert!(map.is_empty());
    map.check_invariants();

    assert!(map.insert(1, 2));
    assert_eq!(map.get(1), Some(2));
}

#[test]
fn removal_down_to_empty_and_reuse() {
    let map = PerfectMap::new();

    // Enough updates to cross the op budget several times while
    // shrinking back to empty.
    for _ in 0..4 {
        for i in 0..64u64 {
            assert!(map.insert(i, i));
        }

        for i in 0..64u64 {
            assert_eq!(map.remove(i), Some(i));
        }

        assert!(map.is_empty());
        map.check_invariants();
    }

    assert!(map.insert(7, 7));
    assert_eq!(map.get(7), Some(7));
}

#[test]
fn clear_empties_the_map() {
    let map = PerfectMap::new();

    for i in 0..128u64 {
        map.insert(i, i);
    }

    map.clear();

    assert!(map.is_empty());
    map.check_invariants();

    for i in 0..128u64 {
        assert_eq!(map.get(i), None);
    }

    assert!(map.insert(3, 4));
    assert_eq!(map.get(3), Some(4));
}

#[test]
fn modification() {
    let map = PerfectMap::new();

    assert!(!map.modify(7, |value| *value *= 2));

    map.insert(7, 1);

    assert!(map.modify(7, |value| *value *= 2));
    assert_eq!(map.get(7), Some(2));
    assert_eq!(map.len(), 1);

    map.remove(7);

    assert!(!map.modify(7, |value| *value *= 2));

    map.check_invariants();
}

#[test]
fn get_and_applies_the_function() {
    let map = PerfectMap::new();

    map.insert(1, "one".to_owned());

    assert_eq!(map.get_and(1, |s| s.len()), Some(3));
    assert_eq!(map.get_and(2, |s: &String| s.len()), None);
}

#[test]
fn for_each_visits_a_consistent_snapshot() {
    let map = PerfectMap::new();

    for i in 0..100u64 {
        map.insert(i, i * i);
    }

    let mut visited = Vec::new();
    map.for_each(|key, &value| visited.push((key, value)));

    visited.sort_unstable();

    assert_eq!(visited.len(), 100);

    for (i, (key, value)) in visited.into_iter().enumerate() {
        assert_eq!(key, i as u64);
        assert_eq!(value, key * key);
    }
}

#[test]
fn original_reference_prime() {
    let config = Config {
        prime: 4_294_967_291,
        ..Config::default()
    };
    let map = PerfectMap::with_capacity_and_config(0, config);

    for i in 0..512u64 {
        assert!(map.insert(i, i));
    }

    map.check_invariants();

    for i in 0..512u64 {
        assert_eq!(map.get(i), Some(i));
    }
}

#[test]
fn alternate_constants() {
    let config = Config {
        growth: 1,
        top_scale: 4,
        ..Config::default()
    };
    let map = PerfectMap::with_capacity_and_config(16, config);

    for i in 0..256u64 {
        assert!(map.insert(i, i));
    }

    for i in (0..256u64).step_by(3) {
        assert!(map.remove(i).is_some());
    }

    map.check_invariants();
}

#[test]
#[should_panic]
fn growth_constant_below_one_is_refused() {
    let config = Config {
        growth: 0,
        ..Config::default()
    };

    let _ = PerfectMap::<i64>::with_capacity_and_config(0, config);
}

#[test]
#[should_panic]
fn keys_outside_the_universe_are_refused() {
    let config = Config {
        prime: 101,
        ..Config::default()
    };
    let map = PerfectMap::with_capacity_and_config(0, config);

    map.insert(500, 0);
}

#[test]
fn default_map_is_usable() {
    let map: PerfectMap<u64> = Default::default();

    assert!(map.insert(1, 1));
    assert_eq!(map.len(), 1);
}
