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

//! Concurrent dynamic perfect hashing.
//!
//! [`PerfectMap`] is a thread-safe hash map with *worst-case* O(1)
//! lookup: every `get` evaluates exactly two hash functions and reads
//! exactly two buckets. It is the dynamic perfect hashing scheme of
//! [Dietzfelbinger et al.], layered as a top-level table over
//! second-level collision-free subtables, with updates running in
//! expected amortized O(1) by rebuilding a subtable (or, rarely, the
//! whole map) with freshly drawn universal hash functions.
//!
//! ```
//! let map = dphash::PerfectMap::new();
//!
//! assert!(map.insert(5, 6));
//! assert_eq!(map.get(5), Some(6));
//! assert_eq!(map.remove(5), Some(6));
//! assert_eq!(map.get(5), None);
//! ```
//!
//! [Dietzfelbinger et al.]: https://doi.org/10.1137/S0097539791194094

pub mod error;
pub mod hash;
pub mod map;
pub mod table;

mod rebuild;

pub use error::Error;
pub use map::{Config, PerfectMap};
pub use table::PerfectTable;
