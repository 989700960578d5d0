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

//! Error types.

use thiserror::Error;

/// Errors reported by the universal hash family.
///
/// Lookup misses are not errors; they are reported as `None` by [`get`].
/// Likewise a duplicate insertion is not an error; [`insert`] returns
/// `false`.
///
/// [`get`]: crate::map::PerfectMap::get
/// [`insert`]: crate::map::PerfectMap::insert
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A hash function over `[0, range)` was requested from a family whose
    /// prime cannot express it. The family requires `0 < range < prime`.
    #[error("hash range {range} is not expressible under the family prime {prime}")]
    RangeTooLarge {
        /// The requested range.
        range: u64,
        /// The prime of the family the request was made against.
        prime: u64,
    },
}
