// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the branch-and-bound solver implementations: the
//! single-threaded depth-first solver and its work-stealing parallel variant.

mod parallel;
mod sequential;

pub use parallel::*;
pub use sequential::*;

/// The number of naive assignments one single cut of the search tree stands
/// for: with `remaining` tasks still unscheduled at the point of the cut,
/// `nb_procs ^ remaining * remaining! * factor` complete assignments are
/// eliminated at once. The count saturates instead of wrapping: for any
/// graph large enough to overflow 128 bits the signal is advisory anyway,
/// and saturation keeps it monotonic.
pub(crate) fn cut_estimate(nb_procs: usize, remaining: usize, factor: usize) -> u128 {
    let mut estimate = factor as u128;
    for _ in 0..remaining {
        estimate = estimate.saturating_mul(nb_procs as u128);
    }
    for n in 2..=remaining {
        estimate = estimate.saturating_mul(n as u128);
    }
    estimate
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
