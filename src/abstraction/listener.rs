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

//! This module defines the `SearchListener` trait: the one outward-facing
//! interface of the search core. Whatever consumes the solver's progress (a
//! file writer, a progress display, a test harness) implements it and gets
//! notified as the search advances.

use crate::Schedule;

/// The callbacks a search reports its progress through.
///
/// The methods take `&self`: a listener that records what it sees uses
/// interior mutability. The parallel solver invokes the callbacks from worker
/// threads while holding its internal lock, so implementations must be quick
/// and must not call back into the solver.
pub trait SearchListener {
    /// Invoked every time a strictly better complete schedule is found. This
    /// fires at least once (with the greedy seed schedule, before any
    /// branching) and the reported makespans are strictly decreasing.
    fn on_new_optimal(&self, schedule: &Schedule);
    /// Invoked exactly once, with the final (provably optimal) schedule,
    /// when the search terminates.
    fn on_completed(&self, schedule: &Schedule);
    /// Advisory progress signal: the monotonically non-decreasing estimate of
    /// how many naive assignments the pruning rules have eliminated so far.
    /// The default implementation ignores it.
    fn on_branches_pruned(&self, _total: u128) {}
}

/// A listener that ignores every notification. Handy whenever only the
/// return value of the solver is of interest.
#[derive(Debug, Default, Copy, Clone)]
pub struct SilentListener;
impl SearchListener for SilentListener {
    fn on_new_optimal(&self, _schedule: &Schedule) {}
    fn on_completed(&self, _schedule: &Schedule) {}
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
