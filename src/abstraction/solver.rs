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

//! This module defines the `Solver` trait.

use crate::Schedule;

/// This is the solver abstraction. It is implemented by the structures that
/// search the space of partial schedules for a makespan-minimal complete
/// schedule (currently the sequential branch-and-bound solver and its
/// work-stealing parallel variant).
pub trait Solver {
    /// This method orders the solver to search for the optimal schedule
    /// among all possibilities. The search always runs to completion: it
    /// either exhausts the (pruned) search space, or stops the moment a
    /// schedule matching the theoretical lower bound is found; in both
    /// cases the returned schedule is provably makespan-minimal.
    ///
    /// The *value* of the returned makespan is deterministic. The identity
    /// of the returned schedule is deterministic for the sequential solver
    /// only; when several optimal schedules exist, the parallel solver
    /// returns whichever one of them a worker happened to record first.
    fn minimize(&mut self) -> Schedule;
    /// This method returns the best schedule found so far. It returns `None`
    /// before `minimize` has run.
    fn best_schedule(&self) -> Option<Schedule>;
    /// This method returns the makespan of the best schedule found so far,
    /// or `None` before `minimize` has run.
    fn best_makespan(&self) -> Option<usize>;
    /// Returns the number of partial schedules that have been popped from
    /// the frontier and expanded so far.
    fn explored(&self) -> usize;
    /// Returns the advisory estimate of the number of naive assignments
    /// eliminated by pruning so far (see `SearchListener::on_branches_pruned`).
    fn pruned_estimate(&self) -> u128;
}
