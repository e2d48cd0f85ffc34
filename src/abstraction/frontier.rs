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

use crate::PartialSchedule;

/// This trait abstracts away the implementation details of the solver
/// frontier. That is, a Frontier represents the set of partial schedules that
/// remain to be expanded before the search can be considered finished.
///
/// # Note:
/// The solvers rely on the assumption that the frontier is explored in
/// depth-first order: `pop` must yield the most recently pushed state. This
/// is what keeps the memory footprint bounded by the depth of the search tree
/// times its branching factor rather than by its sheer breadth.
pub trait Frontier {
    /// This is how you push a state onto the frontier.
    fn push(&mut self, state: PartialSchedule);
    /// This method yields the most recently pushed state, if any.
    fn pop(&mut self) -> Option<PartialSchedule>;
    /// This method clears the frontier: it removes all pending states.
    fn clear(&mut self);
    /// Yields the number of pending states.
    fn len(&self) -> usize;
    /// Returns true iff the frontier is empty (len == 0)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
