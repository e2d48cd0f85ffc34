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

//! This module provides the implementation of a simple LIFO solver frontier.

use crate::{Frontier, PartialSchedule};

/// The simplest frontier implementation you can think of: it basically
/// consists of a stack that pushes and pops partial schedules in LIFO order,
/// which is exactly the depth-first discipline the solvers require.
///
/// # Note
/// This is the frontier used by the sequential solver. The parallel solver
/// keeps one double-ended queue per worker instead, because work stealing
/// needs access to both ends.
#[derive(Debug, Default)]
pub struct LifoFrontier {
    stack: Vec<PartialSchedule>,
}

impl LifoFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for LifoFrontier {
    fn push(&mut self, state: PartialSchedule) {
        self.stack.push(state)
    }

    fn pop(&mut self) -> Option<PartialSchedule> {
        self.stack.pop()
    }

    fn clear(&mut self) {
        self.stack.clear()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_lifo_frontier {
    use std::sync::Arc;

    use crate::{Frontier, LifoFrontier, PartialSchedule, TaskGraph, TaskId};

    fn some_state(mark: usize) -> PartialSchedule {
        let graph = Arc::new(
            TaskGraph::builder()
                .add_task("a", 1)
                .add_task("b", 1)
                .add_task("c", 1)
                .build()
                .unwrap(),
        );
        let mut state = PartialSchedule::new(graph, 3);
        state.schedule(TaskId(mark), 0, 0);
        state
    }

    #[test]
    fn by_default_it_is_empty() {
        let frontier = LifoFrontier::new();
        assert!(frontier.is_empty());
        assert_eq!(0, frontier.len());
    }

    #[test]
    fn pushing_increases_the_length() {
        let mut frontier = LifoFrontier::new();
        frontier.push(some_state(0));
        assert_eq!(1, frontier.len());
        frontier.push(some_state(1));
        assert_eq!(2, frontier.len());
    }

    #[test]
    fn popping_an_empty_frontier_yields_none() {
        let mut frontier = LifoFrontier::new();
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn pop_yields_the_most_recently_pushed_state() {
        let mut frontier = LifoFrontier::new();
        frontier.push(some_state(0));
        frontier.push(some_state(1));
        frontier.push(some_state(2));

        assert_eq!(Some(TaskId(2)), frontier.pop().unwrap().first_scheduled());
        assert_eq!(Some(TaskId(1)), frontier.pop().unwrap().first_scheduled());
        assert_eq!(Some(TaskId(0)), frontier.pop().unwrap().first_scheduled());
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let mut frontier = LifoFrontier::new();
        frontier.push(some_state(0));
        frontier.push(some_state(1));
        assert!(!frontier.is_empty());
        frontier.clear();
        assert!(frontier.is_empty());
    }
}
