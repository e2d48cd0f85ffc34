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

//! This module provides the greedy seed scheduler: a fast, deterministic,
//! non-optimal scheduler whose only job is to hand the branch-and-bound
//! search a valid upper bound before the first state is ever expanded, so
//! that the pruning rules bite from the very first step.

use std::sync::Arc;

use crate::{PartialSchedule, TaskGraph};

/// Builds a complete schedule in one pass, with no backtracking: repeatedly
/// take the lowest-id ready task and place it on whichever processor lets it
/// start earliest (ties broken by the lowest processor index). The result is
/// always a valid schedule; it is rarely an optimal one.
///
/// `nb_procs` must be at least 1.
pub fn greedy_schedule(graph: &Arc<TaskGraph>, nb_procs: usize) -> PartialSchedule {
    assert!(nb_procs >= 1);
    let mut state = PartialSchedule::new(Arc::clone(graph), nb_procs);

    while !state.is_complete() {
        let task = state
            .unscheduled()
            .find(|t| state.dependencies_satisfied(*t))
            .expect("a DAG always has a ready task while incomplete");

        let mut best_proc = 0;
        let mut best_start = state.earliest_start(task, 0);
        for proc in 1..nb_procs {
            let start = state.earliest_start(task, proc);
            if start < best_start {
                best_start = start;
                best_proc = proc;
            }
        }
        state.schedule(task, best_proc, best_start);
    }
    state
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
