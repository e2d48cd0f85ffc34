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

//! This module provides the two reference schedulers that bracket the branch
//! and bound solvers: a trivial single-processor scheduler, and an exhaustive
//! depth-first enumeration with no pruning at all. Neither is meant for real
//! workloads; the exhaustive one is the oracle the optimality tests check
//! the solvers against, and blows up factorially with the task count.

use std::sync::Arc;

use crate::{PartialSchedule, Schedule, TaskGraph, TaskId};

/// Schedules every task on processor 0, in dependency order (lowest ready id
/// first). The resulting makespan is simply the sum of all task weights; no
/// communication cost is ever paid.
pub fn single_processor_schedule(graph: &Arc<TaskGraph>) -> Schedule {
    let mut state = PartialSchedule::new(Arc::clone(graph), 1);
    while !state.is_complete() {
        let task = state
            .unscheduled()
            .find(|t| state.dependencies_satisfied(*t))
            .expect("a DAG always has a ready task while incomplete");
        let start = state.earliest_start(task, 0);
        state.schedule(task, 0, start);
    }
    state.to_schedule()
}

/// Tries every possible assignment of ready tasks to processors, depth first
/// and without any bounding, and keeps the best complete schedule seen.
/// `nb_procs` must be at least 1.
pub fn exhaustive_schedule(graph: &Arc<TaskGraph>, nb_procs: usize) -> Schedule {
    assert!(nb_procs >= 1);
    let mut best: Option<Schedule> = None;
    let mut stack = vec![PartialSchedule::new(Arc::clone(graph), nb_procs)];

    while let Some(state) = stack.pop() {
        if state.is_complete() {
            if best.as_ref().map_or(true, |b| state.makespan() < b.makespan()) {
                best = Some(state.to_schedule());
            }
            continue;
        }
        let ready: Vec<TaskId> = state
            .unscheduled()
            .filter(|t| state.dependencies_satisfied(*t))
            .collect();
        for task in ready {
            for proc in 0..state.nb_processors() {
                let mut child = state.clone();
                let start = child.earliest_start(task, proc);
                child.schedule(task, proc, start);
                stack.push(child);
            }
        }
    }
    best.expect("a non-empty DAG admits at least one schedule")
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
