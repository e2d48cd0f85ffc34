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

//! # OPTSCHED
//! OPTSCHED is an exact solver for the classic multiprocessor scheduling
//! problem with communication delays: given a weighted DAG of tasks and a
//! number of identical processors, find the assignment of every task to a
//! processor and a start time that minimizes the makespan (the finish time
//! of the last task) while respecting every precedence edge and paying the
//! edge's communication cost whenever producer and consumer run on different
//! processors. The problem is NP-hard; this crate attacks it with a
//! depth-first branch-and-bound search that is seeded by a greedy schedule,
//! prunes with per-task critical-path lower bounds, eliminates duplicate and
//! processor-symmetric states, and optionally spreads the exploration over a
//! pool of work-stealing worker threads. The result is *provably* optimal:
//! the search either exhausts the pruned space or stops early once some
//! schedule matches the theoretical lower bound.
//!
//! ## Quick Example
//! The following solves a five-task instance on two processors. Task `d`
//! needs both `a` and `b`; shipping either result across processors costs
//! one extra time unit.
//!
//! ```
//! # use std::sync::Arc;
//! use optsched::*;
//!
//! // 1. Describe the task graph: each task with its duration, each
//! //    precedence edge with its communication cost.
//! let graph = Arc::new(TaskGraph::builder()
//!     .add_task("a", 2)
//!     .add_task("b", 3)
//!     .add_task("c", 1)
//!     .add_task("d", 2)
//!     .add_task("e", 1)
//!     .add_edge("a", "c", 1)
//!     .add_edge("a", "d", 1)
//!     .add_edge("b", "d", 1)
//!     .add_edge("c", "e", 1)
//!     .add_edge("d", "e", 1)
//!     .build()
//!     .expect("this graph is a well-formed DAG"));
//!
//! // 2. Decide who gets told about the progress of the search. The
//! //    `SilentListener` ignores everything; implement `SearchListener`
//! //    yourself to stream improving schedules somewhere useful.
//! let listener = SilentListener;
//!
//! // 3. Instantiate the solver for a two-processor machine and minimize.
//! let mut frontier = LifoFrontier::new();
//! let mut solver = SequentialSolver::new(graph, 2, &listener, &mut frontier)
//!     .expect("two processors is a valid configuration");
//! let schedule = solver.minimize();
//!
//! // 4. Do whatever you like with the optimal schedule.
//! assert_eq!(6, schedule.makespan());
//! for assignment in schedule.assignments() {
//!     println!("task {:?} -> processor {} at t={}",
//!         assignment.task, assignment.processor, assignment.start);
//! }
//! ```
//!
//! To use every core of the machine instead, swap step 3 for the
//! work-stealing variant: same search, same guaranteed makespan.
//!
//! ```
//! # use std::sync::Arc;
//! # use optsched::*;
//! # let graph = Arc::new(TaskGraph::builder().add_task("a", 2).build().unwrap());
//! let listener = SilentListener;
//! let mut solver = ParallelSolver::new(graph, 2, &listener).unwrap();
//! let schedule = solver.minimize();
//! # assert_eq!(2, schedule.makespan());
//! ```
//!
//! ## Getting a grasp on the codebase
//! The `graph` module defines the immutable `TaskGraph` every search works
//! against (including the precomputed per-task lower bounds), and `state`
//! defines the `PartialSchedule` the search trees are made of. The
//! `abstraction` module holds the small trait surface (`Solver`,
//! `SearchListener`, `Frontier`) and `implementation` everything concrete:
//! the solvers, the greedy seed and the two naive reference schedulers the
//! test-suite cross-checks optimality against.

mod abstraction;
mod common;
mod graph;
mod implementation;
mod state;

#[cfg(test)]
mod test_utils;

pub use abstraction::*;
pub use common::*;
pub use graph::*;
pub use implementation::*;
pub use state::*;
