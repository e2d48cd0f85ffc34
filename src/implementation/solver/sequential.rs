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

//! This module provides the implementation of the sequential branch-and-bound
//! solver. That is, a solver that explores the space of partial schedules
//! depth first using one single thread of execution, pruning every branch
//! that provably cannot beat the best complete schedule known so far.

use std::sync::Arc;

use fxhash::FxHashSet;
use log::debug;

use super::cut_estimate;
use crate::{
    Frontier, InvalidProcessorCount, PartialSchedule, Schedule, SearchListener, Solver, TaskGraph,
    TaskId, greedy_schedule,
};

/// This is the structure implementing the single-threaded branch-and-bound
/// scheduler.
///
/// # Example Usage
/// ```
/// # use std::sync::Arc;
/// # use optsched::*;
/// let graph = Arc::new(TaskGraph::builder()
///     .add_task("a", 2)
///     .add_task("b", 3)
///     .add_edge("a", "b", 1)
///     .build()
///     .unwrap());
///
/// let listener = SilentListener;
/// let mut frontier = LifoFrontier::new();
/// let mut solver = SequentialSolver::new(graph, 2, &listener, &mut frontier).unwrap();
///
/// let schedule = solver.minimize();
/// assert_eq!(5, schedule.makespan());
/// ```
pub struct SequentialSolver<'a> {
    /// The graph being scheduled; shared with every state of the search.
    graph: Arc<TaskGraph>,
    /// The number of identical processors to schedule onto.
    nb_procs: usize,
    /// Whoever consumes the progress of this search.
    listener: &'a dyn SearchListener,
    /// The set of partial schedules that remain to be expanded. The solver
    /// relies on its LIFO discipline to keep the memory footprint bounded by
    /// the search depth rather than by its breadth.
    frontier: &'a mut dyn Frontier,
    /// The fingerprints of every state ever pushed. A candidate child whose
    /// fingerprint is already recorded here is a duplicate of an explored
    /// branch, possibly with permuted processor labels, and is dropped.
    seen: FxHashSet<String>,
    /// The makespan of the best complete schedule found so far. Candidate
    /// branches must beat this value strictly to stay alive.
    best_makespan: usize,
    /// If set, the best complete schedule found so far.
    best_schedule: Option<Schedule>,
    /// This is a counter that tracks the number of states that have
    /// effectively been popped from the frontier and expanded.
    explored: usize,
    /// The running estimate of how many naive assignments pruning has
    /// eliminated (see `cut_estimate`).
    pruned: u128,
}

impl<'a> SequentialSolver<'a> {
    pub fn new(
        graph: Arc<TaskGraph>,
        nb_procs: usize,
        listener: &'a dyn SearchListener,
        frontier: &'a mut dyn Frontier,
    ) -> Result<Self, InvalidProcessorCount> {
        if nb_procs < 1 {
            return Err(InvalidProcessorCount(nb_procs));
        }
        Ok(SequentialSolver {
            graph,
            nb_procs,
            listener,
            frontier,
            seen: FxHashSet::default(),
            best_makespan: usize::MAX,
            best_schedule: None,
            explored: 0,
            pruned: 0,
        })
    }

    /// This method initializes the resolution: it installs the greedy seed
    /// schedule as the incumbent (which is what lets the very first bound
    /// checks prune anything at all) and posts the empty root state onto the
    /// frontier.
    fn initialize(&mut self) {
        self.seen.clear();
        self.explored = 0;
        self.pruned = 0;

        let seed = greedy_schedule(&self.graph, self.nb_procs);
        self.seen.insert(seed.fingerprint());
        let seed = seed.to_schedule();
        self.best_makespan = seed.makespan();
        debug!("greedy seed makespan {}", seed.makespan());
        self.listener.on_new_optimal(&seed);
        self.listener.on_branches_pruned(self.pruned);
        self.best_schedule = Some(seed);

        self.frontier.clear();
        self.frontier
            .push(PartialSchedule::new(Arc::clone(&self.graph), self.nb_procs));
    }

    /// Accounts for one cut of the search tree in the advisory progress
    /// estimate.
    fn cut(&mut self, remaining: usize, factor: usize) {
        self.pruned = self
            .pruned
            .saturating_add(cut_estimate(self.nb_procs, remaining, factor));
    }

    /// Installs a strictly better complete state as the incumbent and
    /// notifies the listener.
    fn record_best(&mut self, state: &PartialSchedule) {
        let schedule = state.to_schedule();
        self.best_makespan = schedule.makespan();
        debug!(
            "new best makespan {} ({} states explored)",
            schedule.makespan(),
            self.explored
        );
        self.listener.on_new_optimal(&schedule);
        self.listener.on_branches_pruned(self.pruned);
        self.best_schedule = Some(schedule);
    }

    /// This method processes one state popped off the frontier: either it is
    /// discarded by the incumbent bound, or it is a new (necessarily better)
    /// complete schedule, or its children are generated subject to the
    /// bound, duplicate, look-ahead and processor-symmetry pruning rules.
    /// Returns true iff the search is over because a complete schedule
    /// matching the entry task's critical-path lower bound was found.
    fn expand(&mut self, state: PartialSchedule) -> bool {
        let remaining = state.nb_unscheduled();
        let makespan = state.makespan();
        // finish times only ever grow down a branch, so an incumbent-matching
        // partial makespan already disqualifies the whole subtree
        if makespan >= self.best_makespan {
            self.cut(remaining, 1);
            return false;
        }
        if state.is_complete() {
            self.record_best(&state);
            self.cut(0, 1);
            let entry = state
                .first_scheduled()
                .expect("a complete state scheduled at least one task");
            return makespan == self.graph.task(entry).bottom_level();
        }

        let ready: Vec<TaskId> = state
            .unscheduled()
            .filter(|t| state.dependencies_satisfied(*t))
            .collect();
        for &task in &ready {
            let weight = self.graph.task(task).weight();
            let bottom = self.graph.task(task).bottom_level();
            'procs: for proc in 0..self.nb_procs {
                let start = state.earliest_start(task, proc);
                // bound: even a critical-path completion from here loses
                if start + bottom >= self.best_makespan {
                    self.cut(remaining - 1, 1);
                    continue;
                }
                // look-ahead: placing `task` here must not strand one of its
                // ready siblings beyond the incumbent on every processor
                for &other in &ready {
                    if other == task {
                        continue;
                    }
                    let other_bottom = self.graph.task(other).bottom_level();
                    if start + weight + other_bottom < self.best_makespan {
                        continue;
                    }
                    let mut best_end = usize::MAX;
                    for alt in 0..self.nb_procs {
                        if alt == proc {
                            continue;
                        }
                        let end = state.earliest_start(other, alt) + other_bottom;
                        best_end = best_end.min(end);
                        // all further empty processors behave the same
                        if state.is_processor_empty(alt) {
                            break;
                        }
                    }
                    if best_end >= self.best_makespan {
                        self.cut(remaining - 1, 1);
                        continue 'procs;
                    }
                }
                // branch
                let mut child = state.clone();
                let first_on_processor = child.schedule(task, proc, start);
                if !self.seen.insert(child.fingerprint()) {
                    self.cut(remaining - 1, 1);
                    continue;
                }
                self.frontier.push(child);
                // placing this task as the opener of any further empty
                // processor would reproduce the same schedule with the
                // processor labels permuted
                if first_on_processor {
                    let untried = self.nb_procs - 1 - proc;
                    if untried > 0 {
                        self.cut(remaining - 1, untried);
                    }
                    break;
                }
            }
        }
        false
    }
}

impl Solver for SequentialSolver<'_> {
    fn minimize(&mut self) -> Schedule {
        self.initialize();

        while let Some(state) = self.frontier.pop() {
            self.explored += 1;
            if self.expand(state) {
                debug!(
                    "makespan {} matches the entry task's critical path, stopping early",
                    self.best_makespan
                );
                self.frontier.clear();
                break;
            }
        }

        let best = self
            .best_schedule
            .clone()
            .expect("the greedy seed guarantees an incumbent");
        debug!(
            "search completed: optimal makespan {}, {} states explored",
            best.makespan(),
            self.explored
        );
        self.listener.on_branches_pruned(self.pruned);
        self.listener.on_completed(&best);
        best
    }

    fn best_schedule(&self) -> Option<Schedule> {
        self.best_schedule.clone()
    }

    fn best_makespan(&self) -> Option<usize> {
        self.best_schedule.as_ref().map(|s| s.makespan())
    }

    fn explored(&self) -> usize {
        self.explored
    }

    fn pruned_estimate(&self) -> u128 {
        self.pruned
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
