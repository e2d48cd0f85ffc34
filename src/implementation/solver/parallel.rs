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

//! This module provides the implementation of the parallel branch-and-bound
//! solver. That is, a solver that will explore the very same search space as
//! the sequential one using as many worker threads as requested. By default,
//! it uses as many threads as the number of hardware threads available on
//! the machine.
//!
//! Each worker owns a double-ended queue and runs the sequential expansion
//! step against its front, which preserves its depth-first locality; a worker
//! whose queue runs dry steals one state from the *back* of a colleague's
//! queue, where the shallowest (and thus largest) unexplored subtrees sit.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;
use log::debug;
use parking_lot::Mutex;

use super::cut_estimate;
use crate::{
    InvalidProcessorCount, PartialSchedule, Schedule, SearchListener, Solver, TaskGraph, TaskId,
    greedy_schedule,
};

/// The shared data that may only be manipulated within critical sections.
struct Critical {
    /// If set, this keeps the info about the best schedule so far.
    best_schedule: Option<Schedule>,
    /// The cumulated pruning estimate of all workers; only ever grows, which
    /// is what keeps the progress reports monotonic.
    pruned: u128,
    /// The number of states expanded, over all workers.
    explored: usize,
}

/// The counters a worker accumulates locally, so that the shared tallies are
/// only touched when a new incumbent is found and when the worker retires.
#[derive(Default)]
struct WorkerStats {
    explored: usize,
    pruned: u128,
}

impl WorkerStats {
    fn cut(&mut self, nb_procs: usize, remaining: usize, factor: usize) {
        self.pruned = self
            .pruned
            .saturating_add(cut_estimate(nb_procs, remaining, factor));
    }
}

/// This is the structure implementing the multi-threaded branch-and-bound
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
/// let mut solver = ParallelSolver::new(graph, 2, &listener)
///     .unwrap()
///     .with_nb_workers(4);
///
/// let schedule = solver.minimize();
/// assert_eq!(5, schedule.makespan());
/// ```
pub struct ParallelSolver<'a> {
    /// The graph being scheduled; immutable, hence freely read by all
    /// workers without any synchronization.
    graph: Arc<TaskGraph>,
    /// The number of identical processors to schedule onto.
    nb_procs: usize,
    /// This is a configuration parameter that tunes the number of worker
    /// threads that will be spawned to solve the problem. By default, this
    /// number amounts to the number of hardware threads available on the
    /// machine.
    nb_workers: usize,
    /// Whoever consumes the progress of this search. Notified from within
    /// the critical section, so several workers never report at once.
    listener: &'a (dyn SearchListener + Sync),
    /// The makespan of the best complete schedule found so far, mirrored in
    /// an atomic so the workers' bound checks never take the lock. It is
    /// only ever written inside the critical section.
    best_makespan: AtomicUsize,
    /// This is the shared state data which can only be accessed within
    /// critical sections. Therefore, it is protected by a mutex which
    /// prevents concurrent reads/writes.
    critical: Mutex<Critical>,
    /// Raised the instant some worker finds a schedule matching the entry
    /// task's critical-path bound; every worker checks it on every iteration
    /// and drains out promptly.
    early_stop: AtomicBool,
}

impl<'a> ParallelSolver<'a> {
    pub fn new(
        graph: Arc<TaskGraph>,
        nb_procs: usize,
        listener: &'a (dyn SearchListener + Sync),
    ) -> Result<Self, InvalidProcessorCount> {
        if nb_procs < 1 {
            return Err(InvalidProcessorCount(nb_procs));
        }
        Ok(ParallelSolver {
            graph,
            nb_procs,
            nb_workers: num_cpus::get().max(1),
            listener,
            best_makespan: AtomicUsize::new(usize::MAX),
            critical: Mutex::new(Critical { best_schedule: None, pruned: 0, explored: 0 }),
            early_stop: AtomicBool::new(false),
        })
    }

    /// Sets the number of worker threads used by the solver.
    pub fn with_nb_workers(mut self, nb_workers: usize) -> Self {
        self.nb_workers = nb_workers.max(1);
        self
    }

    /// Installs a complete state as the incumbent if it still improves on the
    /// shared best, and notifies the listener. The worker's local counters
    /// are folded into the shared tallies while the lock is held, so that the
    /// reported pruning totals never decrease.
    fn record_best(&self, state: &PartialSchedule, stats: &mut WorkerStats) {
        let mut critical = self.critical.lock();
        let makespan = state.makespan();
        if makespan < self.best_makespan.load(Ordering::Relaxed) {
            self.best_makespan.store(makespan, Ordering::Relaxed);
            critical.pruned = critical.pruned.saturating_add(std::mem::take(&mut stats.pruned));
            critical.explored += std::mem::take(&mut stats.explored);

            let schedule = state.to_schedule();
            debug!("new best makespan {makespan}");
            self.listener.on_new_optimal(&schedule);
            self.listener.on_branches_pruned(critical.pruned);
            critical.best_schedule = Some(schedule);
        }
    }

    /// The exact same expansion step as the sequential solver, with the
    /// shared incumbent read through the atomic mirror and the duplicate
    /// fingerprints kept in a concurrent map. Children are handed to `push`
    /// (the owner's queue front, or the scratch queue while splitting).
    /// Returns true iff this state certifies optimality.
    fn expand(
        &self,
        state: PartialSchedule,
        seen: &DashMap<String, ()>,
        stats: &mut WorkerStats,
        push: &mut dyn FnMut(PartialSchedule),
    ) -> bool {
        let best = self.best_makespan.load(Ordering::Relaxed);
        let remaining = state.nb_unscheduled();
        let makespan = state.makespan();
        if makespan >= best {
            stats.cut(self.nb_procs, remaining, 1);
            return false;
        }
        if state.is_complete() {
            self.record_best(&state, stats);
            stats.cut(self.nb_procs, 0, 1);
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
                if start + bottom >= best {
                    stats.cut(self.nb_procs, remaining - 1, 1);
                    continue;
                }
                for &other in &ready {
                    if other == task {
                        continue;
                    }
                    let other_bottom = self.graph.task(other).bottom_level();
                    if start + weight + other_bottom < best {
                        continue;
                    }
                    let mut best_end = usize::MAX;
                    for alt in 0..self.nb_procs {
                        if alt == proc {
                            continue;
                        }
                        let end = state.earliest_start(other, alt) + other_bottom;
                        best_end = best_end.min(end);
                        if state.is_processor_empty(alt) {
                            break;
                        }
                    }
                    if best_end >= best {
                        stats.cut(self.nb_procs, remaining - 1, 1);
                        continue 'procs;
                    }
                }
                let mut child = state.clone();
                let first_on_processor = child.schedule(task, proc, start);
                if seen.insert(child.fingerprint(), ()).is_some() {
                    stats.cut(self.nb_procs, remaining - 1, 1);
                    continue;
                }
                push(child);
                if first_on_processor {
                    let untried = self.nb_procs - 1 - proc;
                    if untried > 0 {
                        stats.cut(self.nb_procs, remaining - 1, untried);
                    }
                    break;
                }
            }
        }
        false
    }

    /// Steals one state from the back of some colleague's queue. Queues
    /// holding at most one state are left alone: taking a worker's only
    /// state would merely move the starvation around.
    fn steal(
        &self,
        wid: usize,
        queues: &[Mutex<VecDeque<PartialSchedule>>],
    ) -> Option<PartialSchedule> {
        for (other, queue) in queues.iter().enumerate() {
            if other == wid {
                continue;
            }
            let mut queue = queue.lock();
            if queue.len() > 1 {
                return queue.pop_back();
            }
        }
        None
    }

    /// The long-running body of one worker thread: drain the own queue depth
    /// first, steal when it runs dry, and retire once either some worker
    /// certified optimality or every worker is starved at the same time.
    /// Workers only ever push onto their own queue, so at that point all
    /// queues are provably empty.
    fn worker(
        &self,
        wid: usize,
        queues: &[Mutex<VecDeque<PartialSchedule>>],
        idle: &AtomicUsize,
        seen: &DashMap<String, ()>,
    ) {
        let mut stats = WorkerStats::default();
        'search: loop {
            if self.early_stop.load(Ordering::Relaxed) {
                break;
            }
            let node = queues[wid].lock().pop_front();
            let node = node.or_else(|| self.steal(wid, queues));
            if let Some(node) = node {
                stats.explored += 1;
                let certified =
                    self.expand(node, seen, &mut stats, &mut |child| {
                        queues[wid].lock().push_front(child)
                    });
                if certified {
                    debug!("worker {wid}: makespan matches the entry task's critical path");
                    self.early_stop.store(true, Ordering::Relaxed);
                    break;
                }
                continue;
            }
            // nothing to pop and nothing to steal: park until either some
            // colleague exposes work again or everyone is starved
            idle.fetch_add(1, Ordering::SeqCst);
            loop {
                if self.early_stop.load(Ordering::Relaxed)
                    || idle.load(Ordering::SeqCst) == self.nb_workers
                {
                    break 'search;
                }
                if queues.iter().enumerate().any(|(i, q)| i != wid && !q.lock().is_empty()) {
                    idle.fetch_sub(1, Ordering::SeqCst);
                    continue 'search;
                }
                std::thread::yield_now();
            }
        }

        let mut critical = self.critical.lock();
        critical.explored += stats.explored;
        critical.pruned = critical.pruned.saturating_add(stats.pruned);
        debug!("worker {wid} retired");
    }
}

impl Solver for ParallelSolver<'_> {
    /// Runs the very same branch-and-bound as the sequential solver, spread
    /// over `nb_workers` long-running threads. The optimal *makespan* is the
    /// same whatever the number of workers; when several schedules reach it,
    /// which one gets reported depends on the race between workers.
    fn minimize(&mut self) -> Schedule {
        self.early_stop.store(false, Ordering::Relaxed);
        {
            let mut critical = self.critical.lock();
            critical.best_schedule = None;
            critical.pruned = 0;
            critical.explored = 0;
        }

        let seen: DashMap<String, ()> = DashMap::default();

        // greedy seed: the upper bound every worker prunes against from the start
        let seed = greedy_schedule(&self.graph, self.nb_procs);
        seen.insert(seed.fingerprint(), ());
        let seed = seed.to_schedule();
        self.best_makespan.store(seed.makespan(), Ordering::Relaxed);
        debug!("greedy seed makespan {}", seed.makespan());
        self.listener.on_new_optimal(&seed);
        self.listener.on_branches_pruned(0);
        self.critical.lock().best_schedule = Some(seed);

        // split the root into at least one frontier state per worker by
        // running a few rounds of the expansion step sequentially
        let mut scratch: VecDeque<PartialSchedule> = VecDeque::new();
        scratch.push_back(PartialSchedule::new(Arc::clone(&self.graph), self.nb_procs));
        let mut stats = WorkerStats::default();
        let mut certified = false;
        while !certified && !scratch.is_empty() && scratch.len() < self.nb_workers {
            let node = scratch.pop_front().expect("the loop guard checked non-emptiness");
            stats.explored += 1;
            certified = self.expand(node, &seen, &mut stats, &mut |child| {
                scratch.push_front(child)
            });
        }
        {
            let mut critical = self.critical.lock();
            critical.explored += stats.explored;
            critical.pruned = critical.pruned.saturating_add(stats.pruned);
        }

        if !certified && !scratch.is_empty() {
            debug!("split produced {} states for {} workers", scratch.len(), self.nb_workers);
            let queues: Vec<Mutex<VecDeque<PartialSchedule>>> =
                (0..self.nb_workers).map(|_| Mutex::new(VecDeque::new())).collect();
            for (i, state) in scratch.into_iter().enumerate() {
                queues[i % self.nb_workers].lock().push_back(state);
            }
            let idle = AtomicUsize::new(0);

            let this: &Self = self;
            std::thread::scope(|s| {
                for wid in 0..this.nb_workers {
                    let queues = &queues;
                    let idle = &idle;
                    let seen = &seen;
                    s.spawn(move || this.worker(wid, queues, idle, seen));
                }
            });
        }

        let critical = self.critical.lock();
        let best = critical
            .best_schedule
            .clone()
            .expect("the greedy seed guarantees an incumbent");
        let pruned = critical.pruned;
        drop(critical);
        debug!(
            "search completed: optimal makespan {}, {} workers",
            best.makespan(),
            self.nb_workers
        );
        self.listener.on_branches_pruned(pruned);
        self.listener.on_completed(&best);
        best
    }

    fn best_schedule(&self) -> Option<Schedule> {
        self.critical.lock().best_schedule.clone()
    }

    fn best_makespan(&self) -> Option<usize> {
        self.critical.lock().best_schedule.as_ref().map(|s| s.makespan())
    }

    fn explored(&self) -> usize {
        self.critical.lock().explored
    }

    fn pruned_estimate(&self) -> u128 {
        self.critical.lock().pruned
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

/// The solver threads make exhaustive unit testing impractical here; like
/// for the sequential solver, the strategy is to check the configuration
/// surface and to validate the search itself against instances with a known
/// optimum (and against the sequential solver, whatever the worker count).

#[cfg(test)]
mod test_parallel {
    use std::sync::Arc;

    use crate::test_utils::{layered_graph, sample_graph, validate_schedule};
    use crate::{
        InvalidProcessorCount, LifoFrontier, ParallelSolver, SequentialSolver, SilentListener,
        Solver, TaskGraph,
    };

    fn sequential_makespan(graph: &Arc<TaskGraph>, nb_procs: usize) -> usize {
        let listener = SilentListener;
        let mut frontier = LifoFrontier::new();
        let mut solver =
            SequentialSolver::new(Arc::clone(graph), nb_procs, &listener, &mut frontier).unwrap();
        solver.minimize().makespan()
    }

    #[test]
    fn zero_processors_are_rejected_before_the_search_starts() {
        let graph = Arc::new(sample_graph());
        let listener = SilentListener;
        let result = ParallelSolver::new(graph, 0, &listener);
        assert!(matches!(result, Err(InvalidProcessorCount(0))));
    }

    #[test]
    fn whatever_the_worker_count_the_makespan_matches_the_sequential_one() {
        let listener = SilentListener;
        for (graph, nb_procs) in [
            (Arc::new(sample_graph()), 2),
            (Arc::new(layered_graph()), 2),
            (Arc::new(layered_graph()), 3),
        ] {
            let expected = sequential_makespan(&graph, nb_procs);
            for workers in [1, 2, 4, 8] {
                let mut solver = ParallelSolver::new(Arc::clone(&graph), nb_procs, &listener)
                    .unwrap()
                    .with_nb_workers(workers);
                let schedule = solver.minimize();
                assert_eq!(expected, schedule.makespan());
                validate_schedule(&graph, &schedule, nb_procs);
            }
        }
    }

    #[test]
    fn even_a_tiny_graph_survives_an_oversized_worker_pool() {
        // the split cannot produce one state per worker here: the frontier
        // dries up first and the search must finish during splitting
        let graph = Arc::new(TaskGraph::builder().add_task("only", 3).build().unwrap());
        let listener = SilentListener;
        let mut solver = ParallelSolver::new(graph, 2, &listener)
            .unwrap()
            .with_nb_workers(16);
        assert_eq!(3, solver.minimize().makespan());
    }

    #[test]
    fn a_zero_worker_request_is_clamped_to_one() {
        let graph = Arc::new(sample_graph());
        let listener = SilentListener;
        let mut solver = ParallelSolver::new(graph, 2, &listener)
            .unwrap()
            .with_nb_workers(0);
        assert_eq!(6, solver.minimize().makespan());
    }

    #[test]
    fn accessors_reflect_the_finished_search() {
        let graph = Arc::new(layered_graph());
        let listener = SilentListener;
        let mut solver = ParallelSolver::new(graph, 2, &listener)
            .unwrap()
            .with_nb_workers(2);

        assert!(solver.best_schedule().is_none());
        assert!(solver.best_makespan().is_none());

        let best = solver.minimize();
        assert_eq!(Some(best.makespan()), solver.best_makespan());
        assert_eq!(Some(best), solver.best_schedule());
        assert!(solver.explored() > 0);
        assert!(solver.pruned_estimate() > 0);
    }
}
