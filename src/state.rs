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

//! This module defines the partial schedule: the state of one node of the
//! branch-and-bound search tree. A partial schedule assigns a subset of the
//! tasks to a processor and a start time each; branching means cloning the
//! state and scheduling one more ready task on one more processor. The
//! immutable task graph is shared by `Arc` across all states, so a clone only
//! duplicates the small per-task and per-processor tables.

use std::sync::Arc;

use crate::{Assignment, Schedule, TaskGraph, TaskId};

/// The processor and start time a task has been assigned in some partial
/// schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub processor: usize,
    pub start: usize,
}

/// One node of the search tree: the tasks scheduled so far, where and when
/// they run, and the derived quantities the pruning rules need (per-processor
/// release times, running makespan, the first task of the lineage).
#[derive(Debug, Clone)]
pub struct PartialSchedule {
    /// The task graph being scheduled, shared across all states of a search.
    graph: Arc<TaskGraph>,
    /// The placement of each task, indexed by task id; `None` marks the
    /// tasks that are still unscheduled.
    placements: Vec<Option<Placement>>,
    nb_scheduled: usize,
    /// For each processor, the tasks it runs in scheduling order. This is
    /// what the canonical fingerprint is derived from.
    proc_tasks: Vec<Vec<TaskId>>,
    /// For each processor, the finish time of the last task placed on it.
    proc_avail: Vec<usize>,
    makespan: usize,
    /// The very first task scheduled in this state's lineage; its bottom
    /// level is the absolute floor the certified-optimality exit compares to.
    first_scheduled: Option<TaskId>,
}

impl PartialSchedule {
    /// An empty schedule over `nb_procs` processors: every task unscheduled,
    /// every processor idle.
    pub fn new(graph: Arc<TaskGraph>, nb_procs: usize) -> Self {
        let nb_tasks = graph.nb_tasks();
        PartialSchedule {
            graph,
            placements: vec![None; nb_tasks],
            nb_scheduled: 0,
            proc_tasks: vec![vec![]; nb_procs],
            proc_avail: vec![0; nb_procs],
            makespan: 0,
            first_scheduled: None,
        }
    }

    /// The graph this schedule is built over.
    pub fn graph(&self) -> &Arc<TaskGraph> {
        &self.graph
    }

    /// The number of processors this schedule may use.
    pub fn nb_processors(&self) -> usize {
        self.proc_avail.len()
    }

    /// True iff every task of the graph has been scheduled.
    pub fn is_complete(&self) -> bool {
        self.nb_scheduled == self.graph.nb_tasks()
    }

    /// The number of tasks that still await a placement.
    pub fn nb_unscheduled(&self) -> usize {
        self.graph.nb_tasks() - self.nb_scheduled
    }

    /// The tasks that still await a placement, in id order.
    pub fn unscheduled(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| TaskId(i))
    }

    /// The placement of `task`, if it has been scheduled.
    pub fn placement(&self, task: TaskId) -> Option<Placement> {
        self.placements[task.id()]
    }

    /// The completion time of `task`, if it has been scheduled.
    pub fn finish_time(&self, task: TaskId) -> Option<usize> {
        self.placements[task.id()].map(|p| p.start + self.graph.task(task).weight())
    }

    /// The first task ever scheduled in this state's lineage.
    pub fn first_scheduled(&self) -> Option<TaskId> {
        self.first_scheduled
    }

    /// True iff every predecessor of `task` has been scheduled, i.e. `task`
    /// is ready to be placed.
    pub fn dependencies_satisfied(&self, task: TaskId) -> bool {
        self.graph
            .task(task)
            .predecessors()
            .iter()
            .all(|(pred, _)| self.placements[pred.id()].is_some())
    }

    /// The earliest legal start of `task` on `processor`: not before the
    /// processor has finished everything already placed on it, not before
    /// each predecessor has completed, and additionally delayed by the edge's
    /// communication cost for every predecessor sitting on a different
    /// processor. This is the one place where communication costs enter the
    /// model. All predecessors of `task` must already be scheduled.
    pub fn earliest_start(&self, task: TaskId, processor: usize) -> usize {
        let mut start = self.proc_avail[processor];
        for &(pred, cost) in self.graph.task(task).predecessors() {
            let placement = self.placements[pred.id()]
                .expect("earliest_start queried before all dependencies were scheduled");
            let finish = placement.start + self.graph.task(pred).weight();
            let ready = if placement.processor == processor { finish } else { finish + cost };
            start = start.max(ready);
        }
        start
    }

    /// Records the assignment of `task` to `processor` at time `start` and
    /// returns true iff this made `processor` non-empty, i.e. the task is the
    /// first one ever placed there (the signal the processor-symmetry pruning
    /// relies upon). `start` must be a legal start time as computed by
    /// `earliest_start`.
    pub fn schedule(&mut self, task: TaskId, processor: usize, start: usize) -> bool {
        debug_assert!(self.placements[task.id()].is_none(), "task scheduled twice");
        debug_assert!(self.dependencies_satisfied(task), "precedence violated");
        debug_assert!(start >= self.proc_avail[processor], "processor occupancy violated");

        self.placements[task.id()] = Some(Placement { processor, start });
        self.nb_scheduled += 1;

        let finish = start + self.graph.task(task).weight();
        self.proc_avail[processor] = self.proc_avail[processor].max(finish);
        self.makespan = self.makespan.max(finish);
        if self.first_scheduled.is_none() {
            self.first_scheduled = Some(task);
        }

        self.proc_tasks[processor].push(task);
        self.proc_tasks[processor].len() == 1
    }

    /// True iff no task has been placed on `processor` yet.
    pub fn is_processor_empty(&self, processor: usize) -> bool {
        self.proc_tasks[processor].is_empty()
    }

    /// The finish time of the last completing task scheduled so far.
    pub fn makespan(&self) -> usize {
        self.makespan
    }

    /// The canonical identity of this state: the names of each processor's
    /// tasks joined in scheduling order, with the per-processor strings
    /// sorted before being concatenated. Two states that place the same
    /// tasks in the same relative order but on permuted processor labels
    /// produce the same fingerprint; this is the key the duplicate-state
    /// elimination indexes on.
    pub fn fingerprint(&self) -> String {
        let mut lanes: Vec<String> = self
            .proc_tasks
            .iter()
            .map(|tasks| {
                tasks
                    .iter()
                    .map(|t| self.graph.task(*t).name())
                    .collect::<Vec<_>>()
                    .join(".")
            })
            .collect();
        lanes.sort_unstable();
        lanes.join("|")
    }

    /// Freezes a complete state into the immutable `Schedule` handed to
    /// listeners. Must only be called once `is_complete()` holds.
    pub fn to_schedule(&self) -> Schedule {
        debug_assert!(self.is_complete());
        let assignments = self
            .placements
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let p = p.expect("a complete schedule places every task");
                Assignment { task: TaskId(i), processor: p.processor, start: p.start }
            })
            .collect();
        Schedule::new(assignments, self.makespan)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
