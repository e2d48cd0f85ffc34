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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client code is likely to work with.

// ----------------------------------------------------------------------------
// --- TASK ID ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes one task from the graph being scheduled. Each task is
/// identified with an integer ranging from 0 until `graph.nb_tasks()`; the
/// task names supplied by the loader are mapped onto these dense indices when
/// the graph is built.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TaskId(pub usize);
impl TaskId {
    #[inline]
    /// This function returns the id (numeric value) of the task.
    ///
    /// # Examples:
    /// ```
    /// # use optsched::TaskId;
    /// assert_eq!(0, TaskId(0).id());
    /// assert_eq!(1, TaskId(1).id());
    /// assert_eq!(2, TaskId(2).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- ASSIGNMENT -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This denotes one assignment from a complete schedule: the given `task`
/// runs on `processor`, starting at time `start` and holding the processor
/// until `start + weight`. Processor indices are 0-based; only their relative
/// labeling is meaningful.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Assignment {
    pub task: TaskId,
    pub processor: usize,
    pub start: usize,
}

// ----------------------------------------------------------------------------
// --- SCHEDULE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A complete schedule: one assignment per task of the graph, in task-id
/// order, along with the resulting makespan (the finish time of the last
/// completing task). This is the value handed out to `SearchListener`s and
/// returned by the solvers; it is immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    assignments: Vec<Assignment>,
    makespan: usize,
}

impl Schedule {
    /// Assembles a schedule from its parts. The assignments are expected in
    /// task-id order; this is what `PartialSchedule::to_schedule` produces.
    pub(crate) fn new(assignments: Vec<Assignment>, makespan: usize) -> Self {
        Schedule { assignments, makespan }
    }

    /// The finish time of the last completing task.
    pub fn makespan(&self) -> usize {
        self.makespan
    }

    /// All assignments, in task-id order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// The assignment of one given task.
    pub fn assignment(&self, task: TaskId) -> Assignment {
        self.assignments[task.id()]
    }
}

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The error raised by solver constructors when the configured number of
/// processors is zero. Together with `MalformedGraph`, this is one of only
/// two user-facing failures of the library; both occur before the search
/// starts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("a schedule requires at least one processor (got {0})")]
pub struct InvalidProcessorCount(pub usize);

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_task_id {
    use crate::TaskId;

    #[test]
    fn test_task_id() {
        assert_eq!(0, TaskId(0).id());
        assert_eq!(1, TaskId(1).id());
        assert_eq!(2, TaskId(2).id());
        assert_eq!(3, TaskId(3).id());
    }
}

#[cfg(test)]
mod test_schedule {
    use crate::{Assignment, Schedule, TaskId};

    #[test]
    fn assignments_are_kept_in_task_id_order() {
        let schedule = Schedule::new(
            vec![
                Assignment { task: TaskId(0), processor: 0, start: 0 },
                Assignment { task: TaskId(1), processor: 1, start: 2 },
            ],
            5,
        );
        assert_eq!(5, schedule.makespan());
        assert_eq!(2, schedule.assignments().len());
        assert_eq!(1, schedule.assignment(TaskId(1)).processor);
        assert_eq!(2, schedule.assignment(TaskId(1)).start);
    }
}
