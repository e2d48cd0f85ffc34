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

//! This module defines the task graph model: the immutable description of the
//! tasks to schedule, their execution weights, the precedence edges between
//! them and the communication cost attached to each edge. A graph is put
//! together through the `GraphBuilder` (typically fed by an external file
//! loader) and validated once, when `build` is called. After that point it
//! never changes and it is shared by reference among all the search states.

use std::collections::VecDeque;

use fxhash::{FxHashMap, FxHashSet};

use crate::TaskId;

/// The set of defects that can make a task graph unusable. All of these are
/// detected by `GraphBuilder::build`, before any search is attempted; none of
/// them is ever raised once a `TaskGraph` exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedGraph {
    /// Two tasks were declared with the same name.
    #[error("task `{0}` is declared more than once")]
    DuplicateTask(String),
    /// Execution weights express a duration and must be at least one time unit.
    #[error("task `{0}` has a zero execution weight")]
    ZeroWeight(String),
    /// An edge referenced a task that was never declared.
    #[error("edge endpoint `{0}` does not name a declared task")]
    UnknownTask(String),
    /// The same precedence edge was declared twice.
    #[error("edge `{0}` -> `{1}` is declared more than once")]
    DuplicateEdge(String, String),
    /// A graph without any task cannot have an entry task.
    #[error("the task graph contains no task")]
    EmptyGraph,
    /// The precedence edges must form a DAG.
    #[error("the task graph contains a cycle through `{0}`")]
    Cycle(String),
}

/// One task of the graph. Tasks are immutable once the graph is built: the
/// incoming edges, the derived successor list and the precomputed lower-bound
/// weight (see `bottom_level`) are all frozen by `GraphBuilder::build`.
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    weight: usize,
    predecessors: Vec<(TaskId, usize)>,
    successors: Vec<TaskId>,
    bottom_level: usize,
}

impl Task {
    /// The unique name this task was declared with.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The execution weight (duration) of this task, in abstract time units.
    pub fn weight(&self) -> usize {
        self.weight
    }
    /// The incoming edges of this task: each predecessor together with the
    /// communication cost that is paid when the predecessor runs on a
    /// different processor than this task.
    pub fn predecessors(&self) -> &[(TaskId, usize)] {
        &self.predecessors
    }
    /// The tasks which directly depend on this one.
    pub fn successors(&self) -> &[TaskId] {
        &self.successors
    }
    /// The lower-bound weight of this task: an underestimate of the remaining
    /// critical-path length from the start of this task to the completion of
    /// some sink of the graph. A task with no successor is alone on that path,
    /// so its bottom level is its own weight; otherwise it is the task weight
    /// plus the largest bottom level among its successors. Communication
    /// costs are deliberately left out of this bound: it stays valid on any
    /// processor assignment, merely weaker than a cost-aware estimate.
    pub fn bottom_level(&self) -> usize {
        self.bottom_level
    }
}

/// The immutable task graph handed to the schedulers. It owns the task table
/// and a name lookup; the search shares it by `Arc` reference and never needs
/// to synchronize reads.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    by_name: FxHashMap<String, TaskId>,
}

impl TaskGraph {
    /// Starts the declaration of a new graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// The number of tasks in the graph.
    pub fn nb_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// The task bearing the given id.
    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.id()]
    }

    /// All tasks, in id order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Finds a task by the name it was declared with.
    pub fn task_id(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    /// The tasks having no predecessor. Because the graph is a non-empty DAG
    /// there is always at least one of these.
    pub fn entry_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.predecessors.is_empty())
            .map(|(i, _)| TaskId(i))
    }
}

/// Accumulates the task and edge declarations of a graph until `build` is
/// called. This mirrors the surface an external loader works against: declare
/// every task with its weight, then every precedence edge with its
/// communication cost, and finally let `build` validate the whole thing.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    tasks: Vec<(String, usize)>,
    edges: Vec<(String, String, usize)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one task with its execution weight.
    pub fn add_task(mut self, name: impl Into<String>, weight: usize) -> Self {
        self.tasks.push((name.into(), weight));
        self
    }

    /// Declares one precedence edge: `succ` may only start once `pred` has
    /// completed, and additionally pays `cost` time units of communication
    /// delay whenever the two run on different processors.
    pub fn add_edge(mut self, pred: impl Into<String>, succ: impl Into<String>, cost: usize) -> Self {
        self.edges.push((pred.into(), succ.into(), cost));
        self
    }

    /// Validates the declarations and freezes them into a `TaskGraph`. This
    /// checks that every task is declared once with a positive weight, that
    /// every edge endpoint exists, and that the edges form a DAG; it also
    /// precomputes the per-task lower-bound weight in the same pass, reusing
    /// the topological order obtained from the cycle check.
    pub fn build(self) -> Result<TaskGraph, MalformedGraph> {
        if self.tasks.is_empty() {
            return Err(MalformedGraph::EmptyGraph);
        }

        let mut by_name: FxHashMap<String, TaskId> = FxHashMap::default();
        let mut tasks: Vec<Task> = Vec::with_capacity(self.tasks.len());
        for (name, weight) in self.tasks {
            if weight == 0 {
                return Err(MalformedGraph::ZeroWeight(name));
            }
            if by_name.contains_key(&name) {
                return Err(MalformedGraph::DuplicateTask(name));
            }
            by_name.insert(name.clone(), TaskId(tasks.len()));
            tasks.push(Task {
                name,
                weight,
                predecessors: vec![],
                successors: vec![],
                bottom_level: 0,
            });
        }

        let mut declared: FxHashSet<(usize, usize)> = FxHashSet::default();
        for (pred, succ, cost) in self.edges {
            let p = *by_name.get(&pred).ok_or(MalformedGraph::UnknownTask(pred.clone()))?;
            let s = *by_name.get(&succ).ok_or(MalformedGraph::UnknownTask(succ.clone()))?;
            if !declared.insert((p.id(), s.id())) {
                return Err(MalformedGraph::DuplicateEdge(pred, succ));
            }
            tasks[s.id()].predecessors.push((p, cost));
            tasks[p.id()].successors.push(s);
        }

        let topo = toposort(&tasks)?;
        // bottom levels are computed sinks-first
        for &tid in topo.iter().rev() {
            let best_child = tasks[tid.id()]
                .successors
                .iter()
                .map(|c| tasks[c.id()].bottom_level)
                .max()
                .unwrap_or(0);
            tasks[tid.id()].bottom_level = tasks[tid.id()].weight + best_child;
        }

        Ok(TaskGraph { tasks, by_name })
    }
}

/// Kahn's algorithm. Returns the tasks in some topological order, or the
/// name of a task sitting on a cycle if the edges do not form a DAG.
fn toposort(tasks: &[Task]) -> Result<Vec<TaskId>, MalformedGraph> {
    let mut indegree: Vec<usize> = tasks.iter().map(|t| t.predecessors.len()).collect();
    let mut queue: VecDeque<TaskId> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| TaskId(i))
        .collect();

    let mut order = Vec::with_capacity(tasks.len());
    while let Some(tid) = queue.pop_front() {
        order.push(tid);
        for &succ in &tasks[tid.id()].successors {
            indegree[succ.id()] -= 1;
            if indegree[succ.id()] == 0 {
                queue.push_back(succ);
            }
        }
    }

    if order.len() < tasks.len() {
        let culprit = indegree
            .iter()
            .position(|&d| d > 0)
            .map(|i| tasks[i].name.clone())
            .unwrap_or_default();
        Err(MalformedGraph::Cycle(culprit))
    } else {
        Ok(order)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_builder {
    use crate::{MalformedGraph, TaskGraph, TaskId};

    #[test]
    fn build_resolves_names_and_derives_successors() {
        let graph = TaskGraph::builder()
            .add_task("a", 2)
            .add_task("b", 3)
            .add_edge("a", "b", 1)
            .build()
            .unwrap();

        let a = graph.task_id("a").unwrap();
        let b = graph.task_id("b").unwrap();
        assert_eq!(2, graph.nb_tasks());
        assert_eq!("a", graph.task(a).name());
        assert_eq!(3, graph.task(b).weight());
        assert_eq!(&[b], graph.task(a).successors());
        assert_eq!(&[(a, 1)], graph.task(b).predecessors());
        assert_eq!(None, graph.task_id("nope"));
    }

    #[test]
    fn entry_tasks_are_the_tasks_with_no_predecessor() {
        let graph = TaskGraph::builder()
            .add_task("a", 1)
            .add_task("b", 1)
            .add_task("c", 1)
            .add_edge("a", "c", 0)
            .build()
            .unwrap();

        let entries: Vec<TaskId> = graph.entry_tasks().collect();
        assert_eq!(vec![TaskId(0), TaskId(1)], entries);
    }

    #[test]
    fn an_empty_declaration_is_rejected() {
        let result = TaskGraph::builder().build();
        assert_eq!(MalformedGraph::EmptyGraph, result.unwrap_err());
    }

    #[test]
    fn a_duplicate_task_is_rejected() {
        let result = TaskGraph::builder()
            .add_task("a", 1)
            .add_task("a", 2)
            .build();
        assert_eq!(MalformedGraph::DuplicateTask("a".to_string()), result.unwrap_err());
    }

    #[test]
    fn a_zero_weight_is_rejected() {
        let result = TaskGraph::builder().add_task("a", 0).build();
        assert_eq!(MalformedGraph::ZeroWeight("a".to_string()), result.unwrap_err());
    }

    #[test]
    fn an_edge_to_an_undeclared_task_is_rejected() {
        let result = TaskGraph::builder()
            .add_task("a", 1)
            .add_edge("a", "ghost", 2)
            .build();
        assert_eq!(MalformedGraph::UnknownTask("ghost".to_string()), result.unwrap_err());
    }

    #[test]
    fn a_repeated_edge_is_rejected() {
        let result = TaskGraph::builder()
            .add_task("a", 1)
            .add_task("b", 1)
            .add_edge("a", "b", 1)
            .add_edge("a", "b", 2)
            .build();
        assert_eq!(
            MalformedGraph::DuplicateEdge("a".to_string(), "b".to_string()),
            result.unwrap_err()
        );
    }

    #[test]
    fn a_self_loop_is_a_cycle() {
        let result = TaskGraph::builder()
            .add_task("a", 1)
            .add_edge("a", "a", 0)
            .build();
        assert_eq!(MalformedGraph::Cycle("a".to_string()), result.unwrap_err());
    }

    #[test]
    fn a_longer_cycle_is_detected_too() {
        let result = TaskGraph::builder()
            .add_task("a", 1)
            .add_task("b", 1)
            .add_task("c", 1)
            .add_edge("a", "b", 0)
            .add_edge("b", "c", 0)
            .add_edge("c", "a", 0)
            .build();
        assert!(matches!(result, Err(MalformedGraph::Cycle(_))));
    }
}
