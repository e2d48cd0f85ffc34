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

//! Fixture graphs and schedule validation shared by the unit tests of the
//! various modules.

use crate::{Schedule, TaskGraph};

/// The reference five-task instance: a(2) b(3) c(1) d(2) e(1) with edges
/// a->c(1), a->d(1), b->d(1), c->e(1), d->e(1). Its optimal makespan on two
/// processors is 6.
pub fn sample_graph() -> TaskGraph {
    TaskGraph::builder()
        .add_task("a", 2)
        .add_task("b", 3)
        .add_task("c", 1)
        .add_task("d", 2)
        .add_task("e", 1)
        .add_edge("a", "c", 1)
        .add_edge("a", "d", 1)
        .add_edge("b", "d", 1)
        .add_edge("c", "e", 1)
        .add_edge("d", "e", 1)
        .build()
        .unwrap()
}

/// A seven-task instance with two fork-join layers and uneven communication
/// costs; small enough for the exhaustive baseline, lumpy enough to make the
/// pruning rules work.
pub fn layered_graph() -> TaskGraph {
    TaskGraph::builder()
        .add_task("in", 3)
        .add_task("l1", 4)
        .add_task("l2", 2)
        .add_task("l3", 5)
        .add_task("m1", 3)
        .add_task("m2", 1)
        .add_task("out", 2)
        .add_edge("in", "l1", 2)
        .add_edge("in", "l2", 1)
        .add_edge("in", "l3", 3)
        .add_edge("l1", "m1", 1)
        .add_edge("l2", "m1", 2)
        .add_edge("l2", "m2", 1)
        .add_edge("l3", "m2", 2)
        .add_edge("m1", "out", 1)
        .add_edge("m2", "out", 2)
        .build()
        .unwrap()
}

/// Checks that `schedule` is a feasible schedule of `graph` on `nb_procs`
/// processors: precedence, communication delays, processor occupancy and the
/// reported makespan must all hold. Panics with a descriptive message when
/// one of them does not.
pub fn validate_schedule(graph: &TaskGraph, schedule: &Schedule, nb_procs: usize) {
    let mut latest_finish = 0;
    for assignment in schedule.assignments() {
        let task = graph.task(assignment.task);
        assert!(
            assignment.processor < nb_procs,
            "task `{}` placed on processor {} of {}",
            task.name(),
            assignment.processor,
            nb_procs
        );
        latest_finish = latest_finish.max(assignment.start + task.weight());

        for &(pred, cost) in task.predecessors() {
            let pa = schedule.assignment(pred);
            let mut ready = pa.start + graph.task(pred).weight();
            if pa.processor != assignment.processor {
                ready += cost;
            }
            assert!(
                assignment.start >= ready,
                "task `{}` starts at {} but `{}` only delivers at {}",
                task.name(),
                assignment.start,
                graph.task(pred).name(),
                ready
            );
        }
    }
    assert_eq!(latest_finish, schedule.makespan(), "inconsistent makespan");

    for proc in 0..nb_procs {
        let mut lane: Vec<_> = schedule
            .assignments()
            .iter()
            .filter(|a| a.processor == proc)
            .collect();
        lane.sort_by_key(|a| a.start);
        for pair in lane.windows(2) {
            let first_finish = pair[0].start + graph.task(pair[0].task).weight();
            assert!(
                pair[1].start >= first_finish,
                "tasks `{}` and `{}` overlap on processor {}",
                graph.task(pair[0].task).name(),
                graph.task(pair[1].task).name(),
                proc
            );
        }
    }
}
