//! End-to-end scenarios exercised through the public API only: the reference
//! instances with known optima, the agreement between every solver flavor,
//! and the listener contract.

use std::sync::Arc;
use std::sync::Mutex;

use optsched::*;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The reference five-task instance; its optimal makespan on two processors
/// is 6 (e.g. one processor runs a[0-2] c[2-3], the other b[0-3] d[3-5]
/// e[5-6]).
fn sample_graph() -> Arc<TaskGraph> {
    Arc::new(
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
            .unwrap(),
    )
}

/// A graph whose optimum requires colocating both producers with their
/// expensive consumer; the greedy seed does not find it.
fn comm_heavy_graph() -> Arc<TaskGraph> {
    Arc::new(
        TaskGraph::builder()
            .add_task("t1", 1)
            .add_task("t2", 1)
            .add_task("t3", 10)
            .add_edge("t1", "t3", 10)
            .add_edge("t2", "t3", 10)
            .build()
            .unwrap(),
    )
}

fn sequential_makespan(graph: &Arc<TaskGraph>, nb_procs: usize) -> usize {
    let listener = SilentListener;
    let mut frontier = LifoFrontier::new();
    let mut solver =
        SequentialSolver::new(Arc::clone(graph), nb_procs, &listener, &mut frontier).unwrap();
    solver.minimize().makespan()
}

#[test]
fn the_reference_instance_is_solved_to_its_known_optimum() {
    init_logs();
    assert_eq!(6, sequential_makespan(&sample_graph(), 2));
}

#[test]
fn a_single_task_costs_its_own_weight_on_any_machine() {
    init_logs();
    let graph = Arc::new(TaskGraph::builder().add_task("only", 13).build().unwrap());
    for nb_procs in [1, 2, 5, 32] {
        assert_eq!(13, sequential_makespan(&graph, nb_procs));
    }
}

#[test]
fn unrelated_tasks_run_fully_parallel_when_processors_abound() {
    init_logs();
    let graph = Arc::new(
        TaskGraph::builder()
            .add_task("a", 6)
            .add_task("b", 1)
            .add_task("c", 4)
            .build()
            .unwrap(),
    );
    for nb_procs in [3, 4, 10] {
        assert_eq!(6, sequential_makespan(&graph, nb_procs));
    }
}

#[test]
fn every_solver_flavor_agrees_on_the_optimal_makespan() {
    init_logs();
    for (graph, nb_procs) in [
        (sample_graph(), 2),
        (sample_graph(), 3),
        (comm_heavy_graph(), 2),
    ] {
        let brute = exhaustive_schedule(&graph, nb_procs).makespan();
        assert_eq!(brute, sequential_makespan(&graph, nb_procs));

        let listener = SilentListener;
        for workers in [1, 2, 4, 8] {
            let mut solver = ParallelSolver::new(Arc::clone(&graph), nb_procs, &listener)
                .unwrap()
                .with_nb_workers(workers);
            assert_eq!(brute, solver.minimize().makespan());
        }
    }
}

#[test]
fn the_optimum_never_loses_to_either_baseline() {
    init_logs();
    let graph = sample_graph();
    let serial = single_processor_schedule(&graph).makespan();
    let greedy = greedy_schedule(&graph, 2).to_schedule().makespan();
    let optimal = sequential_makespan(&graph, 2);
    assert!(optimal <= greedy);
    assert!(optimal <= serial);
}

/// Records every listener notification, to check the callback contract.
#[derive(Default)]
struct Recorder {
    optima: Mutex<Vec<usize>>,
    pruned: Mutex<Vec<u128>>,
    completed: Mutex<Vec<usize>>,
}
impl SearchListener for Recorder {
    fn on_new_optimal(&self, schedule: &Schedule) {
        self.optima.lock().unwrap().push(schedule.makespan());
    }
    fn on_completed(&self, schedule: &Schedule) {
        self.completed.lock().unwrap().push(schedule.makespan());
    }
    fn on_branches_pruned(&self, total: u128) {
        self.pruned.lock().unwrap().push(total);
    }
}

#[test]
fn the_listener_contract_holds_for_both_solvers() {
    init_logs();
    let graph = comm_heavy_graph();

    let sequential = Recorder::default();
    let mut frontier = LifoFrontier::new();
    let mut solver = SequentialSolver::new(Arc::clone(&graph), 2, &sequential, &mut frontier).unwrap();
    let best = solver.minimize();
    check_listener_contract(&sequential, best.makespan());

    let parallel = Recorder::default();
    let mut solver = ParallelSolver::new(graph, 2, &parallel).unwrap().with_nb_workers(4);
    let best = solver.minimize();
    check_listener_contract(&parallel, best.makespan());
}

fn check_listener_contract(recorder: &Recorder, best: usize) {
    let optima = recorder.optima.lock().unwrap();
    // at least the greedy seed, and strictly decreasing thereafter
    assert!(!optima.is_empty());
    for pair in optima.windows(2) {
        assert!(pair[1] < pair[0], "optima not strictly decreasing: {optima:?}");
    }
    assert_eq!(best, *optima.last().unwrap());

    // completion fires exactly once, with the final schedule
    assert_eq!(vec![best], *recorder.completed.lock().unwrap());

    // the advisory pruning signal never decreases
    let pruned = recorder.pruned.lock().unwrap();
    for pair in pruned.windows(2) {
        assert!(pair[1] >= pair[0], "pruning totals decreased: {pruned:?}");
    }
}
