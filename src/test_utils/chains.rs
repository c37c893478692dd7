//! Small hand-written chains and reference solvers for elimination tests.

use crate::elimination::{EliminationProblem, StateValues};
use crate::storage::{SparseMatrix, SparseMatrixBuilder, StateId, TransitionGraph};

/// Build a square matrix over `state_count` states from `(source, target, value)` triples.
pub fn mk_matrix(state_count: usize, transitions: &[(usize, usize, f64)]) -> SparseMatrix<f64> {
    let mut builder = SparseMatrixBuilder::new(state_count, state_count);
    for (source, target, value) in transitions {
        builder.add(*source, *target, *value);
    }
    builder.build()
}

/// A probability-mode problem together with its topology.
pub fn mk_problem(
    transitions: &[(usize, usize, f64)],
    one_step: &[f64],
) -> (EliminationProblem<f64>, TransitionGraph) {
    let matrix = mk_matrix(one_step.len(), transitions);
    let graph = TransitionGraph::from(&matrix);
    let problem = EliminationProblem::new(&matrix, StateValues::Probabilities(one_step.to_vec()));
    (problem, graph)
}

/// A five state chain with loops, a self-loop and probability mass that is lost.
///
/// ```text
/// 0: -> 1 (0.5), -> 2 (0.3)
/// 1: -> 2 (0.4), -> 3 (0.6)
/// 2: -> 1 (0.2), -> 4 (0.5), target (0.3)
/// 3: -> 0 (0.1), -> 3 (0.3), target (0.6)
/// 4: -> 4 (0.5), -> 2 (0.1), target (0.25)
/// ```
pub fn example_chain() -> (Vec<(usize, usize, f64)>, Vec<f64>) {
    let transitions = vec![
        (0, 1, 0.5),
        (0, 2, 0.3),
        (1, 2, 0.4),
        (1, 3, 0.6),
        (2, 1, 0.2),
        (2, 4, 0.5),
        (3, 0, 0.1),
        (3, 3, 0.3),
        (4, 4, 0.5),
        (4, 2, 0.1),
    ];
    let one_step = vec![0.0, 0.0, 0.3, 0.6, 0.25];
    (transitions, one_step)
}

/// Solve `x = values + M * x` over the current forward transitions of `problem` by value
/// iteration. Eliminated states keep their value.
pub fn solve_problem(problem: &EliminationProblem<f64>) -> Vec<f64> {
    let values = problem.values().as_slice();
    let mut x = values.to_vec();
    for _ in 0..1_000_000 {
        let mut change: f64 = 0.0;
        let mut next = x.clone();
        for (state, next_value) in next.iter_mut().enumerate() {
            let row = problem.forward().row(StateId::new(state));
            if row.is_empty() {
                continue;
            }
            let sum: f64 = row.iter().map(|e| e.value * x[e.column.index()]).sum();
            *next_value = values[state] + sum;
            change = change.max((*next_value - x[state]).abs());
        }
        x = next;
        if change < 1e-15 {
            break;
        }
    }
    x
}

/// Check that the backward matrix contains exactly the reversed edges of the forward matrix.
pub fn assert_consistent<V: crate::value::ValueOps>(problem: &EliminationProblem<V>) {
    let n = problem.state_count();
    for source in (0..n).map(StateId::new) {
        for entry in problem.forward().row(source) {
            assert!(
                problem
                    .backward()
                    .row(entry.column)
                    .iter()
                    .any(|e| e.column == source),
                "Edge {source} -> {} is missing in the backward matrix.",
                entry.column
            );
        }
        for entry in problem.backward().row(source) {
            assert!(
                problem
                    .forward()
                    .row(entry.column)
                    .iter()
                    .any(|e| e.column == source),
                "Backward edge {source} <- {} is missing in the forward matrix.",
                entry.column
            );
        }
    }
}
