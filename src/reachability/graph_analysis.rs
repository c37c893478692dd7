//! Qualitative analysis of a DTMC on its transition graph.
//!
//! All functions take the graph in its forward orientation. A "forward" variant of
//! a backward analysis is obtained by passing [`TransitionGraph::reversed`].

use crate::log_set;
use crate::reachability::{BackwardReachability, ForwardReachability, ReachabilityConfig};
use crate::storage::{StateId, StateSet, TransitionGraph};
use cancel_this::{Cancellable, is_cancelled};
use computation_process::Algorithm;
use log::debug;
use std::collections::VecDeque;

/// States that reach `psi` with positive probability while only passing through `phi`.
///
/// The `psi` states themselves are always included.
pub fn prob_greater_0(
    graph: &TransitionGraph,
    phi: &StateSet,
    psi: &StateSet,
) -> Cancellable<StateSet> {
    let config = ReachabilityConfig::from(graph).restrict(phi.clone());
    let result = BackwardReachability::run(config, psi)?;
    debug!("Computed `prob > 0` states ({}).", log_set(&result));
    Ok(result)
}

/// States that reach `psi` with probability zero while only passing through `phi`.
pub fn prob_0(graph: &TransitionGraph, phi: &StateSet, psi: &StateSet) -> Cancellable<StateSet> {
    Ok(prob_greater_0(graph, phi, psi)?.complement())
}

/// States that reach `psi` with probability one while only passing through `phi`, given
/// the states with positive probability computed by [`prob_greater_0`].
///
/// A state has probability one if and only if it cannot reach a state with probability
/// zero without passing through `psi` first.
pub fn prob_1(
    graph: &TransitionGraph,
    psi: &StateSet,
    prob_greater_0: &StateSet,
) -> Cancellable<StateSet> {
    let config = ReachabilityConfig::from(graph).restrict(psi.complement());
    let can_fail = BackwardReachability::run(config, prob_greater_0.complement())?;
    let result = can_fail.complement();
    debug!("Computed `prob = 1` states ({}).", log_set(&result));
    Ok(result)
}

/// Compute the `(prob = 0, prob = 1)` partition for the `phi U psi` objective.
pub fn prob_01(
    graph: &TransitionGraph,
    phi: &StateSet,
    psi: &StateSet,
) -> Cancellable<(StateSet, StateSet)> {
    let greater_0 = prob_greater_0(graph, phi, psi)?;
    let prob_1 = prob_1(graph, psi, &greater_0)?;
    Ok((greater_0.complement(), prob_1))
}

/// States reachable from `initial` when only entering states in `constraint` or `target`,
/// and never leaving a `target` state.
///
/// The `initial` states are always included.
pub fn reachable_states(
    graph: &TransitionGraph,
    initial: &StateSet,
    constraint: &StateSet,
    target: &StateSet,
) -> Cancellable<StateSet> {
    let config = ReachabilityConfig::from(graph)
        .restrict(constraint.union(target))
        .stop_at(target.clone());
    ForwardReachability::run(config, initial)
}

/// The BFS distance (number of transitions) of every state from the `sources`.
///
/// States that cannot be reached get `usize::MAX`.
pub fn distances(graph: &TransitionGraph, sources: &StateSet) -> Cancellable<Vec<usize>> {
    let mut result = vec![usize::MAX; graph.state_count()];
    let mut queue = VecDeque::new();
    for source in sources {
        result[source.index()] = 0;
        queue.push_back(source);
    }
    while let Some(state) = queue.pop_front() {
        is_cancelled!()?;
        let next = result[state.index()] + 1;
        for successor in graph.successors(state) {
            let successor: StateId = *successor;
            if result[successor.index()] == usize::MAX {
                result[successor.index()] = next;
                queue.push_back(successor);
            }
        }
    }
    Ok(result)
}
