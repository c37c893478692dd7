pub mod chains;
pub mod example_graph;
pub mod random_models;

use crate::storage::{StateId, StateSet, TransitionGraph};

/// Initialize env_logger for tests. Safe to call multiple times.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Creates a set of states of `graph` from a list of state indices.
///
/// # Example
///
/// `mk_states(graph, &[0, 5, 7])` creates the set `{0, 5, 7}`.
pub fn mk_states(graph: &TransitionGraph, states: &[usize]) -> StateSet {
    StateSet::from_indices(graph.state_count(), states)
}

/// Collect the indices of all states in `set`, in increasing order.
pub fn collect_states(set: &StateSet) -> Vec<usize> {
    set.iter().map(StateId::index).collect()
}

/// Convert a slice of state sets into sorted vectors of state indices.
///
/// The result is sorted by size and then lexicographically, so that sets produced by
/// different algorithms (or in a different order) can be compared directly.
pub fn sets_to_sorted_vectors(sets: &[StateSet]) -> Vec<Vec<usize>> {
    let mut result: Vec<Vec<usize>> = sets.iter().map(collect_states).collect();
    result.sort_by_cached_key(|s| (s.len(), s.clone()));
    result
}
