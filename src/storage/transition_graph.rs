use crate::storage::{SparseMatrix, StateId, StateSet};
use crate::value::ValueOps;
use std::sync::Arc;

/// The topology of a transition matrix: successor and predecessor lists of every state.
///
/// The lists are shared, so cloning a graph is cheap. Reachability and SCC algorithms use
/// a graph together with a "universe" [`StateSet`] instead of building restricted copies.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionGraph {
    successors: Arc<Vec<Vec<StateId>>>,
    predecessors: Arc<Vec<Vec<StateId>>>,
}

impl<V: ValueOps> From<&SparseMatrix<V>> for TransitionGraph {
    fn from(matrix: &SparseMatrix<V>) -> Self {
        TransitionGraph::from_edges(
            matrix.row_count(),
            matrix
                .iter()
                .filter(|(_, _, value)| !value.is_zero())
                .map(|(row, column, _)| (row.index(), column.index())),
        )
    }
}

impl TransitionGraph {
    /// Build a graph over `state_count` states from `(source, target)` pairs.
    pub fn from_edges<I: IntoIterator<Item = (usize, usize)>>(
        state_count: usize,
        edges: I,
    ) -> TransitionGraph {
        let mut successors = vec![Vec::new(); state_count];
        let mut predecessors = vec![Vec::new(); state_count];
        for (source, target) in edges {
            assert!(
                source < state_count && target < state_count,
                "Edge {source} -> {target} out of range for {state_count} states."
            );
            successors[source].push(StateId::new(target));
            predecessors[target].push(StateId::new(source));
        }
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort();
            list.dedup();
        }
        TransitionGraph {
            successors: Arc::new(successors),
            predecessors: Arc::new(predecessors),
        }
    }

    pub fn state_count(&self) -> usize {
        self.successors.len()
    }

    pub fn mk_empty_states(&self) -> StateSet {
        StateSet::empty(self.state_count())
    }

    pub fn mk_all_states(&self) -> StateSet {
        StateSet::full(self.state_count())
    }

    pub fn successors(&self, state: StateId) -> &[StateId] {
        &self.successors[state.index()]
    }

    pub fn predecessors(&self, state: StateId) -> &[StateId] {
        &self.predecessors[state.index()]
    }

    pub fn has_self_loop(&self, state: StateId) -> bool {
        self.successors(state).binary_search(&state).is_ok()
    }

    /// The same graph with every edge reversed.
    pub fn reversed(&self) -> TransitionGraph {
        TransitionGraph {
            successors: self.predecessors.clone(),
            predecessors: self.successors.clone(),
        }
    }

    /// Successors of `set` that lie in `within`.
    pub fn post_within(&self, set: &StateSet, within: &StateSet) -> StateSet {
        let mut result = self.mk_empty_states();
        for state in set {
            for successor in self.successors(state) {
                if within.contains(*successor) {
                    result.insert(*successor);
                }
            }
        }
        result
    }

    /// Predecessors of `set` that lie in `within`.
    pub fn pre_within(&self, set: &StateSet, within: &StateSet) -> StateSet {
        let mut result = self.mk_empty_states();
        for state in set {
            for predecessor in self.predecessors(state) {
                if within.contains(*predecessor) {
                    result.insert(*predecessor);
                }
            }
        }
        result
    }
}
