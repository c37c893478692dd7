use crate::elimination::{EliminationProgress, ProgressCallback};
use crate::storage::{FlexibleMatrix, FlexibleRow, MatrixEntry, SparseMatrix, StateId, StateSet};
use crate::value::{RationalFunction, ValueOps};
use log::{debug, info, trace};

/// The per-state values that are updated together with the transition structure.
///
/// In probability mode, the value of a state is the probability of reaching the target in
/// one step. In reward mode, it is the reward collected when leaving the state.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateValues<V> {
    Probabilities(Vec<V>),
    Rewards(Vec<V>),
}

impl<V> StateValues<V> {
    pub fn as_slice(&self) -> &[V] {
        match self {
            StateValues::Probabilities(values) | StateValues::Rewards(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn is_rewards(&self) -> bool {
        matches!(self, StateValues::Rewards(_))
    }
}

impl<V: ValueOps> StateValues<V> {
    /// States with a non-zero value.
    pub fn support(&self) -> StateSet {
        let values = self.as_slice();
        StateSet::from_states(
            values.len(),
            (0..values.len())
                .filter(|i| !values[*i].is_zero())
                .map(StateId::new),
        )
    }
}

/// The mutable state of a single state elimination run: forward transitions, backward
/// transitions (topology only, all values are one) and the [`StateValues`].
///
/// The forward and backward matrices are kept consistent after every
/// [`EliminationProblem::eliminate_state`].
#[derive(Clone)]
pub struct EliminationProblem<V> {
    forward: FlexibleMatrix<V>,
    backward: FlexibleMatrix<V>,
    values: StateValues<V>,
    eliminated: usize,
    maximal_depth: usize,
    progress: ProgressTracker,
}

#[derive(Clone, Default)]
struct ProgressTracker {
    callback: Option<ProgressCallback>,
    start: usize,
    total: usize,
    chunk: usize,
    next_report: usize,
}

impl<V: ValueOps> Default for EliminationProblem<V> {
    fn default() -> Self {
        EliminationProblem {
            forward: FlexibleMatrix::new(0),
            backward: FlexibleMatrix::new(0),
            values: StateValues::Probabilities(Vec::new()),
            eliminated: 0,
            maximal_depth: 0,
            progress: ProgressTracker::default(),
        }
    }
}

impl<V: ValueOps> EliminationProblem<V> {
    /// Create a problem from a square transition matrix and matching per-state values.
    pub fn new(matrix: &SparseMatrix<V>, values: StateValues<V>) -> EliminationProblem<V> {
        assert_eq!(matrix.row_count(), matrix.column_count());
        assert_eq!(
            matrix.row_count(),
            values.len(),
            "Correctness violation: Unexpected size of the state values."
        );
        EliminationProblem {
            forward: FlexibleMatrix::from_matrix(matrix, false),
            backward: FlexibleMatrix::from_matrix(&matrix.transpose(), true),
            values,
            eliminated: 0,
            maximal_depth: 0,
            progress: ProgressTracker::default(),
        }
    }

    pub fn state_count(&self) -> usize {
        self.forward.row_count()
    }

    pub fn forward(&self) -> &FlexibleMatrix<V> {
        &self.forward
    }

    pub fn backward(&self) -> &FlexibleMatrix<V> {
        &self.backward
    }

    pub fn values(&self) -> &StateValues<V> {
        &self.values
    }

    pub fn value(&self, state: StateId) -> &V {
        &self.values.as_slice()[state.index()]
    }

    /// Number of [`EliminationProblem::eliminate_state`] calls so far.
    pub fn eliminated_count(&self) -> usize {
        self.eliminated
    }

    /// The deepest SCC recursion level reached by the hybrid method.
    pub fn maximal_depth(&self) -> usize {
        self.maximal_depth
    }

    pub(crate) fn record_depth(&mut self, depth: usize) {
        self.maximal_depth = self.maximal_depth.max(depth);
    }

    /// Report progress to `callback` every time another 10% of `total` eliminations
    /// have been performed, and once all of them are done.
    pub fn set_progress(&mut self, total: usize, callback: Option<ProgressCallback>) {
        let chunk = (total / 10).max(1);
        self.progress = ProgressTracker {
            callback,
            start: self.eliminated,
            total,
            chunk,
            next_report: self.eliminated + chunk,
        };
    }

    /// Remove `state` from the chain, redirecting all probability mass that flows through
    /// it to its successors.
    ///
    /// If `remove_forward_transitions` is not set, the (rescaled, loop-free) outgoing
    /// transitions of `state` are kept. If a `constraint` is given, only predecessors in
    /// the constraint are redirected; the remaining predecessors keep their transition
    /// into `state`, such that elimination can be resumed with a different constraint.
    ///
    /// # Panics
    ///
    /// The self-loop probability of `state` must not be one, and the forward and backward
    /// matrices must be consistent.
    pub fn eliminate_state(
        &mut self,
        state: StateId,
        remove_forward_transitions: bool,
        constraint: Option<&StateSet>,
    ) {
        trace!("Eliminating state {state}.");
        let mut state_row = std::mem::take(self.forward.row_mut(state));

        // Find the self-loop; it is erased from a row that is kept.
        let loop_position = state_row.binary_search_by_key(&state, |e| e.column).ok();
        let loop_probability = match loop_position {
            Some(i) if !remove_forward_transitions => Some(state_row.remove(i).value),
            Some(i) => Some(state_row[i].value.clone()),
            None => None,
        };

        let loop_factor = loop_probability.map(|probability| {
            assert!(
                !probability.is_one(),
                "Correctness violation: State {state} has a self-loop with probability one."
            );
            let factor = probability.invert_complement().simplify();
            for entry in state_row.iter_mut().filter(|e| e.column != state) {
                entry.value = entry.value.mul(&factor).simplify();
            }
            if let StateValues::Probabilities(values) = &mut self.values {
                values[state.index()] = values[state.index()].mul(&factor).simplify();
            }
            factor
        });

        let predecessors: Vec<StateId> =
            self.backward.row(state).iter().map(|e| e.column).collect();
        let mut redirected = Vec::with_capacity(predecessors.len());
        let mut kept_predecessors: FlexibleRow<V> = Vec::new();
        for predecessor in predecessors {
            if predecessor == state {
                continue;
            }
            if let Some(filter) = constraint
                && !filter.contains(predecessor)
            {
                kept_predecessors.push(MatrixEntry::new(predecessor, V::one()));
                continue;
            }

            let predecessor_row = self.forward.row(predecessor);
            let Ok(position) = predecessor_row.binary_search_by_key(&state, |e| e.column) else {
                panic!("Correctness violation: Missing transition {predecessor} -> {state}.");
            };
            let multiplier = predecessor_row[position].value.clone();
            let merged = merge_forward_rows(predecessor_row, &state_row, &multiplier, state);
            self.forward.set_row(predecessor, merged);

            match &mut self.values {
                StateValues::Probabilities(values) => {
                    let flow = multiplier.mul(&values[state.index()]).simplify();
                    values[predecessor.index()] = values[predecessor.index()].add(&flow).simplify();
                }
                StateValues::Rewards(values) => {
                    let flow = match &loop_factor {
                        Some(factor) => multiplier.mul(factor).mul(&values[state.index()]),
                        None => multiplier.mul(&values[state.index()]),
                    }
                    .simplify();
                    values[predecessor.index()] = values[predecessor.index()].add(&flow).simplify();
                }
            }
            redirected.push(predecessor);
        }

        for successor in state_row.iter().map(|e| e.column) {
            if successor == state {
                continue;
            }
            let successor_row = self.backward.row_mut(successor);
            if remove_forward_transitions {
                let position = successor_row
                    .binary_search_by_key(&state, |e| e.column)
                    .expect("Correctness violation: Backward transitions are inconsistent.");
                successor_row.remove(position);
            }
            let merged = merge_backward_rows(successor_row, &redirected);
            self.backward.set_row(successor, merged);
        }

        if remove_forward_transitions {
            self.forward.clear_row(state);
        } else {
            self.forward.set_row(state, state_row);
        }
        if constraint.is_none() {
            self.backward.clear_row(state);
        } else {
            self.backward.set_row(state, kept_predecessors);
        }

        self.eliminated += 1;
        self.report_progress();
    }

    /// Resolve the remaining self-loop of the last (initial) state and return its value.
    ///
    /// All other states must already be eliminated. In probability mode, this is a regular
    /// elimination. In reward mode, the reward is rescaled by the expected number of
    /// self-loop visits.
    ///
    /// # Panics
    ///
    /// In reward mode, the state must not have transitions other than a self-loop.
    pub fn eliminate_last_state(&mut self, state: StateId) -> V {
        if let StateValues::Rewards(values) = &mut self.values {
            let row = self.forward.row(state);
            assert!(
                row.iter().all(|e| e.column == state),
                "Correctness violation: The last state has transitions to other states."
            );
            if let Some(entry) = row.first() {
                assert!(
                    !entry.value.is_one(),
                    "Correctness violation: State {state} has a self-loop with probability one."
                );
                let factor = entry.value.invert_complement().simplify();
                values[state.index()] = values[state.index()].mul(&factor).simplify();
            }
            self.forward.clear_row(state);
            self.backward.clear_row(state);
        } else {
            self.eliminate_state(state, true, None);
        }
        self.value(state).clone().simplify()
    }

    fn report_progress(&mut self) {
        let progress = &mut self.progress;
        let done = self.eliminated - progress.start;
        let finished = done == progress.total;
        if progress.total == 0 || (self.eliminated < progress.next_report && !finished) {
            return;
        }
        progress.next_report = self.eliminated + progress.chunk;
        let snapshot = EliminationProgress {
            eliminated: done.min(progress.total),
            total: progress.total,
        };
        info!(
            "Eliminated {} of {} states.",
            snapshot.eliminated, snapshot.total
        );
        if let Some(callback) = &progress.callback {
            callback(&snapshot);
        }
    }
}

impl EliminationProblem<RationalFunction> {
    /// Eliminate every state outside `protected` whose outgoing transitions are all
    /// constant at the moment it is visited. States are visited in increasing order, so an
    /// earlier elimination can make a later row parametric.
    ///
    /// Returns the states that remain: the reduced parametric subsystem.
    pub fn eliminate_constant_states(&mut self, protected: &StateSet) -> StateSet {
        let mut remaining = StateSet::full(self.state_count());
        for state in protected.complement().iter() {
            let row = self.forward.row(state);
            let constant = row.iter().all(|e| e.value.constant_value().is_some());
            let absorbing = row.iter().any(|e| e.column == state && e.value.is_one());
            if constant && !absorbing {
                self.eliminate_state(state, true, None);
                remaining.remove(state);
            }
        }
        debug!(
            "Eliminated {} constant states, {} states remain.",
            self.state_count() - remaining.len(),
            remaining.len()
        );
        remaining
    }
}

/// Merge the forward row of a predecessor with the row of the eliminated `state`,
/// scaled by `multiplier`. Entries pointing to `state` are dropped.
fn merge_forward_rows<V: ValueOps>(
    predecessor_row: &[MatrixEntry<V>],
    state_row: &[MatrixEntry<V>],
    multiplier: &V,
    state: StateId,
) -> FlexibleRow<V> {
    let mut result = Vec::with_capacity(predecessor_row.len() + state_row.len());
    let mut first = predecessor_row.iter().filter(|e| e.column != state).peekable();
    let mut second = state_row.iter().filter(|e| e.column != state).peekable();
    loop {
        match (first.peek(), second.peek()) {
            (Some(a), Some(b)) if a.column == b.column => {
                let flow = multiplier.mul(&b.value).simplify();
                result.push(MatrixEntry::new(a.column, a.value.add(&flow).simplify()));
                first.next();
                second.next();
            }
            (Some(a), Some(b)) if a.column < b.column => {
                result.push((*a).clone());
                first.next();
            }
            (_, Some(b)) => {
                let flow = multiplier.mul(&b.value).simplify();
                result.push(MatrixEntry::new(b.column, flow));
                second.next();
            }
            (Some(a), None) => {
                result.push((*a).clone());
                first.next();
            }
            (None, None) => break,
        }
    }
    result
}

/// Sorted union of a backward row with the `added` predecessors (sorted, all values one).
fn merge_backward_rows<V: ValueOps>(row: &[MatrixEntry<V>], added: &[StateId]) -> FlexibleRow<V> {
    let mut result = Vec::with_capacity(row.len() + added.len());
    let mut first = row.iter().peekable();
    let mut second = added.iter().peekable();
    loop {
        match (first.peek(), second.peek()) {
            (Some(a), Some(b)) if a.column == **b => {
                result.push((*a).clone());
                first.next();
                second.next();
            }
            (Some(a), Some(b)) if a.column < **b => {
                result.push((*a).clone());
                first.next();
            }
            (_, Some(b)) => {
                result.push(MatrixEntry::new(**b, V::one()));
                second.next();
            }
            (Some(a), None) => {
                result.push((*a).clone());
                first.next();
            }
            (None, None) => break,
        }
    }
    result
}
