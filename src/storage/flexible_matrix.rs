use crate::storage::{MatrixEntry, SparseMatrix, SparseMatrixBuilder, StateId, StateSet};
use crate::value::{Parameter, RationalFunction, ValueOps};
use num_rational::BigRational;
use std::collections::BTreeMap;

/// A single row of a [`FlexibleMatrix`], sorted by column.
pub type FlexibleRow<V> = Vec<MatrixEntry<V>>;

/// A mutable row-oriented sparse matrix.
///
/// State elimination needs to replace whole rows (merging sorted successor lists), which
/// is not possible in the row-compressed [`SparseMatrix`]. Each row is therefore a separate
/// vector which is kept sorted by column.
#[derive(Clone, PartialEq, Debug)]
pub struct FlexibleMatrix<V> {
    rows: Vec<FlexibleRow<V>>,
}

impl<V: ValueOps> FlexibleMatrix<V> {
    pub fn new(row_count: usize) -> FlexibleMatrix<V> {
        FlexibleMatrix {
            rows: vec![Vec::new(); row_count],
        }
    }

    /// Copy the rows of `matrix`, skipping zero entries.
    ///
    /// If `set_all_values_to_one` is set, all values are replaced by one. This is used for
    /// backward transitions, where only the connectivity is relevant.
    pub fn from_matrix(matrix: &SparseMatrix<V>, set_all_values_to_one: bool) -> FlexibleMatrix<V> {
        let rows = (0..matrix.row_count())
            .map(|row| {
                matrix
                    .row(StateId::new(row))
                    .iter()
                    .filter(|e| !e.value.is_zero())
                    .map(|e| {
                        if set_all_values_to_one {
                            MatrixEntry::new(e.column, V::one())
                        } else {
                            e.clone()
                        }
                    })
                    .collect()
            })
            .collect();
        FlexibleMatrix { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// # Panics
    ///
    /// Reading a row outside of `0..row_count` is a correctness violation.
    pub fn row(&self, state: StateId) -> &FlexibleRow<V> {
        self.check_row(state);
        &self.rows[state.index()]
    }

    /// # Panics
    ///
    /// Same as [`FlexibleMatrix::row`].
    pub fn row_mut(&mut self, state: StateId) -> &mut FlexibleRow<V> {
        self.check_row(state);
        &mut self.rows[state.index()]
    }

    /// Replace a row. The new row must be sorted by column.
    pub fn set_row(&mut self, state: StateId, row: FlexibleRow<V>) {
        debug_assert!(row.windows(2).all(|w| w[0].column < w[1].column));
        *self.row_mut(state) = row;
    }

    /// Remove all entries of a row and release its memory.
    pub fn clear_row(&mut self, state: StateId) {
        let row = self.row_mut(state);
        row.clear();
        row.shrink_to_fit();
    }

    pub fn has_self_loop(&self, state: StateId) -> bool {
        self.row(state)
            .binary_search_by_key(&state, |e| e.column)
            .is_ok()
    }

    /// True if the row of `state` has an entry other than a self-loop.
    pub fn has_proper_successor(&self, state: StateId) -> bool {
        let row = self.row(state);
        row.len() > 1 || row.first().map(|e| e.column != state).unwrap_or(false)
    }

    pub fn entry_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    fn check_row(&self, state: StateId) {
        assert!(
            state.index() < self.rows.len(),
            "Correctness violation: Row {} out of range for a matrix with {} rows.",
            state.index(),
            self.rows.len()
        );
    }
}

/// Tolerance for negative missing probability mass in [`FlexibleMatrix::instantiate`].
const INSTANTIATION_PRECISION: f64 = 1e-6;

impl FlexibleMatrix<RationalFunction> {
    /// Instantiate the parametric matrix for a concrete parameter `valuation`.
    ///
    /// Only the states in `filter` are kept and renumbered consecutively. If
    /// `one_step_probabilities` are given, a fresh absorbing target state receives the
    /// one-step probability of every state. If `add_sink_state` is set, a fresh absorbing
    /// sink state receives the probability mass missing in each row. With
    /// `add_self_loops`, each kept state gets an explicit (possibly zero) self-loop entry.
    ///
    /// # Panics
    ///
    /// A kept state must not have a transition to a state outside `filter`, all parameters
    /// must be assigned without hitting a pole, and the missing probability must not be
    /// negative (beyond a small numeric tolerance).
    pub fn instantiate(
        &self,
        valuation: &BTreeMap<Parameter, BigRational>,
        filter: &StateSet,
        add_sink_state: bool,
        one_step_probabilities: Option<&[RationalFunction]>,
        add_self_loops: bool,
    ) -> SparseMatrix<f64> {
        assert_eq!(
            filter.universe(),
            self.row_count(),
            "Correctness violation: Unexpected size of the filter."
        );
        if let Some(one_step) = one_step_probabilities {
            assert_eq!(
                one_step.len(),
                self.row_count(),
                "Correctness violation: Unexpected size of the one-step probabilities."
            );
        }

        let mut new_index = vec![usize::MAX; self.row_count()];
        for (index, state) in filter.iter().enumerate() {
            new_index[state.index()] = index;
        }
        let mut state_count = filter.len();
        let target_state = one_step_probabilities.map(|_| {
            state_count += 1;
            state_count - 1
        });
        let sink_state = add_sink_state.then(|| {
            state_count += 1;
            state_count - 1
        });

        let evaluate = |value: &RationalFunction| -> f64 {
            value
                .evaluate_f64(valuation)
                .expect("Correctness violation: Cannot instantiate value with the given valuation.")
        };

        let mut builder =
            SparseMatrixBuilder::<f64>::new(state_count, state_count).keep_zero_entries();
        for state in filter {
            let row = new_index[state.index()];
            let mut missing = 1.0;
            for entry in self.row(state) {
                let column = new_index[entry.column.index()];
                assert_ne!(
                    column,
                    usize::MAX,
                    "Illegal filter: Selected a state that has a transition to an unselected state."
                );
                let value = evaluate(&entry.value);
                missing -= value;
                builder.add(row, column, value);
            }
            if add_self_loops && !self.has_self_loop(state) {
                builder.add(row, row, 0.0);
            }
            if let (Some(target), Some(one_step)) = (target_state, one_step_probabilities) {
                let value = &one_step[state.index()];
                if !value.is_zero() {
                    let value = evaluate(value);
                    missing -= value;
                    builder.add(row, target, value);
                }
            }
            if let Some(sink) = sink_state {
                assert!(
                    missing > -INSTANTIATION_PRECISION,
                    "Correctness violation: The missing probability is negative ({missing})."
                );
                builder.add(row, sink, missing.max(0.0));
            }
        }
        if let Some(target) = target_state {
            builder.add(target, target, 1.0);
        }
        if let Some(sink) = sink_state {
            builder.add(sink, sink, 1.0);
        }
        builder.build()
    }
}
