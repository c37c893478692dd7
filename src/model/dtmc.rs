use crate::log_set;
use crate::model::ModelError;
use crate::storage::{SparseMatrix, SparseMatrixBuilder, StateId, StateSet, TransitionGraph};
use crate::value::ValueOps;
use log::debug;
use std::collections::BTreeMap;

/// The label that marks the initial states in the explicit format.
pub const INIT_LABEL: &str = "init";

/// Maximal deviation of a floating point row sum from one.
pub const STOCHASTIC_TOLERANCE: f64 = 1e-6;

/// A labelled discrete-time Markov chain with optional state and transition rewards.
#[derive(Clone, Debug)]
pub struct Dtmc<V> {
    transition_matrix: SparseMatrix<V>,
    initial_states: StateSet,
    labeling: BTreeMap<String, StateSet>,
    state_rewards: Option<Vec<V>>,
    transition_rewards: Option<SparseMatrix<V>>,
    graph: TransitionGraph,
}

impl<V: ValueOps> Dtmc<V> {
    pub fn state_count(&self) -> usize {
        self.transition_matrix.row_count()
    }

    pub fn transition_matrix(&self) -> &SparseMatrix<V> {
        &self.transition_matrix
    }

    /// The transposed transition matrix.
    pub fn backward_transitions(&self) -> SparseMatrix<V> {
        self.transition_matrix.transpose()
    }

    /// The topology of the transition matrix.
    pub fn graph(&self) -> &TransitionGraph {
        &self.graph
    }

    pub fn initial_states(&self) -> &StateSet {
        &self.initial_states
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labeling.contains_key(label)
    }

    /// The states carrying `label`, if the label exists.
    pub fn states_with_label(&self, label: &str) -> Option<&StateSet> {
        self.labeling.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labeling.keys().map(String::as_str)
    }

    pub fn state_rewards(&self) -> Option<&[V]> {
        self.state_rewards.as_deref()
    }

    pub fn transition_rewards(&self) -> Option<&SparseMatrix<V>> {
        self.transition_rewards.as_ref()
    }

    pub fn has_rewards(&self) -> bool {
        self.state_rewards.is_some() || self.transition_rewards.is_some()
    }
}

/// Incrementally assembles a [`Dtmc`].
///
/// ```rust
/// use dtmc_state_elimination::model::DtmcBuilder;
///
/// let mut builder = DtmcBuilder::<f64>::new(2);
/// builder.add_transition(0, 1, 0.5).unwrap();
/// builder.add_transition(0, 0, 0.5).unwrap();
/// builder.add_transition(1, 1, 1.0).unwrap();
/// builder.add_initial_state(0).unwrap();
/// builder.add_label("goal", 1).unwrap();
///
/// let dtmc = builder.build().unwrap();
/// assert_eq!(dtmc.state_count(), 2);
/// assert!(dtmc.has_label("goal"));
/// ```
pub struct DtmcBuilder<V> {
    state_count: usize,
    transitions: SparseMatrixBuilder<V>,
    initial_states: StateSet,
    labeling: BTreeMap<String, StateSet>,
    state_rewards: Option<Vec<V>>,
    transition_rewards: Option<SparseMatrixBuilder<V>>,
}

impl<V: ValueOps> DtmcBuilder<V> {
    pub fn new(state_count: usize) -> DtmcBuilder<V> {
        DtmcBuilder {
            state_count,
            transitions: SparseMatrixBuilder::new(state_count, state_count),
            initial_states: StateSet::empty(state_count),
            labeling: BTreeMap::new(),
            state_rewards: None,
            transition_rewards: None,
        }
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn add_transition(
        &mut self,
        source: usize,
        target: usize,
        value: V,
    ) -> Result<(), ModelError> {
        self.check_state(source)?;
        self.check_state(target)?;
        if !is_probability(&value) {
            return Err(ModelError::InvalidProbability {
                state: source,
                successor: target,
                value: value.to_string(),
            });
        }
        self.transitions.add(source, target, value);
        Ok(())
    }

    pub fn add_initial_state(&mut self, state: usize) -> Result<(), ModelError> {
        self.check_state(state)?;
        self.initial_states.insert(StateId::new(state));
        Ok(())
    }

    /// Ensure `label` exists, even if no state carries it.
    pub fn declare_label(&mut self, label: &str) {
        if !self.labeling.contains_key(label) {
            self.labeling
                .insert(label.to_string(), StateSet::empty(self.state_count));
        }
    }

    /// Attach `label` to `state`. The [`INIT_LABEL`] also marks the state as initial.
    pub fn add_label(&mut self, label: &str, state: usize) -> Result<(), ModelError> {
        self.check_state(state)?;
        self.declare_label(label);
        if let Some(states) = self.labeling.get_mut(label) {
            states.insert(StateId::new(state));
        }
        if label == INIT_LABEL {
            self.initial_states.insert(StateId::new(state));
        }
        Ok(())
    }

    pub fn set_state_rewards(&mut self, rewards: Vec<V>) -> Result<(), ModelError> {
        if rewards.len() != self.state_count {
            return Err(ModelError::RewardSizeMismatch {
                expected: self.state_count,
                actual: rewards.len(),
            });
        }
        self.state_rewards = Some(rewards);
        Ok(())
    }

    pub fn add_state_reward(&mut self, state: usize, reward: V) -> Result<(), ModelError> {
        self.check_state(state)?;
        let count = self.state_count;
        let rewards = self
            .state_rewards
            .get_or_insert_with(|| vec![V::zero(); count]);
        rewards[state] = rewards[state].add(&reward).simplify();
        Ok(())
    }

    pub fn add_transition_reward(
        &mut self,
        source: usize,
        target: usize,
        reward: V,
    ) -> Result<(), ModelError> {
        self.check_state(source)?;
        self.check_state(target)?;
        let count = self.state_count;
        self.transition_rewards
            .get_or_insert_with(|| SparseMatrixBuilder::new(count, count))
            .add(source, target, reward);
        Ok(())
    }

    /// Build the model. Every row must sum to one (exactly, or within
    /// [`STOCHASTIC_TOLERANCE`] for floating point values); parametric rows that do not
    /// simplify to a constant are not checked.
    pub fn build(self) -> Result<Dtmc<V>, ModelError> {
        if self.initial_states.is_empty() {
            return Err(ModelError::MissingInitialState);
        }
        let transition_matrix = self.transitions.build();
        for state in (0..self.state_count).map(StateId::new) {
            let sum = transition_matrix
                .row(state)
                .iter()
                .fold(V::zero(), |acc, e| acc.add(&e.value))
                .simplify();
            let stochastic = sum.is_one()
                || match sum.to_f64() {
                    Some(approximation) => (approximation - 1.0).abs() <= STOCHASTIC_TOLERANCE,
                    None => !transition_matrix.row(state).is_empty(),
                };
            if !stochastic {
                return Err(ModelError::NotStochastic {
                    state: state.index(),
                    sum: sum.to_string(),
                });
            }
        }

        let graph = TransitionGraph::from(&transition_matrix);
        debug!(
            "Built DTMC with {} states, {} transitions and initial states ({}).",
            self.state_count,
            transition_matrix.entry_count(),
            log_set(&self.initial_states)
        );
        let mut labeling = self.labeling;
        labeling.insert(INIT_LABEL.to_string(), self.initial_states.clone());
        Ok(Dtmc {
            transition_matrix,
            initial_states: self.initial_states,
            labeling,
            state_rewards: self.state_rewards,
            transition_rewards: self.transition_rewards.map(|it| it.build()),
            graph,
        })
    }

    fn check_state(&self, state: usize) -> Result<(), ModelError> {
        if state >= self.state_count {
            Err(ModelError::StateOutOfRange {
                state,
                state_count: self.state_count,
            })
        } else {
            Ok(())
        }
    }
}

/// Constant values must be finite and non-negative. Parametric values are not checked.
pub(crate) fn is_probability<V: ValueOps>(value: &V) -> bool {
    value
        .to_f64()
        .is_none_or(|value| value.is_finite() && value >= 0.0)
}
