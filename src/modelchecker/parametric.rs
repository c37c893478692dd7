use crate::elimination::EliminationProblem;
use crate::error::CheckError;
use crate::model::{Dtmc, DtmcBuilder, ModelError};
use crate::modelchecker::{EliminationModelChecker, UntilMaybeStates};
use crate::storage::{FlexibleMatrix, StateId, StateSet};
use crate::value::{Parameter, RationalFunction};
use log::info;
use num_rational::BigRational;
use std::collections::BTreeMap;

/// Label of the absorbing state that collects the one-step target probabilities in
/// [`ParametricSubsystem::instantiate`].
pub const TARGET_LABEL: &str = "target";

/// Label of the absorbing state that collects the remaining probability mass in
/// [`ParametricSubsystem::instantiate`].
pub const SINK_LABEL: &str = "sink";

/// A `phi U psi` query over a parametric chain, reduced to the states that still have
/// parametric outgoing transitions (plus the initial state).
///
/// The subsystem can be instantiated for concrete parameter values, which is much cheaper
/// than instantiating the whole model when only a few transitions are parametric.
pub struct ParametricSubsystem {
    initial_state: StateId,
    reduction: Reduction,
}

enum Reduction {
    /// The initial state reaches the target with probability zero or one.
    Known(bool),
    Reduced {
        problem: EliminationProblem<RationalFunction>,
        remaining: StateSet,
        local_initial: StateId,
    },
}

impl ParametricSubsystem {
    /// The initial state of the original model.
    pub fn initial_state(&self) -> StateId {
        self.initial_state
    }

    /// Number of states left in the subsystem (zero if the value is known without
    /// elimination).
    pub fn state_count(&self) -> usize {
        match &self.reduction {
            Reduction::Known(_) => 0,
            Reduction::Reduced { remaining, .. } => remaining.len(),
        }
    }

    pub fn eliminated_states(&self) -> usize {
        match &self.reduction {
            Reduction::Known(_) => 0,
            Reduction::Reduced { problem, .. } => problem.eliminated_count(),
        }
    }

    /// The remaining transitions, indexed by the maybe states of the query. Rows of
    /// eliminated states are empty.
    pub fn transitions(&self) -> Option<&FlexibleMatrix<RationalFunction>> {
        match &self.reduction {
            Reduction::Known(_) => None,
            Reduction::Reduced { problem, .. } => Some(problem.forward()),
        }
    }

    /// Build the concrete chain of this subsystem for a parameter `valuation`.
    ///
    /// The remaining states keep their order. They are followed by an absorbing
    /// [`TARGET_LABEL`] state and an absorbing [`SINK_LABEL`] state, such that the value of
    /// the query is the probability of eventually reaching the target state.
    ///
    /// # Panics
    ///
    /// Every parameter must be assigned and no value may hit a pole.
    pub fn instantiate(
        &self,
        valuation: &BTreeMap<Parameter, BigRational>,
    ) -> Result<Dtmc<f64>, ModelError> {
        match &self.reduction {
            Reduction::Known(reached) => {
                let mut builder = DtmcBuilder::new(3);
                let (target, sink) = (1, 2);
                builder.add_transition(0, if *reached { target } else { sink }, 1.0)?;
                builder.add_transition(target, target, 1.0)?;
                builder.add_transition(sink, sink, 1.0)?;
                builder.add_initial_state(0)?;
                builder.add_label(TARGET_LABEL, target)?;
                builder.add_label(SINK_LABEL, sink)?;
                builder.build()
            }
            Reduction::Reduced {
                problem,
                remaining,
                local_initial,
            } => {
                let one_step = problem.values().as_slice();
                let forward = problem.forward();
                let matrix = forward.instantiate(valuation, remaining, true, Some(one_step), false);
                let mut builder = DtmcBuilder::new(matrix.row_count());
                for (source, target, value) in matrix.iter() {
                    builder.add_transition(source.index(), target.index(), *value)?;
                }
                let initial = remaining
                    .iter()
                    .position(|state| state == *local_initial)
                    .expect("Correctness violation: The initial state was eliminated.");
                builder.add_initial_state(initial)?;
                builder.add_label(TARGET_LABEL, remaining.len())?;
                builder.add_label(SINK_LABEL, remaining.len() + 1)?;
                builder.build()
            }
        }
    }
}

impl EliminationModelChecker<'_, RationalFunction> {
    /// Reduce `phi U psi` to a [`ParametricSubsystem`] by eliminating every non-initial
    /// maybe state with constant outgoing transitions.
    pub fn compute_parametric_subsystem(
        &self,
        phi: &StateSet,
        psi: &StateSet,
    ) -> Result<ParametricSubsystem, CheckError> {
        let initial = self.initial_state()?;
        let reduction = match self.until_maybe_states(phi, psi, initial)? {
            UntilMaybeStates::Known(value) => Reduction::Known(value.is_one()),
            UntilMaybeStates::Maybe { maybe, one_step } => {
                let submatrix = self.model.transition_matrix().submatrix(&maybe, &maybe);
                let initial_set = self.model.initial_states().compress(&maybe);
                let local_initial = initial_set
                    .first()
                    .expect("Correctness violation: The initial state is not a maybe state.");
                let mut problem = EliminationProblem::new(&submatrix, one_step);
                let remaining = problem.eliminate_constant_states(&initial_set);
                info!(
                    "Reduced {} maybe states to a parametric subsystem with {} states.",
                    maybe.len(),
                    remaining.len()
                );
                Reduction::Reduced {
                    problem,
                    remaining,
                    local_initial,
                }
            }
        };
        Ok(ParametricSubsystem {
            initial_state: initial,
            reduction,
        })
    }
}
