//! Model checking of DTMC properties by state elimination.
//!
//! Every query follows the same pattern: qualitative graph analysis first determines the
//! states whose value is known (probability zero or one, infinite reward). If the initial
//! state is among them, the result is returned without eliminating anything. Otherwise, the
//! remaining "maybe" states that are reachable from the initial state form a sub-chain, and
//! all of its states except the initial state are eliminated.

use crate::elimination::{EliminationConfig, EliminationProblem, StateValues, eliminate_all_except};
use crate::error::CheckError;
use crate::log_set;
use crate::logic::{PathFormula, Property};
use crate::model::Dtmc;
use crate::reachability::graph_analysis::{prob_01, prob_1, prob_greater_0, reachable_states};
use crate::storage::{StateId, StateSet, TransitionGraph};
use crate::value::ValueOps;
use log::{debug, info};

mod check_result;
mod conditional;
mod parametric;


pub use check_result::{CheckResult, CheckStatistics, CheckValue};
pub use parametric::{ParametricSubsystem, SINK_LABEL, TARGET_LABEL};

enum UntilMaybeStates<V> {
    Known(V),
    Maybe {
        maybe: StateSet,
        one_step: StateValues<V>,
    },
}

/// Computes reachability probabilities, reachability rewards and conditional probabilities
/// of a [`Dtmc`] with a single initial state.
pub struct EliminationModelChecker<'a, V> {
    model: &'a Dtmc<V>,
    config: EliminationConfig,
}

impl<'a, V: ValueOps> EliminationModelChecker<'a, V> {
    pub fn new(model: &'a Dtmc<V>) -> Self {
        Self::with_config(model, EliminationConfig::default())
    }

    pub fn with_config(model: &'a Dtmc<V>, config: EliminationConfig) -> Self {
        EliminationModelChecker { model, config }
    }

    pub fn model(&self) -> &'a Dtmc<V> {
        self.model
    }

    pub fn config(&self) -> &EliminationConfig {
        &self.config
    }

    /// True if [`EliminationModelChecker::check`] accepts the shape of `property`.
    pub fn can_handle(&self, property: &Property) -> bool {
        match property {
            Property::Reward(_) => true,
            Property::Probability(PathFormula::Eventually(_) | PathFormula::Until(..)) => true,
            Property::Probability(PathFormula::Conditional(left, right)) => matches!(
                (left.as_ref(), right.as_ref()),
                (PathFormula::Eventually(_), PathFormula::Eventually(_))
            ),
        }
    }

    pub fn check(&self, property: &Property) -> Result<CheckResult<V>, CheckError> {
        info!("Checking {property}.");
        let all = StateSet::full(self.model.state_count());
        match property {
            Property::Reward(target) => {
                self.compute_reachability_rewards(&target.states(self.model)?)
            }
            Property::Probability(PathFormula::Eventually(psi)) => {
                self.compute_until_probabilities(&all, &psi.states(self.model)?)
            }
            Property::Probability(PathFormula::Until(phi, psi)) => self
                .compute_until_probabilities(&phi.states(self.model)?, &psi.states(self.model)?),
            Property::Probability(PathFormula::Conditional(left, right)) => {
                match (left.as_ref(), right.as_ref()) {
                    (PathFormula::Eventually(phi), PathFormula::Eventually(psi)) => self
                        .compute_conditional_probabilities(
                            &phi.states(self.model)?,
                            &psi.states(self.model)?,
                        ),
                    _ => Err(CheckError::UnsupportedFormula(format!(
                        "Expected `eventually` formulas in {property}."
                    ))),
                }
            }
        }
    }

    /// The probability of reaching a `psi` state while only visiting `phi` states before.
    pub fn compute_until_probabilities(
        &self,
        phi: &StateSet,
        psi: &StateSet,
    ) -> Result<CheckResult<V>, CheckError> {
        let initial = self.initial_state()?;
        match self.until_maybe_states(phi, psi, initial)? {
            UntilMaybeStates::Known(value) => {
                Ok(CheckResult::trivial(initial, CheckValue::Finite(value), 0))
            }
            UntilMaybeStates::Maybe { maybe, one_step } => {
                let targets = one_step.support();
                self.eliminate_maybe_states(&maybe, initial, one_step, &targets)
            }
        }
    }

    /// Qualitative analysis of `phi U psi`: either the value of the initial state is zero
    /// or one, or the result lists the maybe states reachable from the initial state and
    /// their one-step probabilities (indexed by the maybe states).
    fn until_maybe_states(
        &self,
        phi: &StateSet,
        psi: &StateSet,
        initial: StateId,
    ) -> Result<UntilMaybeStates<V>, CheckError> {
        let graph = self.model.graph();
        let (prob0, prob1) = prob_01(graph, phi, psi)?;
        if prob0.contains(initial) {
            debug!("The initial state has probability zero.");
            return Ok(UntilMaybeStates::Known(V::zero()));
        }
        if prob1.contains(initial) {
            debug!("The initial state has probability one.");
            return Ok(UntilMaybeStates::Known(V::one()));
        }

        let maybe = prob0.union(&prob1).complement();
        let maybe = reachable_states(graph, self.model.initial_states(), &maybe, &prob1)?
            .intersect(&maybe);
        info!("Computing `phi U psi` over maybe states ({}).", log_set(&maybe));

        let one_step = StateValues::Probabilities(
            self.model
                .transition_matrix()
                .constrained_row_sums(&maybe, &prob1),
        );
        Ok(UntilMaybeStates::Maybe { maybe, one_step })
    }

    /// The expected reward accumulated before reaching a `target` state.
    pub fn compute_reachability_rewards(
        &self,
        target: &StateSet,
    ) -> Result<CheckResult<V>, CheckError> {
        if !self.model.has_rewards() {
            return Err(CheckError::MissingRewardModel);
        }
        let initial = self.initial_state()?;
        let graph = self.model.graph();
        let all = StateSet::full(self.model.state_count());
        let greater_0 = prob_greater_0(graph, &all, target)?;
        let infinity = prob_1(graph, target, &greater_0)?.complement();
        if infinity.contains(initial) {
            debug!("The initial state has an infinite reward.");
            return Ok(CheckResult::trivial(initial, CheckValue::Infinite, 0));
        }
        if target.contains(initial) {
            debug!("The initial state is a target state.");
            return Ok(CheckResult::trivial(initial, CheckValue::Finite(V::zero()), 0));
        }

        let maybe = target.union(&infinity).complement();
        let maybe = reachable_states(graph, self.model.initial_states(), &maybe, target)?
            .intersect(&maybe);
        info!("Computing reachability rewards over maybe states ({}).", log_set(&maybe));

        let matrix = self.model.transition_matrix();
        let targets = StateValues::Probabilities(matrix.constrained_row_sums(&maybe, target))
            .support();
        let mut rewards: Vec<V> = match self.model.state_rewards() {
            Some(rewards) => maybe.iter().map(|s| rewards[s.index()].clone()).collect(),
            None => vec![V::zero(); maybe.len()],
        };
        if let Some(transition_rewards) = self.model.transition_rewards() {
            let expected = matrix.pointwise_product_row_sums(transition_rewards);
            for (reward, state) in rewards.iter_mut().zip(maybe.iter()) {
                *reward = reward.add(&expected[state.index()]).simplify();
            }
        }
        self.eliminate_maybe_states(&maybe, initial, StateValues::Rewards(rewards), &targets)
    }

    /// Restrict the model to `maybe` and eliminate everything except the initial state.
    /// The `values` and `targets` are already indexed by the restricted model.
    fn eliminate_maybe_states(
        &self,
        maybe: &StateSet,
        initial: StateId,
        values: StateValues<V>,
        targets: &StateSet,
    ) -> Result<CheckResult<V>, CheckError> {
        let submatrix = self.model.transition_matrix().submatrix(maybe, maybe);
        let graph = TransitionGraph::from(&submatrix);
        let initial_set = self.model.initial_states().compress(maybe);
        let local_initial = initial_set
            .first()
            .expect("Correctness violation: The initial state is not a maybe state.");

        let problem = EliminationProblem::new(&submatrix, values);
        let mut problem =
            eliminate_all_except(&self.config, problem, &graph, &initial_set, targets)?;
        let value = problem.eliminate_last_state(local_initial);
        let statistics = CheckStatistics {
            maybe_states: maybe.len(),
            eliminated_states: problem.eliminated_count(),
            maximal_scc_depth: problem.maximal_depth(),
        };
        info!("Check finished with {statistics:?}.");
        Ok(CheckResult {
            initial_state: initial,
            value: CheckValue::Finite(value),
            statistics,
        })
    }

    fn initial_state(&self) -> Result<StateId, CheckError> {
        let initial = self.model.initial_states();
        match (initial.len(), initial.first()) {
            (1, Some(state)) => Ok(state),
            (count, _) => Err(CheckError::MultipleInitialStates(count)),
        }
    }
}
