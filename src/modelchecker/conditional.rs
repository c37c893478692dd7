use crate::elimination::{
    EliminationMethod, EliminationProblem, FlatElimination, StatePriorities, StateValues,
};
use crate::error::CheckError;
use crate::log_set;
use crate::modelchecker::{CheckResult, CheckStatistics, CheckValue, EliminationModelChecker};
use crate::reachability::graph_analysis::{prob_01, prob_greater_0, reachable_states};
use crate::storage::{MatrixEntry, StateId, StateSet, TransitionGraph};
use crate::value::ValueOps;
use cancel_this::{Cancellable, is_cancelled};
use computation_process::Algorithm;
use log::{debug, info, trace, warn};

impl<V: ValueOps> EliminationModelChecker<'_, V> {
    /// The probability of eventually reaching a `phi` state under the condition that a
    /// `psi` state is eventually reached.
    ///
    /// Fails with [`CheckError::ConditionHasZeroProbability`] if the condition cannot be
    /// satisfied from the initial state. Conditional probabilities always use flat state
    /// elimination.
    pub fn compute_conditional_probabilities(
        &self,
        phi: &StateSet,
        psi: &StateSet,
    ) -> Result<CheckResult<V>, CheckError> {
        let initial = self.initial_state()?;
        let graph = self.model.graph();
        let initial_states = self.model.initial_states();
        let all = StateSet::full(self.model.state_count());

        // Only the first visited psi state is relevant for the condition.
        let psi = reachable_states(graph, initial_states, &all, psi)?.intersect(psi);
        let (prob0, prob1) = prob_01(graph, &all, &psi)?;
        if prob0.contains(initial) {
            return Err(CheckError::ConditionHasZeroProbability);
        }
        if prob1.contains(initial) {
            info!("The condition holds with probability one, computing `F phi` instead.");
            return self.compute_until_probabilities(&all, phi);
        }
        if phi.contains(initial) {
            debug!("The initial state satisfies the event.");
            return Ok(CheckResult::trivial(initial, CheckValue::Finite(V::one()), 0));
        }

        let with_psi_predecessor = prob_greater_0(&graph.reversed(), &all, &psi)?;
        let reaching_phi = prob_greater_0(graph, &all, phi)?;
        let maybe = prob0
            .complement()
            .union(&with_psi_predecessor.intersect(&reaching_phi));
        debug!("Found relevant states ({}).", log_set(&maybe));

        let local_phi = phi.compress(&maybe);
        if local_phi.is_empty() {
            debug!("No relevant state satisfies the event.");
            return Ok(CheckResult::trivial(
                initial,
                CheckValue::Finite(V::zero()),
                maybe.len(),
            ));
        }
        let local_psi = psi.compress(&maybe);
        let initial_set = initial_states.compress(&maybe);
        let local_initial = initial_set
            .first()
            .expect("Correctness violation: The initial state is not a relevant state.");

        let submatrix = self.model.transition_matrix().submatrix(&maybe, &maybe);
        let local_graph = TransitionGraph::from(&submatrix);
        let eliminated = local_phi
            .union(&local_psi)
            .union(&initial_set)
            .complement();
        let priorities = StatePriorities::compute(
            self.config.order,
            &local_graph,
            &initial_set,
            &local_graph.mk_empty_states(),
            self.config.random_seed,
        )?;
        let order = priorities.sort(&eliminated);

        if self.config.method == EliminationMethod::Hybrid {
            warn!("The hybrid method is not available for conditional probabilities.");
        }
        info!(
            "Computing conditional probabilities: eliminating {} states.",
            order.len()
        );
        let values = StateValues::Probabilities(vec![V::zero(); maybe.len()]);
        let mut problem = EliminationProblem::new(&submatrix, values);
        problem.set_progress(order.len(), self.config.progress.clone());
        let mut problem = FlatElimination::<V>::run(self.config.clone(), (problem, order))?;

        // Transitions into the initial state are resolved, but its row is kept.
        if !problem.backward().row(local_initial).is_empty() {
            problem.eliminate_state(local_initial, false, None);
        }
        collapse_chains(&mut problem, local_initial, &local_phi, &local_psi)?;

        let mut numerator = V::zero();
        let mut denominator = V::zero();
        for entry in problem.forward().row(local_initial) {
            let successor = problem.forward().row(entry.column);
            if local_phi.contains(entry.column) {
                let weight = if local_psi.contains(entry.column) {
                    entry.value.clone()
                } else {
                    entry.value.mul(&constrained_sum(successor, &local_psi))
                };
                numerator = numerator.add(&weight);
                denominator = denominator.add(&weight);
            } else {
                assert!(
                    local_psi.contains(entry.column),
                    "Correctness violation: Successor {} of the initial state is neither an event nor a condition state.",
                    entry.column
                );
                denominator = denominator.add(&entry.value);
                let weight = entry.value.mul(&constrained_sum(successor, &local_phi));
                numerator = numerator.add(&weight);
            }
        }

        let value = numerator.div(&denominator).simplify();
        Ok(CheckResult {
            initial_state: initial,
            value: CheckValue::Finite(value),
            statistics: CheckStatistics {
                maybe_states: maybe.len(),
                eliminated_states: problem.eliminated_count(),
                maximal_scc_depth: 0,
            },
        })
    }
}

/// Eliminate the chains of states behind each successor of `initial`, such that an event
/// successor (`phi`, not `psi`) only leads to condition states and a condition successor
/// (`psi`, not `phi`) only leads to event states.
///
/// A chain state is only eliminated with respect to predecessors of the same kind, so the
/// transitions of the initial state stay intact.
fn collapse_chains<V: ValueOps>(
    problem: &mut EliminationProblem<V>,
    initial: StateId,
    phi: &StateSet,
    psi: &StateSet,
) -> Cancellable<()> {
    let successors: Vec<StateId> = problem
        .forward()
        .row(initial)
        .iter()
        .map(|e| e.column)
        .collect();
    for successor in successors {
        let (stop, constraint) = if phi.contains(successor) {
            if psi.contains(successor) {
                continue;
            }
            (psi, phi)
        } else {
            (phi, psi)
        };
        trace!("Collapsing chains behind state {successor}.");
        loop {
            is_cancelled!()?;
            if !problem.forward().has_proper_successor(successor) {
                break;
            }
            let row: Vec<StateId> = problem
                .forward()
                .row(successor)
                .iter()
                .map(|e| e.column)
                .collect();
            let mut changed = false;
            for next in row {
                if !stop.contains(next) && problem.forward().has_proper_successor(next) {
                    problem.eliminate_state(next, false, Some(constraint));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
    Ok(())
}

fn constrained_sum<V: ValueOps>(row: &[MatrixEntry<V>], columns: &StateSet) -> V {
    row.iter()
        .filter(|e| columns.contains(e.column))
        .fold(V::zero(), |acc, e| acc.add(&e.value))
}
