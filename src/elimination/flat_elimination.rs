use crate::elimination::{EliminationConfig, EliminationProblem};
use crate::storage::StateId;
use crate::value::ValueOps;
use cancel_this::is_cancelled;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::debug;

/// State of a [`crate::elimination::FlatElimination`]: the problem and the ordered list
/// of states that remain to be eliminated.
pub struct FlatEliminationState<V> {
    problem: EliminationProblem<V>,
    order: Vec<StateId>,
    next: usize,
}

impl<V: ValueOps> From<(EliminationProblem<V>, Vec<StateId>)> for FlatEliminationState<V> {
    fn from((problem, order): (EliminationProblem<V>, Vec<StateId>)) -> Self {
        FlatEliminationState {
            problem,
            order,
            next: 0,
        }
    }
}

impl<V: ValueOps> FlatEliminationState<V> {
    pub fn remaining(&self) -> usize {
        self.order.len() - self.next
    }
}

/// Eliminates the states of a [`FlatEliminationState`] one by one, in the given order.
///
/// Each step eliminates a single state, so cancellation never interrupts a running
/// elimination.
pub struct FlatEliminationStep;

impl<V: ValueOps> ComputationStep<EliminationConfig, FlatEliminationState<V>, EliminationProblem<V>>
    for FlatEliminationStep
{
    fn step(
        _context: &EliminationConfig,
        state: &mut FlatEliminationState<V>,
    ) -> Completable<EliminationProblem<V>> {
        is_cancelled!()?;
        if let Some(next) = state.order.get(state.next) {
            state.problem.eliminate_state(*next, true, None);
            state.next += 1;
            Err(Suspended)
        } else {
            debug!(
                "Flat elimination finished after {} states.",
                state.order.len()
            );
            Ok(std::mem::take(&mut state.problem))
        }
    }
}
