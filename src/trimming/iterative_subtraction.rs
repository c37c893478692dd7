use crate::reachability::{ReachabilityConfig, ReachabilityState, ReachabilityStep};
use crate::storage::StateSet;
use crate::{log_set, simple_type_name};
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::debug;
use std::marker::PhantomData;

/// A helper implementation of [`ComputationStep`] that repeatedly calls a [`ReachabilityStep`]
/// function, *removing* the results from the current `state`.
///
/// The removed states become the new frontier, i.e. only their neighbours are
/// re-examined in the next step.
pub struct IterativeSubtraction<S: ReachabilityStep>(PhantomData<S>);

impl<S: ReachabilityStep> ComputationStep<ReachabilityConfig, ReachabilityState, StateSet>
    for IterativeSubtraction<S>
{
    fn step(context: &ReachabilityConfig, state: &mut ReachabilityState) -> Completable<StateSet> {
        state.iteration += 1;
        let to_remove = S::step(context, state)?;
        if to_remove.is_empty() {
            debug!(
                "[iteration:{}] Subtraction<{}> finished ({}).",
                state.iteration,
                simple_type_name::<S>(),
                log_set(&state.set)
            );
            Ok(state.set.clone())
        } else {
            state.set = state.set.minus(&to_remove);
            state.frontier = to_remove;
            debug!(
                "[iteration:{}] Subtraction<{}> decreased ({}).",
                state.iteration,
                simple_type_name::<S>(),
                log_set(&state.set)
            );
            Err(Suspended)
        }
    }
}
