use crate::log_set;
use crate::reachability::{ReachabilityConfig, ReachabilityState, ReachabilityStep};
use crate::storage::{StateId, StateSet};
use cancel_this::{Cancellable, is_cancelled};
use log::trace;

/// Computes the direct successors of the current frontier, excluding values that are
/// already in the reachable set.
pub struct BfsSuccessors;

/// Computes the direct predecessors of the current frontier, excluding values that are
/// already in the reachable set.
pub struct BfsPredecessors;

impl ReachabilityStep for BfsSuccessors {
    fn step(context: &ReachabilityConfig, state: &ReachabilityState) -> Cancellable<StateSet> {
        let post = expand(context, state, |s| context.graph.successors(s))?;
        trace!("Successors of the frontier ({}).", log_set(&post));
        Ok(post)
    }
}

impl ReachabilityStep for BfsPredecessors {
    fn step(context: &ReachabilityConfig, state: &ReachabilityState) -> Cancellable<StateSet> {
        let pre = expand(context, state, |s| context.graph.predecessors(s))?;
        trace!("Predecessors of the frontier ({}).", log_set(&pre));
        Ok(pre)
    }
}

fn expand<'a, F>(
    context: &ReachabilityConfig,
    state: &ReachabilityState,
    neighbours: F,
) -> Cancellable<StateSet>
where
    F: Fn(StateId) -> &'a [StateId],
{
    let mut result = context.graph.mk_empty_states();
    for source in &state.frontier {
        if context.stop_at.contains(source) {
            continue;
        }
        is_cancelled!()?;
        for target in neighbours(source) {
            if context.within.contains(*target) && !state.set.contains(*target) {
                result.insert(*target);
            }
        }
    }
    Ok(result)
}
