use crate::log_set;
use crate::reachability::{ReachabilityConfig, ReachabilityState, ReachabilityStep};
use crate::storage::{StateId, StateSet};
use cancel_this::{Cancellable, is_cancelled};
use log::trace;

/// Identifies states that are "sinks" within the given set. These are states that do not
/// have a successor within the given set.
pub struct RelativeSinks;

/// Identifies states that are "sources" within the given set. These are states that do not
/// have a predecessor within the given set.
pub struct RelativeSources;

/// The union of [`RelativeSinks`] and [`RelativeSources`] which allows us to trim a set
/// from "both sides".
pub struct RelativeSinksAndSources;

impl ReachabilityStep for RelativeSinks {
    fn step(context: &ReachabilityConfig, state: &ReachabilityState) -> Cancellable<StateSet> {
        let graph = &context.graph;
        // Removing a state can only turn its predecessors into sinks.
        let candidates = candidates(state, |s| graph.predecessors(s));
        let sinks = select(&candidates, |s| {
            !graph.successors(s).iter().any(|t| state.set.contains(*t))
        })?;
        trace!("Found relative sinks ({}).", log_set(&sinks));
        Ok(sinks)
    }
}

impl ReachabilityStep for RelativeSources {
    fn step(context: &ReachabilityConfig, state: &ReachabilityState) -> Cancellable<StateSet> {
        let graph = &context.graph;
        let candidates = candidates(state, |s| graph.successors(s));
        let sources = select(&candidates, |s| {
            !graph.predecessors(s).iter().any(|t| state.set.contains(*t))
        })?;
        trace!("Found relative sources ({}).", log_set(&sources));
        Ok(sources)
    }
}

impl ReachabilityStep for RelativeSinksAndSources {
    fn step(context: &ReachabilityConfig, state: &ReachabilityState) -> Cancellable<StateSet> {
        // Removed together, the next frontier has to cover both.
        let sources = RelativeSources::step(context, state)?;
        let sinks = RelativeSinks::step(context, state)?;
        Ok(sources.union(&sinks))
    }
}

/// States of `state.set` whose status may have changed since the last step: the
/// frontier itself (initially the whole set) and its neighbours.
fn candidates<'a, F>(state: &ReachabilityState, neighbours: F) -> StateSet
where
    F: Fn(StateId) -> &'a [StateId],
{
    let mut result = state.frontier.intersect(&state.set);
    for removed in &state.frontier {
        for neighbour in neighbours(removed) {
            if state.set.contains(*neighbour) {
                result.insert(*neighbour);
            }
        }
    }
    result
}

fn select<F: Fn(StateId) -> bool>(candidates: &StateSet, predicate: F) -> Cancellable<StateSet> {
    let mut result = StateSet::empty(candidates.universe());
    for state in candidates {
        is_cancelled!()?;
        if predicate(state) {
            result.insert(state);
        }
    }
    Ok(result)
}
