//! Explicit reachability algorithms over a [`crate::storage::TransitionGraph`].
//!
//! Reachability is computed layer by layer: each step expands the frontier (the states
//! discovered in the previous step) by one transition. A [`ReachabilityConfig`] can
//! restrict which states may be discovered (`within`) and which states are discovered
//! but not expanded (`stop_at`).
//!
//! # Type Aliases
//!
//! - [`ForwardReachability`]: Forward (successor) reachability
//! - [`BackwardReachability`]: Backward (predecessor) reachability
//!
//! The [`graph_analysis`] functions build the usual qualitative DTMC analyses
//! (`prob0`, `prob1`, reachable states, BFS distances) on top of these.
//!
//! # Example
//!
//! ```
//! use dtmc_state_elimination::reachability::ForwardReachability;
//! use dtmc_state_elimination::storage::{StateSet, TransitionGraph};
//! use computation_process::Algorithm;
//!
//! let graph = TransitionGraph::from_edges(3, [(0, 1), (1, 2)]);
//! let initial = StateSet::from_indices(3, &[1]);
//! let reachable = ForwardReachability::run(&graph, initial).unwrap();
//! assert_eq!(reachable, StateSet::from_indices(3, &[1, 2]));
//! ```

use crate::storage::StateSet;
use cancel_this::Cancellable;
use computation_process::{Algorithm, Computation};

#[cfg(test)]
mod tests;

pub mod graph_analysis;
mod iterative_union;
mod reachability_config;
mod reachability_state;
mod step_operators;

pub use iterative_union::IterativeUnion;
pub use reachability_config::ReachabilityConfig;
pub use reachability_state::ReachabilityState;
pub use step_operators::{BfsPredecessors, BfsSuccessors};

/// A helper alias which allows us to use [`ReachabilityComputation`] as shorthand for
/// `Computation<Context = ReachabilityConfig, State = ReachabilityState>`.
pub type ReachabilityComputation<STEP> =
    Computation<ReachabilityConfig, ReachabilityState, StateSet, STEP>;

/// A helper trait which allows us to use [`ReachabilityAlgorithm`] as shorthand for
/// `Algorithm<Context = ReachabilityConfig, State = ReachabilityState>`.
pub trait ReachabilityAlgorithm:
    Algorithm<ReachabilityConfig, ReachabilityState, StateSet> + 'static
{
}
impl<T: Algorithm<ReachabilityConfig, ReachabilityState, StateSet> + 'static>
    ReachabilityAlgorithm for T
{
}

/// Forward reachability: all states reachable from the initial set.
pub type ForwardReachability = ReachabilityComputation<IterativeUnion<BfsSuccessors>>;

/// Backward reachability: all states that can reach the initial set.
pub type BackwardReachability = ReachabilityComputation<IterativeUnion<BfsPredecessors>>;

/// Used to reduce code repetition in various reachability-like algorithms.
///
/// Implementors define a single step of a reachability procedure, which is then
/// iterated by higher-level algorithms like [`IterativeUnion`].
pub trait ReachabilityStep {
    /// Perform a single step of reachability computation.
    ///
    /// Returns the set of newly discovered states (not already in `state.set`),
    /// or an empty set if no more states can be reached.
    fn step(context: &ReachabilityConfig, state: &ReachabilityState) -> Cancellable<StateSet>;
}
