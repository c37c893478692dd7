//! Strongly connected component decomposition of (a subset of) a transition graph.
//!
//! The decomposition only considers transitions between states of the chosen subset.
//! Singleton components are *trivial*, regardless of whether they have a self-loop.

mod fwd_bwd;
mod scc_config;

#[cfg(test)]
mod tests;

use crate::log_set;
use crate::reachability::{BackwardReachability, ForwardReachability};
use crate::storage::{StateSet, TransitionGraph};
use cancel_this::Cancellable;
use computation_process::{GenAlgorithm, Generator, Stateful};
pub use fwd_bwd::{FwdBwdState, FwdBwdStep};
use log::{debug, trace};
pub use scc_config::SccConfig;

/// A helper trait which allows us to use [`SccAlgorithm`] as shorthand for
/// `GenAlgorithm<Context = SccConfig, Output = StateSet>`.
pub trait SccAlgorithm<STATE>: GenAlgorithm<SccConfig, STATE, StateSet> + 'static {}
impl<STATE, T: GenAlgorithm<SccConfig, STATE, StateSet> + 'static> SccAlgorithm<STATE> for T {}

/// A very basic algorithm for finding strongly connected components.
///
/// Basic algorithm idea:
///  - Pick a pivot state.
///  - Compute all forward and backward reachable states from pivot.
///  - SCC is the intersection of these two sets.
///  - Recursively continue in `FWD \ SCC`, `BWD \ SCC` and `ALL \ FWD \ BWD`.
///  - Only non-trivial SCCs are returned.
pub type FwdBwdScc =
    Generator<SccConfig, FwdBwdState, StateSet, FwdBwdStep<ForwardReachability, BackwardReachability>>;

/// Discard trivial (singleton) SCCs.
fn filter_scc(scc: StateSet) -> Option<StateSet> {
    if scc.len() <= 1 {
        trace!("The SCC is trivial.");
        None
    } else {
        Some(scc)
    }
}

/// A complete partition of a state set into SCCs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SccDecomposition {
    /// The non-trivial SCCs, ordered by their smallest state.
    pub blocks: Vec<StateSet>,
    /// The union of all trivial SCCs.
    pub trivial: StateSet,
}

impl SccDecomposition {
    /// Decompose `universe` into SCCs of the subgraph of `graph` induced by `universe`.
    pub fn compute(graph: &TransitionGraph, universe: &StateSet) -> Cancellable<SccDecomposition> {
        let generator = FwdBwdScc::configure(graph, universe);
        let mut blocks = Vec::new();
        for scc in generator {
            blocks.push(scc?);
        }
        blocks.sort_by_key(|it| it.first());

        let mut trivial = universe.clone();
        for block in &blocks {
            trivial = trivial.minus(block);
        }
        debug!(
            "Decomposed ({}) into {} non-trivial SCCs and ({}) trivial states.",
            log_set(universe),
            blocks.len(),
            log_set(&trivial)
        );
        Ok(SccDecomposition { blocks, trivial })
    }

    /// Total number of components, counting every trivial state separately.
    pub fn len(&self) -> usize {
        self.blocks.len() + self.trivial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.trivial.is_empty()
    }
}
