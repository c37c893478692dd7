//! Iterative removal of states that cannot lie on a cycle within a set.
//!
//! A state that has no successor (or no predecessor) inside the set is a trivial SCC of
//! that set. Removing such states repeatedly shrinks the set before the more expensive
//! forward-backward SCC decomposition runs.

mod iterative_subtraction;
mod step_operators;


use crate::reachability::ReachabilityComputation;
use crate::storage::{StateSet, TransitionGraph};
use computation_process::{Computable, ComputableIdentity, DynComputable, Stateful};
pub use iterative_subtraction::IterativeSubtraction;
pub use step_operators::{RelativeSinks, RelativeSinksAndSources, RelativeSources};

pub type TrimSinks = ReachabilityComputation<IterativeSubtraction<RelativeSinks>>;
pub type TrimSources = ReachabilityComputation<IterativeSubtraction<RelativeSources>>;
pub type TrimSinksAndSources =
    ReachabilityComputation<IterativeSubtraction<RelativeSinksAndSources>>;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrimSetting {
    #[default]
    Both,
    Sources,
    Sinks,
    None,
}

impl TrimSetting {
    pub fn build_computation(
        &self,
        graph: &TransitionGraph,
        set: StateSet,
    ) -> DynComputable<StateSet> {
        match self {
            TrimSetting::Both => TrimSinksAndSources::configure(graph, set).dyn_computable(),
            TrimSetting::Sources => TrimSources::configure(graph, set).dyn_computable(),
            TrimSetting::Sinks => TrimSinks::configure(graph, set).dyn_computable(),
            TrimSetting::None => ComputableIdentity::from(set).dyn_computable(),
        }
    }
}
