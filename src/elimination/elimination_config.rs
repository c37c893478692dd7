use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// How the maybe-states of a problem are eliminated.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EliminationMethod {
    /// Eliminate all states (except the initial state) one by one in priority order.
    #[default]
    State,
    /// Recursively decompose the state space into SCCs of bounded size and eliminate
    /// each SCC separately (see [`crate::elimination::HybridElimination`]).
    Hybrid,
}

/// The order in which states are eliminated (see [`crate::elimination::StatePriorities`]).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EliminationOrder {
    /// Ascending BFS distance from the initial state.
    Forward,
    /// Descending BFS distance from the initial state.
    #[default]
    ForwardReversed,
    /// Ascending BFS distance (over reversed transitions) from states with a non-zero
    /// one-step value.
    Backward,
    /// Descending BFS distance (over reversed transitions) from states with a non-zero
    /// one-step value.
    BackwardReversed,
    /// A seeded uniform shuffle.
    Random,
}

/// Snapshot of the elimination progress reported to a [`ProgressCallback`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct EliminationProgress {
    pub eliminated: usize,
    pub total: usize,
}

/// Invoked every time another 10% of the states of a problem are eliminated.
pub type ProgressCallback = Arc<dyn Fn(&EliminationProgress) + Send + Sync>;

/// A configuration object for state elimination.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EliminationConfig {
    /// Flat or SCC-based elimination (default: [`EliminationMethod::State`]).
    pub method: EliminationMethod,
    /// Elimination order (default: [`EliminationOrder::ForwardReversed`]).
    pub order: EliminationOrder,
    /// SCCs with more states are decomposed further by the hybrid method (default: 20).
    pub maximal_scc_size: usize,
    /// In the hybrid method, queue the entry states of nested SCCs and eliminate them
    /// only once all SCCs have been treated (default: `false`).
    pub eliminate_entry_states_last: bool,
    /// Seed of the [`EliminationOrder::Random`] order (default: 0).
    pub random_seed: u64,
    /// Optional progress reporting (default: none).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub progress: Option<ProgressCallback>,
}

impl Default for EliminationConfig {
    fn default() -> Self {
        EliminationConfig {
            method: EliminationMethod::default(),
            order: EliminationOrder::default(),
            maximal_scc_size: 20,
            eliminate_entry_states_last: false,
            random_seed: 0,
            progress: None,
        }
    }
}

impl Debug for EliminationConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EliminationConfig")
            .field("method", &self.method)
            .field("order", &self.order)
            .field("maximal_scc_size", &self.maximal_scc_size)
            .field(
                "eliminate_entry_states_last",
                &self.eliminate_entry_states_last,
            )
            .field("random_seed", &self.random_seed)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl EliminationConfig {
    pub fn method(mut self, method: EliminationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn order(mut self, order: EliminationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn maximal_scc_size(mut self, maximal_scc_size: usize) -> Self {
        self.maximal_scc_size = maximal_scc_size;
        self
    }

    pub fn eliminate_entry_states_last(mut self, value: bool) -> Self {
        self.eliminate_entry_states_last = value;
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn progress<F: Fn(&EliminationProgress) + Send + Sync + 'static>(
        mut self,
        callback: F,
    ) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }
}
