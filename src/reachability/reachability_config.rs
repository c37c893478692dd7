use crate::storage::{StateSet, TransitionGraph};

/// A "flat" configuration object for various reachability problems.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachabilityConfig {
    /// The transition graph used for reachability computation.
    ///
    /// # Panics
    ///
    /// The procedure is allowed to panic if initialized with states that do not belong
    /// to this graph.
    pub graph: TransitionGraph,
    /// Newly discovered states must lie in this set (default: all states).
    pub within: StateSet,
    /// States in this set are discovered, but never expanded further (default: no states).
    pub stop_at: StateSet,
    /// Cancel the procedure if it exceeds the specified number of iterations (default:
    /// `usize::MAX`).
    pub max_iterations: usize,
}

impl From<TransitionGraph> for ReachabilityConfig {
    fn from(value: TransitionGraph) -> Self {
        ReachabilityConfig::new(value)
    }
}

impl From<&TransitionGraph> for ReachabilityConfig {
    fn from(value: &TransitionGraph) -> Self {
        ReachabilityConfig::new(value.clone())
    }
}

impl ReachabilityConfig {
    /// Create a new unrestricted instance of [`ReachabilityConfig`].
    pub fn new(graph: TransitionGraph) -> ReachabilityConfig {
        ReachabilityConfig {
            within: graph.mk_all_states(),
            stop_at: graph.mk_empty_states(),
            graph,
            max_iterations: usize::MAX,
        }
    }

    /// Only discover states in the given set.
    pub fn restrict(mut self, within: StateSet) -> Self {
        assert_eq!(within.universe(), self.graph.state_count());
        self.within = within;
        self
    }

    /// Do not expand states in the given set.
    pub fn stop_at(mut self, stop_at: StateSet) -> Self {
        assert_eq!(stop_at.universe(), self.graph.state_count());
        self.stop_at = stop_at;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}
