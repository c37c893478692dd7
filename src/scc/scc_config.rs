use crate::storage::TransitionGraph;
use crate::trimming::TrimSetting;

/// A configuration object for SCC decomposition.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SccConfig {
    /// The graph used for SCC computation.
    ///
    /// If you are only interested in the SCCs of a subgraph, limit the initial set used by
    /// the algorithm instead. Transitions leaving the initial set are then ignored.
    pub graph: TransitionGraph,
    /// Indicate that the algorithm should try to trim trivial components (default: both).
    pub should_trim: TrimSetting,
}

impl From<TransitionGraph> for SccConfig {
    fn from(value: TransitionGraph) -> Self {
        SccConfig::new(value)
    }
}

impl From<&TransitionGraph> for SccConfig {
    fn from(value: &TransitionGraph) -> Self {
        SccConfig::new(value.clone())
    }
}

impl SccConfig {
    /// Create a new instance of [`SccConfig`] from a [`TransitionGraph`]
    /// with trimming enabled.
    pub fn new(graph: TransitionGraph) -> SccConfig {
        SccConfig {
            graph,
            should_trim: TrimSetting::default(),
        }
    }

    pub fn should_trim(mut self, should_trim: TrimSetting) -> Self {
        self.should_trim = should_trim;
        self
    }
}
