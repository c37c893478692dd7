use crate::storage::StateSet;

/// The intermediate state of an [`crate::reachability::IterativeUnion`] computation.
///
/// The `frontier` holds the states discovered in the last iteration. Only these need to be
/// expanded in the next step.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachabilityState {
    pub iteration: usize,
    pub set: StateSet,
    pub frontier: StateSet,
}

impl From<StateSet> for ReachabilityState {
    fn from(value: StateSet) -> Self {
        ReachabilityState {
            iteration: 0,
            frontier: value.clone(),
            set: value,
        }
    }
}

impl From<&StateSet> for ReachabilityState {
    fn from(value: &StateSet) -> Self {
        Self::from(value.clone())
    }
}

impl From<ReachabilityState> for StateSet {
    fn from(value: ReachabilityState) -> Self {
        value.set
    }
}
