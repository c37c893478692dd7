use crate::storage::StateId;
use crate::value::ValueOps;
use std::fmt::{Display, Formatter};

/// The value of a property in the initial state.
///
/// Generic value types cannot represent an infinite expected reward, so it is a separate
/// variant.
#[derive(Clone, PartialEq, Debug)]
pub enum CheckValue<V> {
    Finite(V),
    Infinite,
}

impl<V: ValueOps> CheckValue<V> {
    pub fn finite(&self) -> Option<&V> {
        match self {
            CheckValue::Finite(value) => Some(value),
            CheckValue::Infinite => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, CheckValue::Infinite)
    }

    /// A floating point approximation (`None` for non-constant parametric values).
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            CheckValue::Finite(value) => value.to_f64(),
            CheckValue::Infinite => Some(f64::INFINITY),
        }
    }
}

impl<V: Display> Display for CheckValue<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckValue::Finite(value) => write!(f, "{value}"),
            CheckValue::Infinite => write!(f, "inf"),
        }
    }
}

/// How much work a single check performed.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheckStatistics {
    /// Number of states of the sub-chain that was handed to state elimination.
    pub maybe_states: usize,
    /// Number of single-state eliminations (zero if the result was found by graph analysis).
    pub eliminated_states: usize,
    /// Deepest SCC recursion level of the hybrid method.
    pub maximal_scc_depth: usize,
}

#[derive(Clone, PartialEq, Debug)]
pub struct CheckResult<V> {
    /// The (only) initial state of the model.
    pub initial_state: StateId,
    pub value: CheckValue<V>,
    pub statistics: CheckStatistics,
}

impl<V: ValueOps> CheckResult<V> {
    /// A result found without eliminating any states.
    pub fn trivial(initial_state: StateId, value: CheckValue<V>, maybe_states: usize) -> Self {
        CheckResult {
            initial_state,
            value,
            statistics: CheckStatistics {
                maybe_states,
                ..Default::default()
            },
        }
    }

    pub fn finite(&self) -> Option<&V> {
        self.value.finite()
    }
}
