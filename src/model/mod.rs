//! Explicit discrete-time Markov chains.
//!
//! A [`Dtmc`] is built either programmatically through a [`DtmcBuilder`], or loaded from
//! the explicit text format (see [`explicit`]). All values are generic over
//! [`crate::value::ValueOps`], so the same model can be stored with floating point, exact
//! rational or parametric transition probabilities.

mod dtmc;
pub mod explicit;

#[cfg(test)]
mod tests;

pub use dtmc::{Dtmc, DtmcBuilder, INIT_LABEL, STOCHASTIC_TOLERANCE};

/// Errors raised while building or loading a [`Dtmc`].
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Cannot read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("State {state} is out of range for a model with {state_count} states.")]
    StateOutOfRange { state: usize, state_count: usize },
    #[error("The transition {state} -> {successor} has an invalid probability {value}.")]
    InvalidProbability {
        state: usize,
        successor: usize,
        value: String,
    },
    #[error("The outgoing probabilities of state {state} sum to {sum}, not one.")]
    NotStochastic { state: usize, sum: String },
    #[error("Expected {expected} state rewards, found {actual}.")]
    RewardSizeMismatch { expected: usize, actual: usize },
    #[error("Label `{0}` is not declared.")]
    UndeclaredLabel(String),
    #[error("The model has no initial state.")]
    MissingInitialState,
}

impl ModelError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> ModelError {
        ModelError::Parse {
            line,
            message: message.into(),
        }
    }
}
