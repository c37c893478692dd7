use cancel_this::Cancelled;

/// Errors reported by [`crate::modelchecker::EliminationModelChecker`] for a single query.
///
/// These are problems with the model or the property. Violated internal invariants are
/// not reported here; they panic.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("The model does not have a reward model.")]
    MissingRewardModel,
    #[error("The model is required to have exactly one initial state, but has {0}.")]
    MultipleInitialStates(usize),
    #[error("The condition of the conditional probability has zero probability.")]
    ConditionHasZeroProbability,
    #[error("Unsupported formula: {0}")]
    UnsupportedFormula(String),
    #[error("The property refers to unknown label `{0}`.")]
    UnknownLabel(String),
    #[error("The computation was cancelled ({0}).")]
    Cancelled(Cancelled),
}

impl From<Cancelled> for CheckError {
    fn from(value: Cancelled) -> Self {
        CheckError::Cancelled(value)
    }
}
