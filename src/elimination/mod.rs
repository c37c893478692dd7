//! State elimination in discrete-time Markov chains.
//!
//! An [`EliminationProblem`] holds the transitions between the "maybe" states of a chain,
//! together with per-state [`StateValues`]: either the probability of reaching the target
//! in one step, or the reward collected in each state. Eliminating a state redirects every
//! path through it to its successors, such that the value of reaching the target (or the
//! expected reward) is preserved for all remaining states. Once all states except the
//! initial state are eliminated, the value of the initial state is the result.
//!
//! Two drivers decide which states are eliminated and when:
//!
//! - [`FlatElimination`] eliminates a fixed list of states, usually sorted by
//!   [`StatePriorities`].
//! - [`HybridElimination`] recursively decomposes the state space into SCCs. SCCs larger
//!   than [`EliminationConfig::maximal_scc_size`] are split further, trivial SCCs are
//!   eliminated first, and the entry states of each SCC are eliminated after its interior.
//!
//! Both drivers are resumable computations which check for cancellation between two
//! single-state eliminations.

use crate::storage::{StateSet, TransitionGraph};
use crate::value::ValueOps;
use cancel_this::Cancellable;
use computation_process::{Algorithm, Computation};
use log::info;

mod elimination_config;
mod elimination_problem;
mod flat_elimination;
mod hybrid_elimination;
mod priority;


pub use elimination_config::{
    EliminationConfig, EliminationMethod, EliminationOrder, EliminationProgress, ProgressCallback,
};
pub use elimination_problem::{EliminationProblem, StateValues};
pub use flat_elimination::{FlatEliminationState, FlatEliminationStep};
pub use hybrid_elimination::{HybridEliminationState, HybridEliminationStep};
pub use priority::StatePriorities;

/// Eliminate a given list of states, one by one.
pub type FlatElimination<V> = Computation<
    EliminationConfig,
    FlatEliminationState<V>,
    EliminationProblem<V>,
    FlatEliminationStep,
>;

/// Eliminate all states except the protected (initial) states, SCC by SCC.
pub type HybridElimination<V> = Computation<
    EliminationConfig,
    HybridEliminationState<V>,
    EliminationProblem<V>,
    HybridEliminationStep,
>;

/// Eliminate all states of `problem` except the `initial` states, using the method and
/// order of `config`. The `graph` is the topology of the (unmodified) problem and the
/// `targets` are the states that reach the target in one step (used by the backward orders).
pub fn eliminate_all_except<V: ValueOps>(
    config: &EliminationConfig,
    mut problem: EliminationProblem<V>,
    graph: &TransitionGraph,
    initial: &StateSet,
    targets: &StateSet,
) -> Cancellable<EliminationProblem<V>> {
    let priorities =
        StatePriorities::compute(config.order, graph, initial, targets, config.random_seed)?;
    let remaining = graph.mk_all_states().minus(initial);
    info!(
        "Eliminating {} states using the {:?} method and {:?} order.",
        remaining.len(),
        config.method,
        config.order
    );
    problem.set_progress(remaining.len(), config.progress.clone());

    match config.method {
        EliminationMethod::State => {
            let order = priorities.sort(&remaining);
            FlatElimination::<V>::run(config.clone(), (problem, order))
        }
        EliminationMethod::Hybrid => {
            let state =
                HybridEliminationState::new(problem, graph.clone(), priorities, initial.clone());
            HybridElimination::<V>::run(config.clone(), state)
        }
    }
}
