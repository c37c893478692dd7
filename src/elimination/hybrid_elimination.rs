use crate::elimination::{EliminationConfig, EliminationProblem, StatePriorities};
use crate::log_set;
use crate::scc::SccDecomposition;
use crate::storage::{StateId, StateSet, TransitionGraph};
use crate::value::ValueOps;
use cancel_this::is_cancelled;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::{debug, trace};

/// State of a [`crate::elimination::HybridElimination`].
///
/// The recursive SCC treatment is flattened into an explicit work stack, such that each
/// computation step performs at most one decomposition or one state elimination.
pub struct HybridEliminationState<V> {
    problem: EliminationProblem<V>,
    graph: TransitionGraph,
    priorities: StatePriorities,
    protected: StateSet,
    stack: Vec<Work>,
    entry_queue: Vec<StateId>,
    queue_flushed: bool,
}

enum Work {
    /// Treat `scc`, whose `entry` states are not eliminated as part of it.
    Treat {
        scc: StateSet,
        entry: StateSet,
        eliminate_entry: bool,
        level: usize,
    },
    /// A non-trivial block of a decomposition; its entry states are only known once
    /// all previously scheduled work is done.
    Block { states: StateSet, level: usize },
    /// Eliminate the listed states in order.
    Eliminate { states: Vec<StateId>, next: usize },
    /// Eliminate (or queue) the entry states of a treated SCC.
    Finish {
        entry: StateSet,
        eliminate_entry: bool,
    },
}

impl<V: ValueOps> HybridEliminationState<V> {
    /// Prepare the hybrid elimination of all states of `problem` except the `initial`
    /// states. The `graph` is the (unmodified) topology of the problem.
    pub fn new(
        problem: EliminationProblem<V>,
        graph: TransitionGraph,
        priorities: StatePriorities,
        initial: StateSet,
    ) -> HybridEliminationState<V> {
        assert_eq!(graph.state_count(), problem.state_count());
        let root = Work::Treat {
            scc: graph.mk_all_states(),
            entry: initial.clone(),
            eliminate_entry: false,
            level: 0,
        };
        HybridEliminationState {
            problem,
            graph,
            priorities,
            protected: initial,
            stack: vec![root],
            entry_queue: Vec::new(),
            queue_flushed: false,
        }
    }
}

/// Eliminates states SCC by SCC (see [`crate::elimination::HybridElimination`]).
pub struct HybridEliminationStep;

impl<V: ValueOps>
    ComputationStep<EliminationConfig, HybridEliminationState<V>, EliminationProblem<V>>
    for HybridEliminationStep
{
    fn step(
        context: &EliminationConfig,
        state: &mut HybridEliminationState<V>,
    ) -> Completable<EliminationProblem<V>> {
        is_cancelled!()?;
        let Some(work) = state.stack.pop() else {
            if context.eliminate_entry_states_last && !state.queue_flushed {
                state.queue_flushed = true;
                let queued: Vec<StateId> = std::mem::take(&mut state.entry_queue)
                    .into_iter()
                    .filter(|it| !state.protected.contains(*it))
                    .collect();
                debug!("Eliminating {} queued entry states.", queued.len());
                state.stack.push(Work::Eliminate {
                    states: queued,
                    next: 0,
                });
                return Err(Suspended);
            }
            debug!(
                "Hybrid elimination finished with maximal SCC depth {}.",
                state.problem.maximal_depth()
            );
            return Ok(std::mem::take(&mut state.problem));
        };

        match work {
            Work::Treat {
                scc,
                entry,
                eliminate_entry,
                level,
            } => {
                state.problem.record_depth(level);
                state.stack.push(Work::Finish {
                    entry: entry.clone(),
                    eliminate_entry,
                });
                let inner = scc.minus(&entry);
                if scc.len() > context.maximal_scc_size {
                    let decomposition = SccDecomposition::compute(&state.graph, &inner)?;
                    if decomposition.blocks.len() == 1 && decomposition.blocks[0] == scc {
                        // A block without entry states cannot be split further.
                        trace!("[level:{level}] SCC ({}) is indivisible.", log_set(&scc));
                        let states = state.priorities.sort(&inner);
                        state.stack.push(Work::Eliminate { states, next: 0 });
                        return Err(Suspended);
                    }
                    debug!(
                        "[level:{level}] Decomposed SCC ({}) into {} blocks and {} trivial states.",
                        log_set(&scc),
                        decomposition.blocks.len(),
                        decomposition.trivial.len()
                    );
                    // The stack is LIFO: trivial states first, then blocks in order.
                    for block in decomposition.blocks.into_iter().rev() {
                        state.stack.push(Work::Block {
                            states: block,
                            level: level + 1,
                        });
                    }
                    let states = state.priorities.sort(&decomposition.trivial);
                    state.stack.push(Work::Eliminate { states, next: 0 });
                } else {
                    trace!("[level:{level}] Flat elimination of SCC ({}).", log_set(&scc));
                    let states = state.priorities.sort(&inner);
                    state.stack.push(Work::Eliminate { states, next: 0 });
                }
                Err(Suspended)
            }
            Work::Block { states, level } => {
                let entry = entry_states(&state.problem, &states);
                state.stack.push(Work::Treat {
                    scc: states,
                    entry,
                    eliminate_entry: !context.eliminate_entry_states_last,
                    level,
                });
                Err(Suspended)
            }
            Work::Eliminate { states, next } => {
                if let Some(target) = states.get(next) {
                    state.problem.eliminate_state(*target, true, None);
                    state.stack.push(Work::Eliminate {
                        states,
                        next: next + 1,
                    });
                }
                Err(Suspended)
            }
            Work::Finish {
                entry,
                eliminate_entry,
            } => {
                if eliminate_entry {
                    let states: Vec<StateId> = entry
                        .iter()
                        .filter(|it| !state.protected.contains(*it))
                        .collect();
                    state.stack.push(Work::Eliminate { states, next: 0 });
                } else {
                    state.entry_queue.extend(entry.iter());
                }
                Err(Suspended)
            }
        }
    }
}

/// States of `block` that have a (current) predecessor outside of `block`.
fn entry_states<V: ValueOps>(problem: &EliminationProblem<V>, block: &StateSet) -> StateSet {
    StateSet::from_states(
        block.universe(),
        block.iter().filter(|state| {
            problem
                .backward()
                .row(*state)
                .iter()
                .any(|e| !block.contains(e.column))
        }),
    )
}
