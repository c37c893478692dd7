use crate::log_set;
use crate::reachability::{ReachabilityAlgorithm, ReachabilityConfig};
use crate::scc::{SccConfig, filter_scc};
use crate::storage::{StateSet, TransitionGraph};
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, DynComputable, GeneratorStep};
use log::{debug, trace};
use std::marker::PhantomData;

/// Internal state for the forward-backward SCC algorithm.
///
/// This struct tracks the current computation phase and pending work items.
pub struct FwdBwdState {
    computing: Step,
    to_process: Vec<StateSet>,
}

/// Step implementation for the forward-backward SCC algorithm.
///
/// This type is parameterized by forward and backward reachability algorithms
/// and implements the [`GeneratorStep`] trait for SCC enumeration.
pub struct FwdBwdStep<FWD: ReachabilityAlgorithm, BWD: ReachabilityAlgorithm> {
    _phantom: PhantomData<(FWD, BWD)>,
}

impl From<&TransitionGraph> for FwdBwdState {
    fn from(value: &TransitionGraph) -> Self {
        FwdBwdState::from(value.mk_all_states())
    }
}

impl From<StateSet> for FwdBwdState {
    fn from(value: StateSet) -> Self {
        FwdBwdState {
            computing: Step::Idle,
            to_process: vec![value],
        }
    }
}

impl From<&StateSet> for FwdBwdState {
    fn from(value: &StateSet) -> Self {
        FwdBwdState::from(value.clone())
    }
}

impl<FWD: ReachabilityAlgorithm, BWD: ReachabilityAlgorithm>
    GeneratorStep<SccConfig, FwdBwdState, StateSet> for FwdBwdStep<FWD, BWD>
{
    fn step(context: &SccConfig, state: &mut FwdBwdState) -> Completable<Option<StateSet>> {
        match &mut state.computing {
            Step::Idle => {
                // Pick a new set for processing.

                let Some(todo) = state.to_process.pop() else {
                    // If there is nothing to process, we are done.
                    return Ok(None);
                };

                trace!(
                    "Start processing ({}); {} sets remaining ({} states).",
                    log_set(&todo),
                    state.to_process.len(),
                    state.to_process.iter().map(|it| it.len()).sum::<usize>()
                );

                state.computing = Step::Trimming(Step1::new(context, todo));
                Err(Suspended)
            }
            Step::Trimming(step) => {
                let Some(trimmed) = step.try_advance::<BWD>(context)? else {
                    // If the set is empty after trimming, reset the state and stop.
                    state.computing = Step::Idle;
                    return Err(Suspended);
                };

                state.computing = Step::Backward(trimmed);
                Err(Suspended)
            }
            Step::Backward(step) => {
                state.computing = Step::Forward(step.try_advance::<FWD>(context)?);
                Err(Suspended)
            }
            Step::Forward(step) => {
                let result = step.try_advance()?;
                let scc = result.scc;
                let forward = result.forward;
                let backward = result.backward;
                let universe = result.universe;

                // Enqueue the remaining states for further processing.
                let remaining_backward = backward.minus(&forward);
                let remaining_forward = forward.minus(&backward);
                let remaining_rest = universe.minus(&backward).minus(&forward);

                trace!(
                    "Adding remaining FWD ({}), BWD ({}), and REST ({}) sets.",
                    log_set(&remaining_forward),
                    log_set(&remaining_backward),
                    log_set(&remaining_rest),
                );

                if !remaining_backward.is_empty() {
                    state.to_process.push(remaining_backward);
                }
                if !remaining_forward.is_empty() {
                    state.to_process.push(remaining_forward);
                }
                if !remaining_rest.is_empty() {
                    state.to_process.push(remaining_rest);
                }

                state.computing = Step::Idle;
                if let Some(scc) = scc {
                    Ok(Some(scc))
                } else {
                    Err(Suspended)
                }
            }
        }
    }
}

enum Step {
    Idle,
    Trimming(Step1),
    Backward(Step2),
    Forward(Step3),
}

struct Step1 {
    universe: DynComputable<StateSet>,
}

struct Step2 {
    pivot: StateSet,
    universe: StateSet,
    backward: DynComputable<StateSet>,
}

struct Step3 {
    universe: StateSet,
    backward: StateSet,
    forward: DynComputable<StateSet>,
}

struct IterationResult {
    universe: StateSet,
    forward: StateSet,
    backward: StateSet,
    scc: Option<StateSet>,
}

impl Step1 {
    pub fn new(context: &SccConfig, set: StateSet) -> Step1 {
        Step1 {
            universe: context.should_trim.build_computation(&context.graph, set),
        }
    }

    pub fn try_advance<BWD: ReachabilityAlgorithm>(
        &mut self,
        context: &SccConfig,
    ) -> Completable<Option<Step2>> {
        let universe = self.universe.try_compute()?;

        let Some(pivot) = universe.first() else {
            debug!("Candidate set empty after trimming.");
            return Ok(None);
        };

        let pivot = StateSet::from_states(universe.universe(), [pivot]);
        let config = ReachabilityConfig::from(&context.graph).restrict(universe.clone());
        Ok(Some(Step2 {
            backward: BWD::configure(config, pivot.clone()).dyn_computable(),
            universe,
            pivot,
        }))
    }
}

impl Step2 {
    pub fn try_advance<FWD: ReachabilityAlgorithm>(
        &mut self,
        context: &SccConfig,
    ) -> Completable<Step3> {
        let backward = self.backward.try_compute()?;
        let config = ReachabilityConfig::from(&context.graph).restrict(self.universe.clone());

        let mut result = Step3 {
            forward: FWD::configure(config, self.pivot.clone()).dyn_computable(),
            universe: context.graph.mk_empty_states(),
            backward,
        };

        std::mem::swap(&mut result.universe, &mut self.universe);

        Ok(result)
    }
}

impl Step3 {
    pub fn try_advance(&mut self) -> Completable<IterationResult> {
        let forward = self.forward.try_compute()?;
        let scc = forward.intersect(&self.backward);
        trace!("Extracted raw SCC ({})", log_set(&scc));

        let universe = std::mem::replace(&mut self.universe, StateSet::empty(0));
        let backward = std::mem::replace(&mut self.backward, StateSet::empty(0));
        Ok(IterationResult {
            universe,
            backward,
            scc: filter_scc(scc),
            forward,
        })
    }
}
