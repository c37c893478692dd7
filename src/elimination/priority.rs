use crate::elimination::EliminationOrder;
use crate::reachability::graph_analysis::distances;
use crate::storage::{StateId, StateSet, TransitionGraph};
use cancel_this::Cancellable;
use log::debug;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// A total order of the states of an elimination problem.
///
/// The priority of a state is its position in the order (`0..n`). States with a lower
/// priority are eliminated first.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatePriorities {
    priorities: Vec<usize>,
}

impl StatePriorities {
    /// Compute the priorities of all states of `graph` according to `order`.
    ///
    /// The forward orders measure the distance from `initial`, the backward orders the
    /// distance to `targets` (the states with a non-zero one-step value). Equal distances
    /// keep the order of state indices.
    pub fn compute(
        order: EliminationOrder,
        graph: &TransitionGraph,
        initial: &StateSet,
        targets: &StateSet,
        seed: u64,
    ) -> Cancellable<StatePriorities> {
        let mut states: Vec<StateId> = (0..graph.state_count()).map(StateId::new).collect();
        match order {
            EliminationOrder::Random => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                states.shuffle(&mut rng);
            }
            EliminationOrder::Forward | EliminationOrder::ForwardReversed => {
                let distance = distances(graph, initial)?;
                sort_by_distance(&mut states, &distance, order == EliminationOrder::Forward);
            }
            EliminationOrder::Backward | EliminationOrder::BackwardReversed => {
                let distance = distances(&graph.reversed(), targets)?;
                sort_by_distance(&mut states, &distance, order == EliminationOrder::Backward);
            }
        }

        let mut priorities = vec![0; states.len()];
        for (priority, state) in states.into_iter().enumerate() {
            priorities[state.index()] = priority;
        }
        debug!("Computed {order:?} priorities of {} states.", priorities.len());
        Ok(StatePriorities { priorities })
    }

    pub fn priority(&self, state: StateId) -> usize {
        self.priorities[state.index()]
    }

    /// The states of `set`, sorted by priority.
    pub fn sort(&self, set: &StateSet) -> Vec<StateId> {
        let mut states: Vec<StateId> = set.iter().collect();
        states.sort_by_key(|it| self.priority(*it));
        states
    }
}

/// Stable sort of `states` by ascending (or descending) `distance`.
fn sort_by_distance(states: &mut [StateId], distance: &[usize], ascending: bool) {
    if ascending {
        states.sort_by_key(|it| distance[it.index()]);
    } else {
        states.sort_by(|a, b| distance[b.index()].cmp(&distance[a.index()]));
    }
}
