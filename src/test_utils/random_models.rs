//! Seeded random DTMCs and value-iteration references for them.

use crate::model::{Dtmc, DtmcBuilder};
use crate::storage::{StateId, StateSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A random DTMC with `state_count` states, one to three successors per state, a
/// `target` label on roughly a fifth of the states and small integer state rewards.
/// State 0 is initial.
pub fn random_dtmc(seed: u64, state_count: usize) -> Dtmc<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut builder = DtmcBuilder::new(state_count);
    builder.declare_label("target");
    for state in 0..state_count {
        let degree = rng.random_range(1..=3);
        let successors: Vec<(usize, f64)> = (0..degree)
            .map(|_| {
                let target = rng.random_range(0..state_count);
                let weight = f64::from(rng.random_range(1..=4u32));
                (target, weight)
            })
            .collect();
        let total: f64 = successors.iter().map(|(_, weight)| weight).sum();
        for (target, weight) in successors {
            builder.add_transition(state, target, weight / total).unwrap();
        }
        if rng.random_bool(0.2) {
            builder.add_label("target", state).unwrap();
        }
        let reward = f64::from(rng.random_range(0..3u32));
        builder.add_state_reward(state, reward).unwrap();
    }
    builder.add_initial_state(0).unwrap();
    builder.build().unwrap()
}

/// Probabilities of `phi U psi` for every state, by value iteration.
pub fn until_reference(model: &Dtmc<f64>, phi: &StateSet, psi: &StateSet) -> Vec<f64> {
    let n = model.state_count();
    let mut x: Vec<f64> = (0..n)
        .map(|s| if psi.contains(StateId::new(s)) { 1.0 } else { 0.0 })
        .collect();
    let active = phi.minus(psi);
    iterate(model, &active, &vec![0.0; n], &mut x);
    x
}

/// Expected (state and transition) rewards until reaching `target` for every state, by
/// value iteration. States that can avoid `target` forever get infinity.
pub fn reward_reference(model: &Dtmc<f64>, target: &StateSet) -> Vec<f64> {
    let n = model.state_count();
    let reaching = backward_closure(model, target, &StateSet::full(n));
    let infinite = backward_closure(model, &reaching.complement(), &target.complement());
    let mut rewards = model
        .state_rewards()
        .map(|it| it.to_vec())
        .unwrap_or_else(|| vec![0.0; n]);
    if let Some(transition_rewards) = model.transition_rewards() {
        let matrix = model.transition_matrix();
        for (source, target, reward) in transition_rewards.iter() {
            rewards[source.index()] += matrix.get(source, target).unwrap_or(&0.0) * reward;
        }
    }
    let mut x = vec![0.0; n];
    let active = infinite.union(target).complement();
    iterate(model, &active, &rewards, &mut x);
    for state in &infinite {
        x[state.index()] = f64::INFINITY;
    }
    x
}

/// States that reach `initial` while only passing through `within`.
fn backward_closure(model: &Dtmc<f64>, initial: &StateSet, within: &StateSet) -> StateSet {
    let graph = model.graph();
    let mut result = initial.clone();
    let mut stack: Vec<StateId> = initial.iter().collect();
    while let Some(state) = stack.pop() {
        for predecessor in graph.predecessors(state) {
            if within.contains(*predecessor) && result.insert(*predecessor) {
                stack.push(*predecessor);
            }
        }
    }
    result
}

/// Gauss-Seidel iteration of `x[s] = base[s] + sum(P[s][t] * x[t])` over the `active` states.
fn iterate(model: &Dtmc<f64>, active: &StateSet, base: &[f64], x: &mut [f64]) {
    let matrix = model.transition_matrix();
    for _ in 0..1_000_000 {
        let mut change: f64 = 0.0;
        for state in active {
            let value = base[state.index()]
                + matrix
                    .row(state)
                    .iter()
                    .map(|e| e.value * x[e.column.index()])
                    .sum::<f64>();
            change = change.max((value - x[state.index()]).abs());
            x[state.index()] = value;
        }
        if change < 1e-14 {
            break;
        }
    }
}
