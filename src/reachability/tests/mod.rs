//! Tests for reachability and qualitative graph analysis using the example graph.
//!
//! See `test_utils/example_graph.rs` for the structure of the graph.


use crate::reachability::graph_analysis::{
    distances, prob_0, prob_01, prob_greater_0, reachable_states,
};
use crate::reachability::{BackwardReachability, ForwardReachability, ReachabilityConfig};
use crate::test_utils::example_graph::create_example_graph;
use crate::test_utils::{collect_states, init_logger, mk_states};
use cancel_this::Cancellable;
use computation_process::Algorithm;

// ========== Forward/backward reachability ==========

#[test]
fn test_forward_reachability_from_source() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let result = ForwardReachability::run(&graph, mk_states(&graph, &[6]))?;
    assert_eq!(collect_states(&result), vec![0, 1, 2, 3, 4, 5, 6]);
    Ok(())
}

#[test]
fn test_backward_reachability_from_sink() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let result = BackwardReachability::run(&graph, mk_states(&graph, &[5]))?;
    assert_eq!(collect_states(&result), vec![0, 1, 2, 3, 4, 5, 6]);
    Ok(())
}

#[test]
fn test_reachability_from_empty_set() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let result = ForwardReachability::run(&graph, graph.mk_empty_states())?;
    assert!(result.is_empty());
    Ok(())
}

#[test]
fn test_reachability_of_isolated_state() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let seven = mk_states(&graph, &[7]);
    assert_eq!(ForwardReachability::run(&graph, seven.clone())?, seven);
    assert_eq!(BackwardReachability::run(&graph, seven.clone())?, seven);
    Ok(())
}

#[test]
fn test_reachability_restricted_to_subset() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let config = ReachabilityConfig::from(&graph).restrict(mk_states(&graph, &[0, 1, 2]));
    let result = ForwardReachability::run(config, mk_states(&graph, &[0]))?;
    assert_eq!(collect_states(&result), vec![0, 1, 2]);
    Ok(())
}

#[test]
fn test_reachability_does_not_expand_stop_states() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let config = ReachabilityConfig::from(&graph).stop_at(mk_states(&graph, &[1]));
    let result = ForwardReachability::run(config, mk_states(&graph, &[6]))?;
    assert_eq!(collect_states(&result), vec![0, 1, 6]);
    Ok(())
}

#[test]
fn test_reachability_iteration_limit() {
    init_logger();
    let graph = create_example_graph();
    let config = ReachabilityConfig::from(&graph).max_iterations(1);
    let result = ForwardReachability::run(config, mk_states(&graph, &[6]));
    assert!(result.is_err(), "Two layers cannot be explored in one iteration");
}

// ========== Qualitative analysis ==========

#[test]
fn test_prob_greater_0_and_prob_0() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let all = graph.mk_all_states();
    let psi = mk_states(&graph, &[5]);

    let greater_0 = prob_greater_0(&graph, &all, &psi)?;
    assert_eq!(collect_states(&greater_0), vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(collect_states(&prob_0(&graph, &all, &psi)?), vec![7]);

    // Only paths through `phi` count: state 4 is excluded, so {3} can no longer reach 5.
    let phi = mk_states(&graph, &[0, 1, 2, 3, 5, 6, 7]);
    let greater_0 = prob_greater_0(&graph, &phi, &psi)?;
    assert_eq!(collect_states(&greater_0), vec![5]);
    Ok(())
}

#[test]
fn test_prob_01() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let all = graph.mk_all_states();

    // State 0 always moves to 1, but 2 can escape to the {3, 4} component.
    let psi = mk_states(&graph, &[1]);
    let (prob0, prob1) = prob_01(&graph, &all, &psi)?;
    assert_eq!(collect_states(&prob0), vec![3, 4, 5, 7]);
    assert_eq!(collect_states(&prob1), vec![0, 1, 6]);

    // Everything except the isolated state eventually ends in the absorbing state 5.
    let psi = mk_states(&graph, &[5]);
    let (prob0, prob1) = prob_01(&graph, &all, &psi)?;
    assert_eq!(collect_states(&prob0), vec![7]);
    assert_eq!(collect_states(&prob1), vec![0, 1, 2, 3, 4, 5, 6]);
    Ok(())
}

#[test]
fn test_reachable_states_with_constraint_and_target() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let initial = mk_states(&graph, &[0]);
    let constraint = mk_states(&graph, &[0, 1, 2]);
    let target = mk_states(&graph, &[3]);
    let result = reachable_states(&graph, &initial, &constraint, &target)?;
    assert_eq!(collect_states(&result), vec![0, 1, 2, 3]);
    Ok(())
}

#[test]
fn test_distances() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let forward = distances(&graph, &mk_states(&graph, &[6]))?;
    assert_eq!(forward, vec![1, 2, 3, 4, 5, 6, 0, usize::MAX]);

    let backward = distances(&graph.reversed(), &mk_states(&graph, &[5]))?;
    assert_eq!(backward, vec![5, 4, 3, 2, 1, 0, 6, usize::MAX]);
    Ok(())
}
