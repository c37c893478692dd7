//! Tests for SCC decomposition.
//!
//! The algorithms must identify all non-trivial SCCs (SCCs with more than one state),
//! and no extra SCCs may be reported.

use crate::scc::{FwdBwdScc, FwdBwdState, SccAlgorithm, SccConfig, SccDecomposition};
use crate::storage::{StateSet, TransitionGraph};
use crate::test_utils::example_graph::create_example_graph;
use crate::test_utils::{collect_states, init_logger, mk_states, sets_to_sorted_vectors};
use crate::trimming::TrimSetting;
use cancel_this::Cancellable;

fn collect_sccs<STATE, ALG>(config: SccConfig, initial: StateSet) -> Cancellable<Vec<Vec<usize>>>
where
    ALG: SccAlgorithm<STATE>,
    STATE: From<StateSet>,
{
    let mut found = Vec::new();
    for scc in ALG::configure(config, initial) {
        found.push(scc?);
    }
    Ok(sets_to_sorted_vectors(&found))
}

fn test_example_graph_impl<STATE, ALG>(trim: TrimSetting) -> Cancellable<()>
where
    ALG: SccAlgorithm<STATE>,
    STATE: From<StateSet>,
{
    init_logger();
    let graph = create_example_graph();
    let config = SccConfig::new(graph.clone()).should_trim(trim);
    let found = collect_sccs::<STATE, ALG>(config, graph.mk_all_states())?;
    assert_eq!(found, vec![vec![3, 4], vec![0, 1, 2]]);
    Ok(())
}

#[test]
fn test_fwd_bwd_example_graph() -> Cancellable<()> {
    test_example_graph_impl::<FwdBwdState, FwdBwdScc>(TrimSetting::Both)
}

#[test]
fn test_fwd_bwd_example_graph_without_trimming() -> Cancellable<()> {
    test_example_graph_impl::<FwdBwdState, FwdBwdScc>(TrimSetting::None)
}

#[test]
fn test_fwd_bwd_example_graph_one_sided_trimming() -> Cancellable<()> {
    test_example_graph_impl::<FwdBwdState, FwdBwdScc>(TrimSetting::Sinks)?;
    test_example_graph_impl::<FwdBwdState, FwdBwdScc>(TrimSetting::Sources)
}

#[test]
fn test_fwd_bwd_ignores_transitions_leaving_the_subset() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    // Without state 2, the cycle 0 -> 1 -> 2 -> 0 is broken.
    let subset = mk_states(&graph, &[0, 1, 3, 4]);
    let found = collect_sccs::<FwdBwdState, FwdBwdScc>(SccConfig::from(&graph), subset)?;
    assert_eq!(found, vec![vec![3, 4]]);
    Ok(())
}

#[test]
fn test_self_loop_is_trivial() -> Cancellable<()> {
    init_logger();
    let graph = TransitionGraph::from_edges(2, [(0, 0), (0, 1), (1, 1)]);
    let found = collect_sccs::<FwdBwdState, FwdBwdScc>(SccConfig::from(&graph), graph.mk_all_states())?;
    assert!(found.is_empty());
    Ok(())
}

#[test]
fn test_nested_cycles() -> Cancellable<()> {
    init_logger();
    // Two 2-cycles connected into one SCC, plus a separate 3-cycle reachable from it.
    let graph = TransitionGraph::from_edges(
        7,
        [
            (0, 1),
            (1, 0),
            (1, 2),
            (2, 3),
            (3, 2),
            (3, 0),
            (3, 4),
            (4, 5),
            (5, 6),
            (6, 4),
        ],
    );
    let found = collect_sccs::<FwdBwdState, FwdBwdScc>(SccConfig::from(&graph), graph.mk_all_states())?;
    assert_eq!(found, vec![vec![4, 5, 6], vec![0, 1, 2, 3]]);
    Ok(())
}

#[test]
fn test_decomposition_partitions_universe() -> Cancellable<()> {
    init_logger();
    let graph = create_example_graph();
    let decomposition = SccDecomposition::compute(&graph, &graph.mk_all_states())?;
    assert_eq!(decomposition.blocks.len(), 2);
    assert_eq!(collect_states(&decomposition.blocks[0]), vec![0, 1, 2]);
    assert_eq!(collect_states(&decomposition.blocks[1]), vec![3, 4]);
    assert_eq!(collect_states(&decomposition.trivial), vec![5, 6, 7]);
    assert_eq!(decomposition.len(), 5);

    let empty = SccDecomposition::compute(&graph, &graph.mk_empty_states())?;
    assert!(empty.is_empty());
    Ok(())
}
