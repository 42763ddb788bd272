//! Tests for the backward conflict-propagation validator.

use super::helpers::*;
use crate::{
    error::FabulaError,
    storygraph::{EdgeWeight, StoryGraph},
    validate::ValidationPass,
};
use test_log::test;

#[test]
fn test_conflicting_ancestor_invalidated() {
    // A -> B -> C. C requires has_key; A established the opposite.
    let mut graph = chain_graph(&["a", "b", "c"]);
    let a = graph.index_of("a").unwrap();
    let b = graph.index_of("b").unwrap();
    let c = graph.index_of("c").unwrap();
    graph
        .node_mut(a)
        .unwrap()
        .add_postcondition(fact("player", "has_key", "false"));

    graph
        .validate_from(c, &[fact("player", "has_key", "true")], true)
        .unwrap();

    assert!(graph.node(c).unwrap().valid());
    assert!(graph.node(b).unwrap().valid());
    assert!(!graph.node(a).unwrap().valid());
}

#[test]
fn test_equal_postcondition_consumes_requirement() {
    // A re-establishes the exact required fact, so it stays valid and the
    // requirement is not forwarded further.
    let mut graph = chain_graph(&["a", "b", "c"]);
    let a = graph.index_of("a").unwrap();
    let c = graph.index_of("c").unwrap();
    graph
        .node_mut(a)
        .unwrap()
        .add_postcondition(fact("player", "has_key", "true"));

    graph
        .validate_from(c, &[fact("player", "has_key", "true")], true)
        .unwrap();

    for (_, node) in graph.nodes() {
        assert!(node.valid(), "node '{}' should stay valid", node.name());
    }
}

#[test]
fn test_consumed_requirement_not_forwarded_past_provider() {
    // A -> B -> C where B re-establishes the fact and A contradicts it. The
    // requirement must die at B, leaving A untouched.
    let mut graph = chain_graph(&["a", "b", "c"]);
    let a = graph.index_of("a").unwrap();
    let b = graph.index_of("b").unwrap();
    let c = graph.index_of("c").unwrap();
    graph
        .node_mut(b)
        .unwrap()
        .add_postcondition(fact("player", "has_key", "true"));
    graph
        .node_mut(a)
        .unwrap()
        .add_postcondition(fact("player", "has_key", "false"));

    graph
        .validate_from(c, &[fact("player", "has_key", "true")], true)
        .unwrap();

    assert!(graph.node(a).unwrap().valid());
    assert!(graph.node(b).unwrap().valid());
    assert!(graph.node(c).unwrap().valid());
}

#[test]
fn test_own_preconditions_forwarded_to_predecessors() {
    // B needs door_open; A established the opposite. Even with no initial
    // requirements, B's own needs must reach A.
    let mut graph = chain_graph(&["a", "b", "c"]);
    let a = graph.index_of("a").unwrap();
    let b = graph.index_of("b").unwrap();
    let c = graph.index_of("c").unwrap();
    graph
        .node_mut(b)
        .unwrap()
        .add_precondition(fact("door", "open", "true"));
    graph
        .node_mut(a)
        .unwrap()
        .add_postcondition(fact("door", "open", "false"));

    graph.validate_from(c, &[], true).unwrap();

    assert!(!graph.node(a).unwrap().valid());
    assert!(graph.node(b).unwrap().valid());
    assert!(graph.node(c).unwrap().valid());
}

#[test]
fn test_worst_path_wins_in_diamond() {
    // s -> x -> t and s -> y -> t. The x path is invalidated, the y path is
    // clean; the shared ancestor s must fold both and end up invalid.
    let mut graph = chain_graph(&["s"]);
    let s = graph.index_of("s").unwrap();
    let x = graph.add_node(action("x")).unwrap();
    let y = graph.add_node(action("y")).unwrap();
    let t = graph.add_node(action("t")).unwrap();
    graph.add_edge(s, x, EdgeWeight::default());
    graph.add_edge(s, y, EdgeWeight::default());
    graph.add_edge(x, t, EdgeWeight::default());
    graph.add_edge(y, t, EdgeWeight::default());
    graph
        .node_mut(x)
        .unwrap()
        .add_postcondition(fact("hero", "alive", "false"));

    graph
        .validate_from(t, &[fact("hero", "alive", "true")], true)
        .unwrap();

    assert!(graph.node(t).unwrap().valid());
    assert!(!graph.node(x).unwrap().valid());
    assert!(graph.node(y).unwrap().valid());
    assert!(!graph.node(s).unwrap().valid());
}

#[test]
fn test_seeded_invalidity_propagates_and_sticks() {
    // A pre-seeded false on B degrades everything backward of B and is never
    // reset by a conflict-free pass.
    let mut graph = chain_graph(&["a", "b", "c"]);
    let a = graph.index_of("a").unwrap();
    let b = graph.index_of("b").unwrap();
    let c = graph.index_of("c").unwrap();
    graph.node_mut(b).unwrap().set_valid(false);

    graph.validate_from(c, &[], true).unwrap();

    assert!(graph.node(c).unwrap().valid());
    assert!(!graph.node(b).unwrap().valid());
    assert!(!graph.node(a).unwrap().valid());
}

#[test]
fn test_incoming_invalid_degrades_whole_chain() {
    let mut graph = chain_graph(&["a", "b", "c"]);
    let c = graph.index_of("c").unwrap();

    graph.validate_from(c, &[], false).unwrap();

    for (_, node) in graph.nodes() {
        assert!(!node.valid(), "node '{}' should be invalid", node.name());
    }
}

#[test]
fn test_unreached_nodes_keep_their_validity() {
    let mut graph = chain_graph(&["a", "b", "c"]);
    let b = graph.index_of("b").unwrap();
    let lonely = graph.add_node(action("lonely")).unwrap();

    graph.validate_from(b, &[], false).unwrap();

    // b and a were reached, c and the disconnected node were not.
    assert!(!graph.node(b).unwrap().valid());
    assert!(graph.node(graph.index_of("c").unwrap()).unwrap().valid());
    assert!(graph.node(lonely).unwrap().valid());
}

#[test]
fn test_cycle_reported_as_error() {
    let mut graph = chain_graph(&["a", "b"]);
    let a = graph.index_of("a").unwrap();
    let b = graph.index_of("b").unwrap();
    graph.add_edge(b, a, EdgeWeight::default());

    let err = graph.validate_from(b, &[], true).unwrap_err();
    assert!(matches!(err, FabulaError::CycleDetected { .. }));

    // An aborted pass commits nothing.
    assert!(graph.node(a).unwrap().valid());
    assert!(graph.node(b).unwrap().valid());
}

#[test]
fn test_self_loop_reported_as_error() {
    let mut graph = chain_graph(&["a"]);
    let a = graph.index_of("a").unwrap();
    graph.add_edge(a, a, EdgeWeight::default());

    let err = graph.validate_from(a, &[], true).unwrap_err();
    assert_eq!(
        err,
        FabulaError::CycleDetected {
            node: "a".to_string()
        }
    );
}

#[test]
fn test_pass_does_not_mutate_graph() {
    let mut graph = chain_graph(&["a", "b"]);
    let a = graph.index_of("a").unwrap();
    let b = graph.index_of("b").unwrap();
    graph
        .node_mut(a)
        .unwrap()
        .add_postcondition(fact("player", "has_key", "false"));

    let mut pass = ValidationPass::new(&graph);
    pass.run(b, vec![fact("player", "has_key", "true")], true)
        .unwrap();

    assert_eq!(pass.is_valid(a), Some(false));
    assert_eq!(pass.is_valid(b), Some(true));
    // Verdicts live in the pass until committed.
    assert!(graph.node(a).unwrap().valid());
    assert!(graph.node(b).unwrap().valid());
}

#[test]
fn test_single_node_with_no_predecessors() {
    let mut graph = chain_graph(&["only"]);
    let only = graph.index_of("only").unwrap();

    graph
        .validate_from(only, &[fact("player", "has_key", "true")], true)
        .unwrap();

    assert!(graph.node(only).unwrap().valid());
}

#[test]
fn test_conflict_with_passed_requirement_at_start_node() {
    // The starting node's own postconditions are checked against the passed
    // requirements too.
    let mut graph = chain_graph(&["only"]);
    let only = graph.index_of("only").unwrap();
    graph
        .node_mut(only)
        .unwrap()
        .add_postcondition(fact("player", "has_key", "false"));

    graph
        .validate_from(only, &[fact("player", "has_key", "true")], true)
        .unwrap();

    assert!(!graph.node(only).unwrap().valid());
}

#[test]
fn test_verdicts_cover_every_reached_node() {
    let graph = chain_graph(&["a", "b", "c"]);
    let c = graph.index_of("c").unwrap();

    let mut pass = ValidationPass::new(&graph);
    pass.run(c, vec![], true).unwrap();

    assert_eq!(pass.verdicts().len(), 3);
    assert!(pass.verdicts().values().all(|valid| *valid));
}

#[test]
fn test_requirements_survive_unrelated_postconditions() {
    // A postcondition on an unrelated attribute neither consumes nor
    // conflicts with the requirement, which must still reach the ancestor.
    let mut graph = chain_graph(&["a", "b", "c"]);
    let a = graph.index_of("a").unwrap();
    let b = graph.index_of("b").unwrap();
    let c = graph.index_of("c").unwrap();
    graph
        .node_mut(b)
        .unwrap()
        .add_postcondition(fact("door", "open", "true"));
    graph
        .node_mut(a)
        .unwrap()
        .add_postcondition(fact("player", "has_key", "false"));

    graph
        .validate_from(c, &[fact("player", "has_key", "true")], true)
        .unwrap();

    assert!(!graph.node(a).unwrap().valid());
    assert!(graph.node(b).unwrap().valid());
}

#[test]
fn test_validation_by_name_lookup_roundtrip() {
    let mut graph: StoryGraph<_> = chain_graph(&["intro", "betrayal", "finale"]);
    let finale = graph.index_of("finale").unwrap();
    graph
        .node_mut(graph.index_of("intro").unwrap())
        .unwrap()
        .add_postcondition(fact("mentor", "alive", "false"));

    graph
        .validate_from(finale, &[fact("mentor", "alive", "true")], true)
        .unwrap();

    assert!(!graph.node_by_name("intro").unwrap().valid());
    assert!(graph.node_by_name("betrayal").unwrap().valid());
    assert!(graph.node_by_name("finale").unwrap().valid());
}
