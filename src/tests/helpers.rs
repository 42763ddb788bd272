//! Shared test utilities for story graph tests.

use std::collections::BTreeMap;

use crate::{
    condition::{AttributeCondition, Comparison},
    storygraph::{EdgeWeight, StoryGraph, StoryNode},
};

/// An equality fact about one attribute of one cast member.
pub fn fact(subject: &str, attribute: &str, value: &str) -> AttributeCondition {
    AttributeCondition::new(subject, attribute, value, Comparison::Equal)
}

/// Helper to create a bare action node with no attributes or target.
pub fn action(name: &str) -> StoryNode<AttributeCondition> {
    StoryNode::new(name, BTreeMap::new(), None)
}

/// Build a linear chain `names[0] -> names[1] -> ...`, edges wired from each
/// predecessor to its successor.
pub fn chain_graph(names: &[&str]) -> StoryGraph<AttributeCondition> {
    let mut graph = StoryGraph::new("test", "story");
    let mut previous = None;
    for name in names {
        let index = graph.add_node(action(name)).unwrap();
        if let Some(previous) = previous {
            graph.add_edge(previous, index, EdgeWeight::default());
        }
        previous = Some(index);
    }
    graph
}
