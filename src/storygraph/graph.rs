//! The story graph arena.
//!
//! Nodes and edges live in a [`StableDiGraph`] and are addressed by stable
//! [`NodeIndex`] handles; edges store origin/destination handles rather than
//! direct references, so bidirectional node/edge navigation carries no
//! ownership cycles. Edges point predecessor to successor; the validator
//! walks them backward.

use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableDiGraph},
    visit::{EdgeRef, IntoEdgeReferences},
    Direction,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    condition::Condition,
    error::FabulaError,
    storygraph::node::StoryNode,
    validate::ValidationPass,
};

/// Edge payload: free-form attribute pairs describing the transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub attributes: BTreeMap<String, String>,
}

impl EdgeWeight {
    /// Convenience constructor for the common single-attribute edge.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(key.into(), value.into());
        EdgeWeight { attributes }
    }
}

/// A directed graph of [`StoryNode`]s, addressable by handle and by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryGraph<C> {
    name: String,
    kind: String,
    graph: StableDiGraph<StoryNode<C>, EdgeWeight>,
    by_name: BTreeMap<String, NodeIndex>,
}

impl<C> StoryGraph<C> {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        StoryGraph {
            name: name.into(),
            kind: kind.into(),
            graph: StableDiGraph::default(),
            by_name: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn as_graph(&self) -> &StableDiGraph<StoryNode<C>, EdgeWeight> {
        &self.graph
    }

    /// Insert a node into the arena. Node names are unique per graph.
    pub fn add_node(&mut self, node: StoryNode<C>) -> Result<NodeIndex, FabulaError> {
        if self.by_name.contains_key(node.name()) {
            return Err(FabulaError::DuplicateNode(node.name().to_string()));
        }
        let name = node.name().to_string();
        let index = self.graph.add_node(node);
        self.by_name.insert(name, index);
        Ok(index)
    }

    /// Connect predecessor `from` to successor `to`.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, weight: EdgeWeight) -> EdgeIndex {
        self.graph.add_edge(from, to, weight)
    }

    pub fn add_edge_by_name(
        &mut self,
        from: &str,
        to: &str,
        weight: EdgeWeight,
    ) -> Result<EdgeIndex, FabulaError> {
        let from = self
            .index_of(from)
            .ok_or_else(|| FabulaError::NotFound(from.to_string()))?;
        let to = self
            .index_of(to)
            .ok_or_else(|| FabulaError::NotFound(to.to_string()))?;
        Ok(self.add_edge(from, to, weight))
    }

    pub fn node(&self, index: NodeIndex) -> Option<&StoryNode<C>> {
        self.graph.node_weight(index)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut StoryNode<C>> {
        self.graph.node_weight_mut(index)
    }

    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).copied()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&StoryNode<C>> {
        self.index_of(name).and_then(|index| self.node(index))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &StoryNode<C>)> {
        self.graph
            .node_indices()
            .filter_map(|index| self.graph.node_weight(index).map(|node| (index, node)))
    }

    /// Origin handles of every incoming edge. Order is not significant, but
    /// every predecessor is visited.
    pub fn incoming(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(index, Direction::Incoming)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the graph in Graphviz dot format, labelling each node with its
    /// name and validity and each edge with its attribute pairs.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("digraph \"{}\" {{\n", self.name));
        for (index, node) in self.nodes() {
            let color = if node.valid() { "ivory4" } else { "red" };
            out.push_str(&format!(
                "    n{} [label=\"{}\", color={}];\n",
                index.index(),
                node.name(),
                color
            ));
        }
        for edge in self.graph.edge_references() {
            let label = edge
                .weight()
                .attributes
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(
                "    n{} -> n{} [label=\"{}\"];\n",
                edge.source().index(),
                edge.target().index(),
                label
            ));
        }
        out.push_str("}\n");
        out
    }
}

impl<C: Condition + Clone> StoryGraph<C> {
    /// Run a backward consistency check from `start` and commit the verdicts
    /// into the visited nodes' validity flags.
    ///
    /// `requirements` are the facts a downstream action needs satisfied by
    /// the time the chain passes through `start`; `incoming_valid` is the
    /// verdict already accumulated downstream of it. Nodes the pass never
    /// reaches keep their pre-call validity, and a pass aborted by a detected
    /// cycle commits nothing.
    pub fn validate_from(
        &mut self,
        start: NodeIndex,
        requirements: &[C],
        incoming_valid: bool,
    ) -> Result<(), FabulaError> {
        let verdicts = {
            let mut pass = ValidationPass::new(self);
            pass.run(start, requirements.to_vec(), incoming_valid)?;
            pass.into_verdicts()
        };
        tracing::debug!(
            "validation from '{}' visited {} node(s)",
            self.node(start).map(StoryNode::name).unwrap_or("?"),
            verdicts.len()
        );
        for (index, verdict) in verdicts {
            if let Some(node) = self.node_mut(index) {
                node.set_valid(verdict);
            }
        }
        Ok(())
    }
}
