//! Backward causal-consistency validation.
//!
//! A [`ValidationPass`] walks incoming edges from a starting node, carrying
//! the set of facts some downstream action still needs. At every node it
//! folds the downstream verdict into the node's validity, invalidates the
//! node when a carried requirement conflicts with one of its postconditions,
//! consumes requirements the node re-establishes, appends the node's own
//! preconditions, and recurses into every predecessor.
//!
//! Validity is tracked in a per-pass scratch map seeded from each node's
//! stored flag on first visit, and folded with a monotonic AND: once any node
//! on a path is invalid, that invalidity reaches every node backward of it on
//! the path, and revisits through other paths can only degrade the verdict
//! further ("worst path wins"). The graph itself is untouched until
//! [`crate::storygraph::StoryGraph::validate_from`] commits the verdicts, so
//! a pass aborted by a cycle leaves no partial state behind.

use petgraph::stable_graph::NodeIndex;
use std::collections::BTreeMap;

use crate::{
    condition::{exists_conflict, Condition},
    error::FabulaError,
    storygraph::StoryGraph,
};

/// One backward consistency check over a story graph.
///
/// Borrows the graph immutably; the only state is the verdict map and the
/// current backward path. A node recurring on the current path is a true
/// cycle and aborts the pass with [`FabulaError::CycleDetected`], while
/// reaching the same node along a *different* path (a diamond) is legitimate
/// and re-folds its verdict.
pub struct ValidationPass<'g, C> {
    graph: &'g StoryGraph<C>,
    verdicts: BTreeMap<NodeIndex, bool>,
    path: Vec<NodeIndex>,
}

impl<'g, C: Condition + Clone> ValidationPass<'g, C> {
    pub fn new(graph: &'g StoryGraph<C>) -> Self {
        ValidationPass {
            graph,
            verdicts: BTreeMap::new(),
            path: Vec::new(),
        }
    }

    /// Launch the check at `start`.
    ///
    /// `requirements` are the facts a downstream action needs satisfied by
    /// the time the narrative chain reaches and passes through `start`;
    /// `incoming_valid` is the verdict accumulated downstream of it (pass
    /// `true` when starting fresh). On success the verdict map covers every
    /// node reached backward from `start`.
    pub fn run(
        &mut self,
        start: NodeIndex,
        requirements: Vec<C>,
        incoming_valid: bool,
    ) -> Result<(), FabulaError> {
        self.visit(start, requirements, incoming_valid)
    }

    /// Per-pass verdicts for every node visited so far.
    pub fn verdicts(&self) -> &BTreeMap<NodeIndex, bool> {
        &self.verdicts
    }

    pub fn into_verdicts(self) -> BTreeMap<NodeIndex, bool> {
        self.verdicts
    }

    /// This pass's verdict for a node, or `None` if the pass never reached it.
    pub fn is_valid(&self, index: NodeIndex) -> Option<bool> {
        self.verdicts.get(&index).copied()
    }

    fn visit(
        &mut self,
        index: NodeIndex,
        requirements: Vec<C>,
        incoming_valid: bool,
    ) -> Result<(), FabulaError> {
        if self.path.contains(&index) {
            let node = self
                .graph
                .node(index)
                .map(|node| node.name().to_string())
                .unwrap_or_else(|| format!("#{}", index.index()));
            return Err(FabulaError::CycleDetected { node });
        }
        let graph = self.graph;
        let Some(node) = graph.node(index) else {
            return Err(FabulaError::NotFound(format!(
                "story node #{}",
                index.index()
            )));
        };
        tracing::trace!(
            "validating '{}' with {} requirement(s), incoming_valid={}",
            node.name(),
            requirements.len(),
            incoming_valid
        );

        // Fold the downstream verdict into this node's accumulated one,
        // seeding from the stored flag the first time the pass gets here.
        let seeded = *self.verdicts.entry(index).or_insert(node.valid());
        let mut verdict = incoming_valid && seeded;

        // An earlier action asserting a fact that contradicts what a later
        // action still needs is a narrative inconsistency.
        for requirement in &requirements {
            if exists_conflict(requirement, node.postconditions()).is_some() {
                tracing::debug!(
                    "invalidating '{}': it establishes a fact a downstream action needs untouched",
                    node.name()
                );
                verdict = false;
            }
        }
        self.verdicts.insert(index, verdict);

        // A postcondition that re-establishes the exact required fact
        // consumes the requirement; predecessors no longer need to guarantee
        // it. Surviving requirements keep their order, with this node's own
        // preconditions appended after them.
        let mut forwarded: Vec<C> = requirements
            .into_iter()
            .filter(|requirement| {
                !node
                    .postconditions()
                    .iter()
                    .any(|post| post.equals(requirement))
            })
            .collect();
        forwarded.extend(node.preconditions().iter().cloned());

        let predecessors: Vec<NodeIndex> = graph.incoming(index).collect();
        self.path.push(index);
        for origin in predecessors {
            if let Err(err) = self.visit(origin, forwarded.clone(), verdict) {
                self.path.pop();
                return Err(err);
            }
        }
        self.path.pop();
        Ok(())
    }
}
