//! # fabula-core
//!
//! A library for representing branching narratives as directed graphs of
//! *action nodes* and checking those graphs for causal consistency.
//!
//! ## Overview
//!
//! Each action node carries the facts it requires (*preconditions*) and the
//! facts it establishes (*postconditions*). A graph built by authoring tools
//! or a planner is only usable once no action is reachable along a causal
//! chain that requires a fact invalidated earlier in that chain. The core of
//! this crate is that check: a backward, chain-sensitive constraint
//! propagation that marks nodes valid or invalid based on the conditions
//! accumulated along every path leading into them.
//!
//! ## Architecture
//!
//! - **[`condition`]**: the [`Condition`](condition::Condition) capability
//!   (conflict and structural-equality predicates), concrete attribute and
//!   relation conditions, and the [`exists_conflict`](condition::exists_conflict)
//!   probe
//! - **[`storygraph`]**: the petgraph-backed arena of
//!   [`StoryNode`](storygraph::StoryNode)s with stable handles, node
//!   attributes, and rewrite-flag state
//! - **[`validate`]**: [`ValidationPass`](validate::ValidationPass), the
//!   backward conflict-propagation traversal
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use fabula_core::condition::{AttributeCondition, Comparison};
//! use fabula_core::storygraph::{EdgeWeight, StoryGraph, StoryNode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut graph: StoryGraph<AttributeCondition> = StoryGraph::new("heist", "story");
//!
//!     let mut steal = StoryNode::new("steal_key", BTreeMap::new(), None);
//!     steal.add_postcondition(AttributeCondition::new(
//!         "guard", "has_key", "false", Comparison::Equal,
//!     ));
//!     let steal = graph.add_node(steal)?;
//!
//!     let mut bribe = StoryNode::new("bribe_guard", BTreeMap::new(), None);
//!     bribe.add_precondition(AttributeCondition::new(
//!         "guard", "has_key", "true", Comparison::Equal,
//!     ));
//!     let bribe = graph.add_node(bribe)?;
//!
//!     graph.add_edge(steal, bribe, EdgeWeight::default());
//!
//!     // Bribing the guard needs the key the earlier theft removed.
//!     graph.validate_from(bribe, &[], true)?;
//!     assert!(!graph.node(steal).unwrap().valid());
//!     assert!(graph.node(bribe).unwrap().valid());
//!     Ok(())
//! }
//! ```
//!
//! ## Semantics
//!
//! Validation walks *backward* over incoming edges. At each node it folds the
//! downstream verdict into the node's own validity, invalidates the node when
//! a downstream requirement conflicts with one of its postconditions, drops
//! requirements the node's postconditions re-establish, appends the node's
//! own preconditions, and recurses into every predecessor. Validity only ever
//! degrades within a pass ("worst path wins" across diamonds); a true cycle
//! on the backward path is reported as a structured error instead of
//! recursing forever.
//!
//! Out of scope: planners that construct graphs, graph repair, the semantics
//! of social-modification payloads, and rewrite-flag transition logic. The
//! flags and payloads are carried as node state for those passes but are
//! never interpreted here.

pub mod condition;
pub mod error;
pub mod storygraph;
#[cfg(test)]
mod tests;
pub mod validate;

pub use error::*;
