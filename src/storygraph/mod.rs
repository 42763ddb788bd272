//! Story graph arena: node identity, attributes, rewrite-flag state, and the
//! petgraph-backed graph the validator traverses.
//!
//! # Module Organization
//!
//! - [`node`]: [`StoryNode`] and its building blocks ([`Nid`],
//!   [`NodeAttribute`], [`RewriteFlag`])
//! - [`graph`]: the [`StoryGraph`] arena with stable node handles and
//!   attribute-carrying edges

mod graph;
mod node;


pub use graph::{EdgeWeight, StoryGraph};
pub use node::{Nid, NodeAttribute, RewriteFlag, StoryNode};
