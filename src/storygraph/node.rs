//! Action nodes and their identity, attribute, and flag state.

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};
use uuid::Uuid;

/// Narrative ID
///
/// Stable identity for a story node or cast member, independent of any graph
/// arena it is stored in. Opaque to the validator: targets and linked-node
/// references are carried as `Nid`s but never dereferenced during
/// validation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Nid(Uuid);

impl Nid {
    pub fn new() -> Self {
        Nid(Uuid::new_v4())
    }

    /// A nil `Nid` marks an item with no assigned identity.
    pub fn nil() -> Self {
        Nid(Uuid::nil())
    }
}

impl Default for Nid {
    fn default() -> Self {
        Nid::new()
    }
}

impl Display for Nid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// A typed attribute value attached to a node under a string key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttribute {
    pub kind: String,
    pub value: String,
}

impl NodeAttribute {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        NodeAttribute {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Flags consumed by the condition-based rewriting pass.
///
/// Carried as node state only. The validator neither reads nor writes them,
/// and their transition logic lives with the rewriting machinery.
#[derive(EnumSetType, Debug, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
pub enum RewriteFlag {
    PermanentNoUse,
    TempNoUse,
    ComingIn,
    GoingOut,
}

/// An action within a story: what it targets, what it requires, what it
/// establishes, and whether the chains leading into it are consistent.
///
/// Generic over the condition representation `C`; any type implementing
/// [`crate::condition::Condition`] works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryNode<C> {
    name: String,
    nid: Nid,
    attributes: BTreeMap<String, NodeAttribute>,
    target: Option<Nid>,
    linked_to: Option<Nid>,
    social_modification: Option<serde_json::Value>,
    preconditions: Vec<C>,
    postconditions: Vec<C>,
    valid: bool,
    flags: EnumSet<RewriteFlag>,
}

impl<C> StoryNode<C> {
    /// Construct an action node. Starts valid, with empty condition lists,
    /// no linked node, no modification payload, and no rewrite flags.
    pub fn new(
        name: impl Into<String>,
        attributes: BTreeMap<String, NodeAttribute>,
        target: Option<Nid>,
    ) -> Self {
        StoryNode {
            name: name.into(),
            nid: Nid::new(),
            attributes,
            target,
            linked_to: None,
            social_modification: None,
            preconditions: Vec::new(),
            postconditions: Vec::new(),
            valid: true,
            flags: EnumSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nid(&self) -> Nid {
        self.nid
    }

    pub fn attributes(&self) -> &BTreeMap<String, NodeAttribute> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&NodeAttribute> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, attribute: NodeAttribute) {
        self.attributes.insert(key.into(), attribute);
    }

    /// Whether every causal chain into this node is consistent, as far as
    /// validation has determined. True until proven otherwise.
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Seed or overwrite the validity verdict. Authoring code may use this to
    /// reset a node between passes; the validator itself only degrades it.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// The cast node this action affects. Never dereferenced here.
    pub fn target(&self) -> Option<Nid> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Nid>) {
        self.target = target;
    }

    /// Back-reference used by the rewriting pass.
    pub fn linked_to(&self) -> Option<Nid> {
        self.linked_to
    }

    pub fn set_linked_to(&mut self, node: Option<Nid>) {
        self.linked_to = node;
    }

    /// The social-graph delta this action applies when it fires. Opaque at
    /// this layer; carried for the rewriting machinery.
    pub fn modification(&self) -> Option<&serde_json::Value> {
        self.social_modification.as_ref()
    }

    pub fn set_modification(&mut self, modification: Option<serde_json::Value>) {
        self.social_modification = modification;
    }

    pub fn flags(&self) -> EnumSet<RewriteFlag> {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut EnumSet<RewriteFlag> {
        &mut self.flags
    }

    /// Facts this action requires to be true when it executes.
    pub fn preconditions(&self) -> &[C] {
        &self.preconditions
    }

    pub fn add_precondition(&mut self, precondition: C) {
        self.preconditions.push(precondition);
    }

    pub fn add_preconditions(&mut self, preconditions: impl IntoIterator<Item = C>) {
        self.preconditions.extend(preconditions);
    }

    pub fn set_preconditions(&mut self, preconditions: Vec<C>) {
        self.preconditions = preconditions;
    }

    /// Facts this action establishes once it has executed.
    pub fn postconditions(&self) -> &[C] {
        &self.postconditions
    }

    pub fn add_postcondition(&mut self, postcondition: C) {
        self.postconditions.push(postcondition);
    }

    pub fn add_postconditions(&mut self, postconditions: impl IntoIterator<Item = C>) {
        self.postconditions.extend(postconditions);
    }

    pub fn set_postconditions(&mut self, postconditions: Vec<C>) {
        self.postconditions = postconditions;
    }

    /// Seed a new narrative branch from this node.
    ///
    /// The duplicate carries the same name, a copy of the attributes, the
    /// same target, modification payload, and linked-node reference, plus a
    /// derived `"target"` attribute recording the link. It gets a fresh
    /// [`Nid`], empty condition lists, default validity, no flags, and is not
    /// wired into any edges; validation must be re-run on any graph that
    /// includes it before its verdict means anything.
    pub fn duplicate(&self) -> StoryNode<C> {
        let mut copy = StoryNode::new(self.name.clone(), self.attributes.clone(), self.target);
        copy.linked_to = self.linked_to;
        copy.social_modification = self.social_modification.clone();
        if let Some(link) = self.linked_to {
            copy.attributes
                .insert("target".to_string(), NodeAttribute::new("link", link.to_string()));
        }
        copy
    }
}

impl<C> Display for StoryNode<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.nid)
    }
}
