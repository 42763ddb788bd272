//! Atomic narrative predicates and their compatibility relations.
//!
//! The validator in [`crate::validate`] only ever asks two questions of a
//! condition: can this fact and that fact hold at the same time
//! ([`Condition::conflicts`]), and do these two values describe the exact
//! same fact ([`Condition::equals`])? Anything answering both is usable as a
//! pre- or postcondition; [`AttributeCondition`] and [`RelationCondition`]
//! are the concrete representations used by the stock authoring pipeline.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Capability required of any predicate attached to a story node.
///
/// `conflicts` must be treated as symmetric by callers, and `equals` must be
/// a reflexive structural comparison (same fact, regardless of identity).
pub trait Condition {
    /// True when the two predicates cannot simultaneously hold.
    fn conflicts(&self, other: &Self) -> bool;

    /// Structural equality: both values describe the exact same fact.
    fn equals(&self, other: &Self) -> bool;
}

/// Return the first element of `check_against` (in sequence order) that
/// conflicts with `candidate`, or `None` when nothing does.
///
/// Pure lookup with no side effects; usable standalone for authoring-time
/// conflict warnings as well as by the validation pass.
pub fn exists_conflict<'a, C: Condition>(candidate: &C, check_against: &'a [C]) -> Option<&'a C> {
    check_against.iter().find(|cond| candidate.conflicts(cond))
}

/// How an [`AttributeCondition`] constrains the observed attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    Greater,
    Lesser,
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Comparison::Equal => "=",
            Comparison::Greater => ">",
            Comparison::Lesser => "<",
        };
        write!(f, "{symbol}")
    }
}

/// A fact about one attribute of one cast member, e.g. `guard.has_key = true`
/// or `hero.gold > 10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeCondition {
    pub subject: String,
    pub attribute: String,
    pub value: String,
    pub comparison: Comparison,
}

impl AttributeCondition {
    pub fn new(
        subject: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
        comparison: Comparison,
    ) -> Self {
        AttributeCondition {
            subject: subject.into(),
            attribute: attribute.into(),
            value: value.into(),
            comparison,
        }
    }

    /// Whether `other`'s value satisfies this condition's comparison.
    ///
    /// Ordered comparisons parse both values as integers; a value that does
    /// not parse never satisfies `Greater` or `Lesser`.
    pub fn compares(&self, other: &AttributeCondition) -> bool {
        match self.comparison {
            Comparison::Equal => other.value == self.value,
            Comparison::Greater => match (other.value.parse::<i64>(), self.value.parse::<i64>()) {
                (Ok(theirs), Ok(ours)) => theirs > ours,
                _ => false,
            },
            Comparison::Lesser => match (other.value.parse::<i64>(), self.value.parse::<i64>()) {
                (Ok(theirs), Ok(ours)) => theirs < ours,
                _ => false,
            },
        }
    }
}

impl Condition for AttributeCondition {
    /// Two attribute conditions conflict when they constrain the same
    /// attribute of the same subject and the other value does not satisfy
    /// this condition's comparison.
    fn conflicts(&self, other: &Self) -> bool {
        self.subject == other.subject
            && self.attribute == other.attribute
            && !self.compares(other)
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl Display for AttributeCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {} {}",
            self.subject, self.attribute, self.comparison, self.value
        )
    }
}

/// A fact about the relationship between two named cast members, keyed by a
/// single relation attribute, e.g. `hero -[ally]-> smith`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationCondition {
    pub source: String,
    pub target: String,
    pub attribute: String,
}

impl RelationCondition {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        RelationCondition {
            source: source.into(),
            target: target.into(),
            attribute: attribute.into(),
        }
    }
}

impl Condition for RelationCondition {
    /// Two relation conditions conflict when they bind the same endpoints to
    /// differing relation attributes.
    fn conflicts(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.attribute != other.attribute
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl Display for RelationCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.attribute, self.target)
    }
}

/// Paired pre/postcondition lists accumulated by authoring code (e.g. while
/// matching a rewrite rule) before being attached to a [`crate::storygraph::StoryNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionBlock<C> {
    pub preconditions: Vec<C>,
    pub postconditions: Vec<C>,
}

impl<C> Default for ConditionBlock<C> {
    fn default() -> Self {
        ConditionBlock {
            preconditions: Vec::new(),
            postconditions: Vec::new(),
        }
    }
}

impl<C> ConditionBlock<C> {
    /// Concatenate another block onto this one, preserving order.
    pub fn append(&mut self, other: ConditionBlock<C>) {
        self.preconditions.extend(other.preconditions);
        self.postconditions.extend(other.postconditions);
    }
}
