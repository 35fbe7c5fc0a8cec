//! Terms of the symbolic graph.
//!
//! A [`Term`] is an immutable node: a fresh input, a constant, or an operation over earlier
//! terms. Terms are addressed by [`TermId`], a dense index into the owning graph. Operand
//! ids are always smaller than the id of the term using them, so iterating ids in ascending
//! order visits operands first.

use std::fmt;

use crate::{
    kind::{ConcreteValue, KindTag},
    ops::{BinaryOp, CastOp, CompareOp, UnaryOp},
};

/// Index of a term in its session's graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(usize);

impl TermId {
    /// Creates a term id from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The operation defining a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermNode {
    /// A fresh, unconstrained input.
    Input {
        /// Display name.
        name: String,
        /// The default the caller supplied; shown by dumps only.
        default: ConcreteValue,
    },

    /// A constant bit pattern, masked to the term width.
    Const(u64),

    /// A unary operation.
    Unary {
        /// The operation to perform.
        op: UnaryOp,
        /// The operand.
        operand: TermId,
    },

    /// A binary operation over operands of the term's kind.
    Binary {
        /// The operation to perform.
        op: BinaryOp,
        /// The left operand.
        left: TermId,
        /// The right operand.
        right: TermId,
    },

    /// A comparison; the term kind is boolean, the operands share another kind.
    Compare {
        /// The comparison to perform.
        op: CompareOp,
        /// The left operand.
        left: TermId,
        /// The right operand.
        right: TermId,
    },

    /// If-then-else over a boolean condition.
    Ite {
        /// The boolean condition.
        cond: TermId,
        /// Selected when the condition holds.
        then: TermId,
        /// Selected otherwise.
        otherwise: TermId,
    },

    /// A conversion from the operand's kind to the term's kind.
    Cast {
        /// How to widen.
        op: CastOp,
        /// The converted operand.
        operand: TermId,
    },

    /// An operation whose operands did not have the kinds it requires.
    ///
    /// Recorded instead of the operation, so that evaluating or exporting any value that
    /// depends on it fails with [`crate::Error::InvalidArgument`].
    Invalid {
        /// What was wrong with the operation.
        reason: String,
    },
}

/// An immutable node of the term graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    kind: KindTag,
    node: TermNode,
}

impl Term {
    /// Creates a term of the given kind.
    #[must_use]
    pub const fn new(kind: KindTag, node: TermNode) -> Self {
        Self { kind, node }
    }

    /// Returns the kind of the value this term computes.
    #[must_use]
    pub const fn kind(&self) -> KindTag {
        self.kind
    }

    /// Returns the defining operation.
    #[must_use]
    pub const fn node(&self) -> &TermNode {
        &self.node
    }

    /// Returns `true` for fresh inputs.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self.node, TermNode::Input { .. })
    }

    /// Returns the constant bit pattern, if this is a constant.
    #[must_use]
    pub const fn as_const(&self) -> Option<u64> {
        match self.node {
            TermNode::Const(bits) => Some(bits),
            _ => None,
        }
    }

    /// Returns `true` for terms recording a malformed operation.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self.node, TermNode::Invalid { .. })
    }

    /// Returns the input name, if this is an input.
    #[must_use]
    pub fn input_name(&self) -> Option<&str> {
        match &self.node {
            TermNode::Input { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the operands of this term, in order.
    #[must_use]
    pub fn operands(&self) -> Vec<TermId> {
        match self.node {
            TermNode::Input { .. } | TermNode::Const(_) | TermNode::Invalid { .. } => Vec::new(),
            TermNode::Unary { operand, .. } | TermNode::Cast { operand, .. } => vec![operand],
            TermNode::Binary { left, right, .. } | TermNode::Compare { left, right, .. } => {
                vec![left, right]
            }
            TermNode::Ite {
                cond,
                then,
                otherwise,
            } => vec![cond, then, otherwise],
        }
    }
}
