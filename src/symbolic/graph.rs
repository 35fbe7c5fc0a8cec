//! Append-only term graph.
//!
//! [`TermGraph`] stores every term of a symbolic session in a lock-free arena, so terms can
//! be appended through a shared reference from any thread. Derived terms are hash-consed:
//! requesting a structurally identical operation returns the existing id. Inputs are never
//! shared, each call creates a distinct term.
//!
//! Operations whose operands are all constants are folded with [`crate::ops`] instead of
//! being recorded. No other rewriting takes place.
//!
//! Operations whose operands disagree on their kinds are recorded as
//! [`TermNode::Invalid`] terms. Evaluating or exporting a value that depends on one fails.

use std::{
    collections::HashSet,
    fmt::Write as _,
    sync::atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;

use crate::{
    kind::{ConcreteValue, KindTag},
    ops::{self, BinaryOp, CastOp, CompareOp, UnaryOp},
    symbolic::term::{Term, TermId, TermNode},
    Error, Result,
};

/// Nesting depth after which rendering refers to subterms by id.
const RENDER_DEPTH: usize = 12;

/// The term arena of one symbolic session.
pub struct TermGraph {
    /// All terms, indexed by [`TermId`].
    terms: boxcar::Vec<Term>,
    /// Ids of input terms, in allocation order.
    inputs: boxcar::Vec<TermId>,
    /// Hash-cons table for constants and derived terms.
    shared: DashMap<Term, TermId>,
    /// Counter used to name unnamed inputs.
    next_input: AtomicUsize,
    /// Prefix of generated input names.
    prefix: String,
}

impl TermGraph {
    /// Creates an empty graph naming unnamed inputs `<prefix><n>`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            terms: boxcar::Vec::new(),
            inputs: boxcar::Vec::new(),
            shared: DashMap::new(),
            next_input: AtomicUsize::new(0),
            prefix: prefix.into(),
        }
    }

    /// Returns the number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.count()
    }

    /// Returns `true` if the graph holds no term.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of input terms.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.count()
    }

    /// Returns the term with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTerm`] if `id` does not belong to this graph.
    pub fn get(&self, id: TermId) -> Result<&Term> {
        self.terms.get(id.index()).ok_or(Error::UnknownTerm(id))
    }

    /// Returns the term with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph. Handles of one session are not
    /// valid in another.
    #[must_use]
    pub fn term(&self, id: TermId) -> &Term {
        match self.terms.get(id.index()) {
            Some(term) => term,
            None => panic!("{id} does not belong to this session"),
        }
    }

    /// Returns `true` if `id` is an input term of this graph.
    #[must_use]
    pub fn is_input(&self, id: TermId) -> bool {
        self.terms.get(id.index()).is_some_and(Term::is_input)
    }

    /// Returns the ids of all input terms, in creation order.
    #[must_use]
    pub fn inputs(&self) -> Vec<TermId> {
        let mut inputs: Vec<TermId> = (0..self.inputs.count())
            .filter_map(|index| self.inputs.get(index).copied())
            .collect();
        inputs.sort_unstable();
        inputs
    }

    /// Appends a new input term.
    ///
    /// # Arguments
    ///
    /// * `kind` - The kind of the input.
    /// * `name` - Display name; a generated `<prefix><n>` name when `None`.
    /// * `default` - The caller's default value, kept for dumps.
    pub fn add_input(&self, kind: KindTag, name: Option<&str>, default: ConcreteValue) -> TermId {
        let number = self.next_input.fetch_add(1, Ordering::Relaxed);
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("{}{number}", self.prefix),
        };

        let id = TermId::new(self.terms.push(Term::new(kind, TermNode::Input { name, default })));
        self.inputs.push(id);
        id
    }

    /// Returns the constant term holding `bits`, masked to the kind width.
    pub fn add_const(&self, kind: KindTag, bits: u64) -> TermId {
        self.intern(Term::new(kind, TermNode::Const(bits & kind.mask())))
    }

    /// Returns the constant value of `id`, if it is a constant.
    #[must_use]
    pub fn const_bits(&self, id: TermId) -> Option<u64> {
        self.terms.get(id.index()).and_then(Term::as_const)
    }

    /// Appends a term recording a malformed operation.
    ///
    /// Invalid terms are never shared, and anything computed from one fails to evaluate or
    /// export.
    pub fn add_invalid(&self, kind: KindTag, reason: impl Into<String>) -> TermId {
        let reason = reason.into();
        log::warn!("malformed operation: {reason}");
        TermId::new(self.terms.push(Term::new(kind, TermNode::Invalid { reason })))
    }

    /// Returns the term applying `op` to `operand`.
    pub fn add_unary(&self, op: UnaryOp, operand: TermId) -> TermId {
        let kind = self.term(operand).kind();
        if let Some(value) = self.const_bits(operand) {
            return self.add_const(kind, ops::apply_unary(op, kind.width(), value));
        }
        self.intern(Term::new(kind, TermNode::Unary { op, operand }))
    }

    /// Returns the term applying `op` to two operands of one kind.
    ///
    /// Operands of commutative operations are ordered by id before sharing.
    pub fn add_binary(&self, op: BinaryOp, left: TermId, right: TermId) -> TermId {
        let kind = self.term(left).kind();
        let other = self.term(right).kind();
        if kind != other {
            return self.add_invalid(kind, format!("{left} {op} {right} mixes {kind} and {other}"));
        }

        if let (Some(l), Some(r)) = (self.const_bits(left), self.const_bits(right)) {
            return self.add_const(kind, ops::apply_binary(op, kind.width(), l, r));
        }

        let (left, right) = if op.is_commutative() && right < left {
            (right, left)
        } else {
            (left, right)
        };
        self.intern(Term::new(kind, TermNode::Binary { op, left, right }))
    }

    /// Returns the boolean term comparing two operands of one kind.
    pub fn add_compare(&self, op: CompareOp, left: TermId, right: TermId) -> TermId {
        let kind = self.term(left).kind();
        let other = self.term(right).kind();
        if kind != other {
            return self.add_invalid(
                KindTag::Bool,
                format!("{left} {op} {right} compares {kind} with {other}"),
            );
        }

        if let (Some(l), Some(r)) = (self.const_bits(left), self.const_bits(right)) {
            let result = ops::apply_compare(op, kind.width(), l, r);
            return self.add_const(KindTag::Bool, u64::from(result));
        }
        self.intern(Term::new(KindTag::Bool, TermNode::Compare { op, left, right }))
    }

    /// Returns the term selecting `then` or `otherwise` on a boolean condition.
    pub fn add_ite(&self, cond: TermId, then: TermId, otherwise: TermId) -> TermId {
        let kind = self.term(then).kind();
        let cond_kind = self.term(cond).kind();
        if cond_kind != KindTag::Bool {
            return self.add_invalid(kind, format!("condition {cond} is {cond_kind}, not bool"));
        }
        let other = self.term(otherwise).kind();
        if kind != other {
            return self.add_invalid(
                kind,
                format!("branches {then} and {otherwise} mix {kind} and {other}"),
            );
        }

        if let Some(c) = self.const_bits(cond) {
            return if c & 1 == 1 { then } else { otherwise };
        }
        self.intern(Term::new(
            kind,
            TermNode::Ite {
                cond,
                then,
                otherwise,
            },
        ))
    }

    /// Returns the term converting `operand` to `kind`.
    ///
    /// Casting to the operand's own kind returns the operand.
    pub fn add_cast(&self, op: CastOp, kind: KindTag, operand: TermId) -> TermId {
        let from = self.term(operand).kind();
        if from == kind {
            return operand;
        }
        if let Some(value) = self.const_bits(operand) {
            return self.add_const(kind, ops::apply_cast(op, from.width(), kind.width(), value));
        }
        self.intern(Term::new(kind, TermNode::Cast { op, operand }))
    }

    fn intern(&self, term: Term) -> TermId {
        *self
            .shared
            .entry(term.clone())
            .or_insert_with(|| TermId::new(self.terms.push(term)))
    }

    /// Returns every term reachable from `roots`, sorted by id.
    ///
    /// Sorted order is a topological order: operands precede their users.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTerm`] if a root does not belong to this graph.
    pub fn cone(&self, roots: &[TermId]) -> Result<Vec<TermId>> {
        let mut seen = HashSet::new();
        let mut stack = roots.to_vec();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            stack.extend(self.get(id)?.operands());
        }

        let mut cone: Vec<TermId> = seen.into_iter().collect();
        cone.sort_unstable();
        Ok(cone)
    }

    /// Checks that no term reachable from `roots` records a malformed operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the first invalid term, or
    /// [`Error::UnknownTerm`] if a root does not belong to this graph.
    pub fn ensure_well_formed(&self, roots: &[TermId]) -> Result<()> {
        for id in self.cone(roots)? {
            if let TermNode::Invalid { reason } = self.term(id).node() {
                return Err(invalid_argument!("{} is malformed: {}", id, reason));
            }
        }
        Ok(())
    }

    /// Returns the inputs reachable from `roots`, in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTerm`] if a root does not belong to this graph.
    pub fn input_closure(&self, roots: &[TermId]) -> Result<Vec<TermId>> {
        Ok(self
            .cone(roots)?
            .into_iter()
            .filter(|id| self.is_input(*id))
            .collect())
    }

    /// Renders the expression of `id`: inputs by name, constants as numbers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTerm`] if `id` does not belong to this graph.
    pub fn render(&self, id: TermId) -> Result<String> {
        self.get(id)?;
        let mut out = String::new();
        self.render_into(&mut out, id, RENDER_DEPTH);
        Ok(out)
    }

    fn render_into(&self, out: &mut String, id: TermId, depth: usize) {
        let term = self.term(id);
        if depth == 0 && !term.operands().is_empty() {
            let _ = write!(out, "{id}");
            return;
        }

        match term.node() {
            TermNode::Input { name, .. } => out.push_str(name),
            TermNode::Const(bits) => {
                let _ = write!(out, "{}", ConcreteValue::from_bits(term.kind(), *bits));
            }
            TermNode::Unary { op, operand } => {
                let _ = write!(out, "{op}");
                self.render_into(out, *operand, depth - 1);
            }
            TermNode::Binary { op, left, right } => {
                out.push('(');
                self.render_into(out, *left, depth - 1);
                let _ = write!(out, " {op} ");
                self.render_into(out, *right, depth - 1);
                out.push(')');
            }
            TermNode::Compare { op, left, right } => {
                out.push('(');
                self.render_into(out, *left, depth - 1);
                let _ = write!(out, " {op} ");
                self.render_into(out, *right, depth - 1);
                out.push(')');
            }
            TermNode::Ite {
                cond,
                then,
                otherwise,
            } => {
                out.push('(');
                self.render_into(out, *cond, depth - 1);
                out.push_str(" ? ");
                self.render_into(out, *then, depth - 1);
                out.push_str(" : ");
                self.render_into(out, *otherwise, depth - 1);
                out.push(')');
            }
            TermNode::Cast { op, operand } => {
                let _ = write!(out, "{op}.{}(", term.kind());
                self.render_into(out, *operand, depth - 1);
                out.push(')');
            }
            TermNode::Invalid { .. } => out.push_str("<invalid>"),
        }
    }

    /// Describes a single term for memory dumps, referring to operands by id.
    pub(crate) fn describe(&self, id: TermId) -> String {
        let term = self.term(id);
        let body = match term.node() {
            TermNode::Input { name, default } => format!("input {name} (default {default})"),
            TermNode::Const(bits) => {
                format!("const {}", ConcreteValue::from_bits(term.kind(), *bits))
            }
            TermNode::Unary { op, operand } => format!("{op}{operand}"),
            TermNode::Binary { op, left, right } => format!("{left} {op} {right}"),
            TermNode::Compare { op, left, right } => format!("{left} {op} {right}"),
            TermNode::Ite {
                cond,
                then,
                otherwise,
            } => format!("{cond} ? {then} : {otherwise}"),
            TermNode::Cast { op, operand } => format!("{op} {operand}"),
            TermNode::Invalid { reason } => format!("invalid ({reason})"),
        };
        format!("{id}: {} = {body}", term.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> TermGraph {
        TermGraph::new("x")
    }

    #[test]
    fn test_inputs_are_never_shared() {
        let g = graph();
        let a = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        let b = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        assert_ne!(a, b);
        assert_eq!(g.inputs(), vec![a, b]);
        assert_eq!(g.term(a).input_name(), Some("x0"));
        assert_eq!(g.term(b).input_name(), Some("x1"));
    }

    #[test]
    fn test_derived_terms_are_shared() {
        let g = graph();
        let a = g.add_input(KindTag::I8, None, ConcreteValue::I8(0));
        let b = g.add_input(KindTag::I8, Some("b"), ConcreteValue::I8(0));

        let sum = g.add_binary(BinaryOp::Add, a, b);
        assert_eq!(g.add_binary(BinaryOp::Add, b, a), sum);
        assert_ne!(g.add_binary(BinaryOp::Sub, b, a), g.add_binary(BinaryOp::Sub, a, b));
        assert_eq!(g.add_const(KindTag::I8, 3), g.add_const(KindTag::I8, 0x103));
    }

    #[test]
    fn test_constant_folding() {
        let g = graph();
        let three = g.add_const(KindTag::I32, 3);
        let four = g.add_const(KindTag::I32, 4);

        let product = g.add_binary(BinaryOp::Mul, three, four);
        assert_eq!(g.const_bits(product), Some(12));

        let less = g.add_compare(CompareOp::SLt, four, three);
        assert_eq!(g.const_bits(less), Some(0));

        let wide = g.add_cast(CastOp::SignExtend, KindTag::I64, g.add_unary(UnaryOp::Neg, three));
        assert_eq!(g.const_bits(wide), Some((-3i64) as u64));

        let x = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        let y = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        let truth = g.add_const(KindTag::Bool, 1);
        assert_eq!(g.add_ite(truth, x, y), x);
    }

    #[test]
    fn test_operands_precede_users() {
        let g = graph();
        let x = g.add_input(KindTag::I64, None, ConcreteValue::I64(0));
        let one = g.add_const(KindTag::I64, 1);
        let sum = g.add_binary(BinaryOp::Add, x, one);
        let cmp = g.add_compare(CompareOp::Eq, sum, x);

        for id in g.cone(&[cmp]).unwrap() {
            for operand in g.term(id).operands() {
                assert!(operand < id);
            }
        }
    }

    #[test]
    fn test_input_closure() {
        let g = graph();
        let x = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        let y = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        let z = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        let sum = g.add_binary(BinaryOp::Add, z, x);

        assert_eq!(g.input_closure(&[sum]).unwrap(), vec![x, z]);
        assert_eq!(g.input_closure(&[y]).unwrap(), vec![y]);
        assert!(matches!(
            g.input_closure(&[TermId::new(99)]),
            Err(Error::UnknownTerm(_))
        ));
    }

    #[test]
    fn test_mixed_kinds_are_recorded_as_invalid() {
        let g = graph();
        let narrow = g.add_input(KindTag::I8, None, ConcreteValue::I8(0));
        let wide = g.add_input(KindTag::I64, None, ConcreteValue::I64(0));
        let flag = g.add_input(KindTag::Bool, None, ConcreteValue::Bool(false));

        let sum = g.add_binary(BinaryOp::Add, narrow, wide);
        assert!(g.term(sum).is_invalid());
        assert_eq!(g.term(sum).kind(), KindTag::I8);

        let cmp = g.add_compare(CompareOp::Eq, wide, narrow);
        assert!(g.term(cmp).is_invalid());
        assert_eq!(g.term(cmp).kind(), KindTag::Bool);

        assert!(g.term(g.add_ite(flag, narrow, wide)).is_invalid());
        assert!(g.term(g.add_ite(narrow, narrow, narrow)).is_invalid());
        assert_ne!(g.add_binary(BinaryOp::Add, narrow, wide), sum);

        let derived = g.add_unary(UnaryOp::Not, sum);
        assert!(matches!(
            g.ensure_well_formed(&[derived]),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(g.ensure_well_formed(&[narrow, wide]).is_ok());
        assert_eq!(g.render(derived).unwrap(), "~<invalid>");
        assert!(g.describe(sum).contains("invalid ("));
    }

    #[test]
    fn test_render() {
        let g = graph();
        let x = g.add_input(KindTag::I32, None, ConcreteValue::I32(0));
        let five = g.add_const(KindTag::I32, 5);
        let sum = g.add_binary(BinaryOp::Add, x, five);
        let wide = g.add_cast(CastOp::ZeroExtend, KindTag::I64, sum);

        assert_eq!(g.render(wide).unwrap(), "zext.i64((x0 + 5))");
        assert!(g.describe(x).contains("input x0"));
    }

    #[test]
    fn test_render_depth_limit() {
        let g = graph();
        let mut value = g.add_input(KindTag::I8, None, ConcreteValue::I8(0));
        for _ in 0..(RENDER_DEPTH + 4) {
            value = g.add_unary(UnaryOp::Not, value);
        }
        let rendered = g.render(value).unwrap();
        assert!(rendered.starts_with(&"~".repeat(RENDER_DEPTH)));
        assert!(rendered.ends_with(&format!("t{}", g.len() - RENDER_DEPTH - 1)));
        assert!(!rendered.contains("x0"));
    }
}
