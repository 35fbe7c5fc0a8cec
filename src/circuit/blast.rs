//! Bit-blasting of terms into an AIG.
//!
//! [`BitBlaster`] translates terms of a [`TermGraph`] into vectors of AIG literals, least
//! significant bit first, following the semantics of [`crate::ops`]:
//!
//! - addition is a ripple-carry adder, subtraction adds the complement plus one;
//! - multiplication is shift-and-add, truncated to the operand width;
//! - division and remainder share a restoring divider, which yields an all-ones quotient
//!   and the dividend as remainder for a zero divisor without a special case;
//! - shifts are barrel shifters over the low `log2(width)` amount bits;
//! - unsigned less-than is the inverted carry of `a - b`, signed comparisons flip the sign
//!   bits first.

use std::collections::HashMap;

use crate::{
    circuit::aig::{Aig, AigLit},
    ops::{BinaryOp, CastOp, CompareOp, UnaryOp},
    symbolic::{
        graph::TermGraph,
        term::{TermId, TermNode},
    },
    Error, Result,
};

type Bits = Vec<AigLit>;

/// Translates terms into AIG literal vectors.
pub struct BitBlaster<'g> {
    graph: &'g TermGraph,
    aig: Aig,
    cache: HashMap<TermId, Bits>,
}

impl<'g> BitBlaster<'g> {
    /// Creates a blaster whose AIG inputs are the bits of `inputs`, in order.
    ///
    /// Each input term contributes `width` consecutive AIG inputs, least significant bit
    /// first, named after the term (`name[bit]` for multi-bit kinds).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTerm`] if an input does not belong to `graph`.
    pub fn new(graph: &'g TermGraph, inputs: &[TermId]) -> Result<Self> {
        let mut widths = Vec::with_capacity(inputs.len());
        for &input in inputs {
            widths.push(graph.get(input)?.kind().width() as usize);
        }

        let mut aig = Aig::new(widths.iter().sum());
        let mut cache = HashMap::with_capacity(inputs.len());
        let mut next = 0;
        for (&input, &width) in inputs.iter().zip(&widths) {
            let name = graph.term(input).input_name().unwrap_or_default().to_string();
            let mut bits = Vec::with_capacity(width);
            for bit in 0..width {
                if width == 1 {
                    aig.set_input_name(next, name.clone());
                } else {
                    aig.set_input_name(next, format!("{name}[{bit}]"));
                }
                bits.push(aig.input(next));
                next += 1;
            }
            cache.insert(input, bits);
        }

        Ok(Self { graph, aig, cache })
    }

    /// Returns the AIG built so far.
    #[must_use]
    pub fn aig(&self) -> &Aig {
        &self.aig
    }

    /// Consumes the blaster, returning its AIG.
    #[must_use]
    pub fn into_aig(self) -> Aig {
        self.aig
    }

    /// Appends the bits of `id` as outputs named `name` (`name[bit]` for multi-bit kinds).
    ///
    /// # Errors
    ///
    /// Same as [`BitBlaster::blast`].
    pub fn add_output(&mut self, id: TermId, name: Option<&str>) -> Result<()> {
        let bits = self.blast(id)?;
        let width = bits.len();
        for (bit, lit) in bits.into_iter().enumerate() {
            let name = name.map(|name| {
                if width == 1 {
                    name.to_string()
                } else {
                    format!("{name}[{bit}]")
                }
            });
            self.aig.add_output(lit, name);
        }
        Ok(())
    }

    /// Returns the literals of `id`, least significant bit first.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownTerm`] if `id` does not belong to the graph.
    /// - [`Error::DependencyNotCovered`] if `id` reads an input that is not a circuit input.
    /// - [`Error::InvalidArgument`] if `id` depends on a malformed operation.
    pub fn blast(&mut self, id: TermId) -> Result<Bits> {
        if let Some(bits) = self.cache.get(&id) {
            return Ok(bits.clone());
        }

        for term_id in self.graph.cone(&[id])? {
            if self.cache.contains_key(&term_id) {
                continue;
            }
            let bits = self.blast_term(term_id)?;
            self.cache.insert(term_id, bits);
        }

        self.cache.get(&id).cloned().ok_or(Error::UnknownTerm(id))
    }

    fn operand(&self, id: TermId) -> &Bits {
        &self.cache[&id]
    }

    fn blast_term(&mut self, id: TermId) -> Result<Bits> {
        let graph = self.graph;
        let term = graph.term(id);
        let width = term.kind().width() as usize;

        let bits = match *term.node() {
            TermNode::Input { .. } => {
                return Err(Error::DependencyNotCovered {
                    uncovered: vec![id],
                })
            }
            TermNode::Const(value) => (0..width)
                .map(|bit| AigLit::constant((value >> bit) & 1 == 1))
                .collect(),
            TermNode::Unary { op, operand } => {
                let a = self.operand(operand).clone();
                match op {
                    UnaryOp::Not => a.iter().map(|&lit| !lit).collect(),
                    UnaryOp::Neg => {
                        let inverted: Bits = a.iter().map(|&lit| !lit).collect();
                        let zero = vec![AigLit::FALSE; width];
                        self.adder(&inverted, &zero, AigLit::TRUE).0
                    }
                }
            }
            TermNode::Binary { op, left, right } => {
                let a = self.operand(left).clone();
                let b = self.operand(right).clone();
                self.binary(op, &a, &b)
            }
            TermNode::Compare { op, left, right } => {
                let a = self.operand(left).clone();
                let b = self.operand(right).clone();
                vec![self.compare(op, &a, &b)]
            }
            TermNode::Ite {
                cond,
                then,
                otherwise,
            } => {
                let sel = self.operand(cond)[0];
                let t = self.operand(then).clone();
                let e = self.operand(otherwise).clone();
                t.iter()
                    .zip(&e)
                    .map(|(&t, &e)| self.aig.mux(sel, t, e))
                    .collect()
            }
            TermNode::Cast { op, operand } => {
                let a = self.operand(operand);
                let fill = match op {
                    CastOp::ZeroExtend => AigLit::FALSE,
                    CastOp::SignExtend => a[a.len() - 1],
                };
                (0..width)
                    .map(|bit| a.get(bit).copied().unwrap_or(fill))
                    .collect()
            }
            TermNode::Invalid { ref reason } => {
                return Err(invalid_argument!("{} is malformed: {}", id, reason));
            }
        };

        Ok(bits)
    }

    fn binary(&mut self, op: BinaryOp, a: &Bits, b: &Bits) -> Bits {
        match op {
            BinaryOp::Add => self.adder(a, b, AigLit::FALSE).0,
            BinaryOp::Sub => self.subtract(a, b).0,
            BinaryOp::Mul => self.multiply(a, b),
            BinaryOp::UDiv => self.divide(a, b).0,
            BinaryOp::URem => self.divide(a, b).1,
            BinaryOp::And => self.bitwise(a, b, Aig::and),
            BinaryOp::Or => self.bitwise(a, b, Aig::or),
            BinaryOp::Xor => self.bitwise(a, b, Aig::xor),
            BinaryOp::Shl => self.shift(a, b, ShiftKind::Left),
            BinaryOp::LShr => self.shift(a, b, ShiftKind::Logical),
            BinaryOp::AShr => self.shift(a, b, ShiftKind::Arithmetic),
        }
    }

    fn compare(&mut self, op: CompareOp, a: &Bits, b: &Bits) -> AigLit {
        match op {
            CompareOp::Eq => self.equal(a, b),
            CompareOp::Ne => !self.equal(a, b),
            CompareOp::ULt => self.less_than(a, b),
            CompareOp::ULe => !self.less_than(b, a),
            CompareOp::SLt => {
                let (a, b) = (flip_sign(a), flip_sign(b));
                self.less_than(&a, &b)
            }
            CompareOp::SLe => {
                let (a, b) = (flip_sign(a), flip_sign(b));
                !self.less_than(&b, &a)
            }
        }
    }

    fn bitwise(&mut self, a: &Bits, b: &Bits, gate: fn(&mut Aig, AigLit, AigLit) -> AigLit) -> Bits {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| gate(&mut self.aig, x, y))
            .collect()
    }

    /// Ripple-carry addition, returning the sum and the carry out.
    fn adder(&mut self, a: &Bits, b: &Bits, carry_in: AigLit) -> (Bits, AigLit) {
        let mut carry = carry_in;
        let mut sum = Vec::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            let half = self.aig.xor(x, y);
            sum.push(self.aig.xor(half, carry));
            let generate = self.aig.and(x, y);
            let propagate = self.aig.and(half, carry);
            carry = self.aig.or(generate, propagate);
        }
        (sum, carry)
    }

    /// `a - b` as `a + !b + 1`; the carry out is set iff `a >= b` unsigned.
    fn subtract(&mut self, a: &Bits, b: &Bits) -> (Bits, AigLit) {
        let inverted: Bits = b.iter().map(|&lit| !lit).collect();
        self.adder(a, &inverted, AigLit::TRUE)
    }

    fn less_than(&mut self, a: &Bits, b: &Bits) -> AigLit {
        !self.subtract(a, b).1
    }

    fn equal(&mut self, a: &Bits, b: &Bits) -> AigLit {
        let mut result = AigLit::TRUE;
        for (&x, &y) in a.iter().zip(b) {
            let same = self.aig.xnor(x, y);
            result = self.aig.and(result, same);
        }
        result
    }

    fn multiply(&mut self, a: &Bits, b: &Bits) -> Bits {
        let width = a.len();
        let mut product = vec![AigLit::FALSE; width];
        for (shift, &multiplier) in b.iter().enumerate() {
            let partial: Bits = (0..width)
                .map(|bit| {
                    if bit < shift {
                        AigLit::FALSE
                    } else {
                        self.aig.and(a[bit - shift], multiplier)
                    }
                })
                .collect();
            product = self.adder(&product, &partial, AigLit::FALSE).0;
        }
        product
    }

    /// Restoring division, returning quotient and remainder.
    fn divide(&mut self, a: &Bits, b: &Bits) -> (Bits, Bits) {
        let width = a.len();
        let mut divisor = b.clone();
        divisor.push(AigLit::FALSE);

        // width + 1 bits: the shifted remainder is below twice the divisor
        let mut remainder = vec![AigLit::FALSE; width + 1];
        let mut quotient = vec![AigLit::FALSE; width];

        for bit in (0..width).rev() {
            remainder.pop();
            remainder.insert(0, a[bit]);

            let (difference, fits) = self.subtract(&remainder, &divisor);
            quotient[bit] = fits;
            remainder = remainder
                .iter()
                .zip(&difference)
                .map(|(&keep, &take)| self.aig.mux(fits, take, keep))
                .collect();
        }

        remainder.truncate(width);
        (quotient, remainder)
    }

    fn shift(&mut self, a: &Bits, amount: &Bits, kind: ShiftKind) -> Bits {
        let width = a.len();
        let fill = match kind {
            ShiftKind::Left | ShiftKind::Logical => AigLit::FALSE,
            ShiftKind::Arithmetic => a[width - 1],
        };

        let mut current = a.clone();
        let stages = width.trailing_zeros() as usize;
        for (stage, &sel) in amount.iter().take(stages).enumerate() {
            let distance = 1usize << stage;
            current = (0..width)
                .map(|bit| {
                    let shifted = match kind {
                        ShiftKind::Left => {
                            if bit >= distance {
                                current[bit - distance]
                            } else {
                                fill
                            }
                        }
                        ShiftKind::Logical | ShiftKind::Arithmetic => {
                            current.get(bit + distance).copied().unwrap_or(fill)
                        }
                    };
                    self.aig.mux(sel, shifted, current[bit])
                })
                .collect();
        }
        current
    }
}

#[derive(Clone, Copy)]
enum ShiftKind {
    Left,
    Logical,
    Arithmetic,
}

/// Inverts the sign bit, mapping signed order onto unsigned order.
fn flip_sign(bits: &Bits) -> Bits {
    let mut flipped = bits.clone();
    if let Some(msb) = flipped.last_mut() {
        *msb = !*msb;
    }
    flipped
}
