//! Operation types and their bit-level semantics.
//!
//! This module defines the operations a host program can apply to values, and the single
//! reference implementation of their semantics on masked `u64` bit patterns. The same
//! functions back the detached backend, constant folding in the term graph, and term
//! evaluation, so all three agree by construction. The bit-blaster in
//! [`crate::circuit`] mirrors them gate by gate.
//!
//! Operations are categorized as:
//! - **Unary**: Not, Neg
//! - **Binary**: Add, Sub, Mul, UDiv, URem, And, Or, Xor, Shl, LShr, AShr
//! - **Comparison**: Eq, Ne, ULt, ULe, SLt, SLe (result is a boolean)
//! - **Cast**: zero or sign extension, truncation when the target is narrower
//!
//! # Semantics
//!
//! - Arithmetic wraps modulo `2^width`.
//! - Shift amounts are masked to `width - 1`; booleans never shift.
//! - Division by zero yields all ones, remainder by zero yields the dividend.
//! - Signed comparisons use the two's-complement reading of the operand width.

use std::fmt;

use strum::{EnumCount, EnumIter};

/// A unary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum UnaryOp {
    /// Bitwise NOT.
    Not,
    /// Two's-complement negation.
    Neg,
}

/// A binary operation whose result has the kind of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum BinaryOp {
    // Arithmetic operations
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Unsigned division.
    UDiv,
    /// Unsigned remainder.
    URem,

    // Bitwise operations
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Shift left.
    Shl,
    /// Logical shift right (zero-fill).
    LShr,
    /// Arithmetic shift right (preserves sign).
    AShr,
}

impl BinaryOp {
    /// Checks if this operation is commutative.
    ///
    /// Commutative operands are put in a canonical order before a derived term is shared,
    /// so `a + b` and `b + a` become the same term.
    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Mul | BinaryOp::And | BinaryOp::Or | BinaryOp::Xor
        )
    }
}

/// A comparison producing a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Unsigned less than.
    ULt,
    /// Unsigned less than or equal.
    ULe,
    /// Signed less than.
    SLt,
    /// Signed less than or equal.
    SLe,
}

/// How a value is widened when cast to a wider kind.
///
/// Casts to a narrower kind always truncate, casts to the same kind are identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum CastOp {
    /// Fill the new high bits with zero.
    ZeroExtend,
    /// Fill the new high bits with the sign bit.
    SignExtend,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Not => "~",
            UnaryOp::Neg => "-",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::UDiv => "/u",
            BinaryOp::URem => "%u",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::LShr => ">>>",
            BinaryOp::AShr => ">>",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::ULt => "<u",
            CompareOp::ULe => "<=u",
            CompareOp::SLt => "<s",
            CompareOp::SLe => "<=s",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CastOp::ZeroExtend => "zext",
            CastOp::SignExtend => "sext",
        };
        write!(f, "{s}")
    }
}

/// Returns the mask selecting the low `width` bits of a `u64`.
#[must_use]
pub const fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Interprets the low `width` bits of `bits` as a two's-complement number.
#[must_use]
pub const fn sign_extend(bits: u64, width: u32) -> i64 {
    if width == 0 {
        return 0;
    }
    let shift = 64 - width;
    ((bits << shift) as i64) >> shift
}

/// Returns the effective shift distance for a value of `width` bits.
///
/// Only the low `log2(width)` bits of the amount are used, so a 32-bit shift by 33 shifts by
/// one and a boolean never shifts.
#[must_use]
pub const fn shift_amount(width: u32, amount: u64) -> u32 {
    (amount & (width as u64 - 1)) as u32
}

/// Evaluates a unary operation on a bit pattern of `width` bits.
#[must_use]
pub fn apply_unary(op: UnaryOp, width: u32, value: u64) -> u64 {
    let m = mask(width);
    match op {
        UnaryOp::Not => !value & m,
        UnaryOp::Neg => 0u64.wrapping_sub(value) & m,
    }
}

/// Evaluates a binary operation on bit patterns of `width` bits.
///
/// # Arguments
///
/// * `op` - The operation to perform.
/// * `width` - Operand and result width in bits.
/// * `left` - The left operand, masked to `width`.
/// * `right` - The right operand, masked to `width`.
///
/// # Returns
///
/// The result, masked to `width`.
#[must_use]
pub fn apply_binary(op: BinaryOp, width: u32, left: u64, right: u64) -> u64 {
    let m = mask(width);
    let (left, right) = (left & m, right & m);
    let result = match op {
        BinaryOp::Add => left.wrapping_add(right),
        BinaryOp::Sub => left.wrapping_sub(right),
        BinaryOp::Mul => left.wrapping_mul(right),
        BinaryOp::UDiv => {
            if right == 0 {
                m
            } else {
                left / right
            }
        }
        BinaryOp::URem => {
            if right == 0 {
                left
            } else {
                left % right
            }
        }
        BinaryOp::And => left & right,
        BinaryOp::Or => left | right,
        BinaryOp::Xor => left ^ right,
        BinaryOp::Shl => left << shift_amount(width, right),
        BinaryOp::LShr => left >> shift_amount(width, right),
        BinaryOp::AShr => (sign_extend(left, width) >> shift_amount(width, right)) as u64,
    };
    result & m
}

/// Evaluates a comparison on bit patterns of `width` bits.
#[must_use]
pub fn apply_compare(op: CompareOp, width: u32, left: u64, right: u64) -> bool {
    let m = mask(width);
    let (left, right) = (left & m, right & m);
    match op {
        CompareOp::Eq => left == right,
        CompareOp::Ne => left != right,
        CompareOp::ULt => left < right,
        CompareOp::ULe => left <= right,
        CompareOp::SLt => sign_extend(left, width) < sign_extend(right, width),
        CompareOp::SLe => sign_extend(left, width) <= sign_extend(right, width),
    }
}

/// Converts a bit pattern of `from` bits into one of `to` bits.
#[must_use]
pub fn apply_cast(op: CastOp, from: u32, to: u32, value: u64) -> u64 {
    let value = value & mask(from);
    if to <= from {
        return value & mask(to);
    }
    match op {
        CastOp::ZeroExtend => value,
        CastOp::SignExtend => sign_extend(value, from) as u64 & mask(to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_wraps() {
        assert_eq!(apply_binary(BinaryOp::Add, 8, 0xFF, 1), 0);
        assert_eq!(apply_binary(BinaryOp::Sub, 32, 0, 1), 0xFFFF_FFFF);
        assert_eq!(apply_binary(BinaryOp::Mul, 8, 16, 16), 0);
        assert_eq!(apply_unary(UnaryOp::Neg, 32, 1), 0xFFFF_FFFF);
        assert_eq!(apply_unary(UnaryOp::Not, 1, 0), 1);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(apply_binary(BinaryOp::UDiv, 8, 42, 0), 0xFF);
        assert_eq!(apply_binary(BinaryOp::URem, 8, 42, 0), 42);
        assert_eq!(apply_binary(BinaryOp::UDiv, 64, 7, 2), 3);
        assert_eq!(apply_binary(BinaryOp::URem, 64, 7, 2), 1);
    }

    #[test]
    fn test_shift_amount_is_masked() {
        assert_eq!(apply_binary(BinaryOp::Shl, 32, 1, 33), 2);
        assert_eq!(apply_binary(BinaryOp::LShr, 8, 0x80, 7), 1);
        assert_eq!(apply_binary(BinaryOp::AShr, 8, 0x80, 7), 0xFF);
        assert_eq!(apply_binary(BinaryOp::AShr, 64, 1 << 63, 63), u64::MAX);
        assert_eq!(apply_binary(BinaryOp::Shl, 1, 1, 1), 1);
    }

    #[test]
    fn test_signed_comparisons() {
        // 0xFF is -1 as an i8
        assert!(apply_compare(CompareOp::SLt, 8, 0xFF, 0));
        assert!(!apply_compare(CompareOp::ULt, 8, 0xFF, 0));
        assert!(apply_compare(CompareOp::SLe, 32, 5, 5));
        assert!(apply_compare(CompareOp::Ne, 1, 0, 1));
    }

    #[test]
    fn test_casts() {
        assert_eq!(apply_cast(CastOp::SignExtend, 8, 32, 0x80), 0xFFFF_FF80);
        assert_eq!(apply_cast(CastOp::ZeroExtend, 8, 32, 0x80), 0x80);
        assert_eq!(apply_cast(CastOp::SignExtend, 64, 8, 0x1234), 0x34);
        assert_eq!(apply_cast(CastOp::SignExtend, 1, 64, 1), u64::MAX);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0xFF, 8), -1);
        assert_eq!(sign_extend(0x7F, 8), 127);
        assert_eq!(sign_extend(1, 1), -1);
        assert_eq!(sign_extend(u64::MAX, 64), -1);
    }
}
