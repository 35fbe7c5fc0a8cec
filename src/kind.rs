//! Primitive value kinds and concrete literals.
//!
//! Every value handled by this crate has one of four fixed kinds: a boolean or an 8, 32 or
//! 64 bit two's-complement integer. Kinds exist twice:
//!
//! - as zero-sized type markers ([`Bool`], [`I8`], [`I32`], [`I64`]) implementing [`Kind`],
//!   which tie a handle to its native Rust type at compile time, and
//! - as the runtime tag [`KindTag`], which carries the bit width of terms stored in the
//!   symbolic graph.
//!
//! [`ConcreteValue`] is the kind-tagged literal used for assignments, constant terms and the
//! detached backend's input representation. Internally every value travels as a `u64` bit
//! pattern masked to its width (see [`crate::ops`]).

use std::fmt;

use strum::{EnumCount, EnumIter};

use crate::{backend::Handle, concrete::Concrete};

mod sealed {
    pub trait Sealed {}
}

/// Runtime tag of a value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum KindTag {
    /// A single bit.
    Bool,
    /// 8-bit integer.
    I8,
    /// 32-bit integer.
    I32,
    /// 64-bit integer.
    I64,
}

impl KindTag {
    /// Returns the number of bits of this kind.
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            KindTag::Bool => 1,
            KindTag::I8 => 8,
            KindTag::I32 => 32,
            KindTag::I64 => 64,
        }
    }

    /// Returns the mask selecting the valid bits of this kind inside a `u64`.
    #[must_use]
    pub const fn mask(self) -> u64 {
        crate::ops::mask(self.width())
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KindTag::Bool => "bool",
            KindTag::I8 => "i8",
            KindTag::I32 => "i32",
            KindTag::I64 => "i64",
        };
        f.write_str(name)
    }
}

/// A primitive value kind, known at compile time.
///
/// Implemented only by the markers in this module. `Native` is the Rust type a value of the
/// kind has in detached mode; it doubles as that backend's handle type.
pub trait Kind:
    sealed::Sealed + Copy + Eq + std::hash::Hash + fmt::Debug + Send + Sync + 'static
{
    /// The native Rust representation of this kind.
    type Native: Copy
        + PartialEq
        + fmt::Debug
        + fmt::Display
        + Send
        + Sync
        + Into<ConcreteValue>
        + Handle<Concrete, Kind = Self>
        + 'static;

    /// The runtime tag of this kind.
    const TAG: KindTag;

    /// Converts a native value into its bit pattern, masked to the kind width.
    fn to_bits(value: Self::Native) -> u64;

    /// Converts a bit pattern into a native value, ignoring bits above the kind width.
    fn from_bits(bits: u64) -> Self::Native;
}

/// Marker for boolean values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bool;

/// Marker for 8-bit integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct I8;

/// Marker for 32-bit integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct I32;

/// Marker for 64-bit integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct I64;

impl sealed::Sealed for Bool {}
impl sealed::Sealed for I8 {}
impl sealed::Sealed for I32 {}
impl sealed::Sealed for I64 {}

impl Kind for Bool {
    type Native = bool;
    const TAG: KindTag = KindTag::Bool;

    fn to_bits(value: bool) -> u64 {
        u64::from(value)
    }

    fn from_bits(bits: u64) -> bool {
        bits & 1 == 1
    }
}

impl Kind for I8 {
    type Native = i8;
    const TAG: KindTag = KindTag::I8;

    fn to_bits(value: i8) -> u64 {
        u64::from(value as u8)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> i8 {
        bits as u8 as i8
    }
}

impl Kind for I32 {
    type Native = i32;
    const TAG: KindTag = KindTag::I32;

    fn to_bits(value: i32) -> u64 {
        u64::from(value as u32)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> i32 {
        bits as u32 as i32
    }
}

impl Kind for I64 {
    type Native = i64;
    const TAG: KindTag = KindTag::I64;

    fn to_bits(value: i64) -> u64 {
        value as u64
    }

    fn from_bits(bits: u64) -> i64 {
        bits as i64
    }
}

/// A concrete literal of one kind.
///
/// Used for assignment values, as the display hint attached to fresh inputs, and as the
/// detached backend's erased handle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcreteValue {
    /// A boolean literal.
    Bool(bool),
    /// An 8-bit integer literal.
    I8(i8),
    /// A 32-bit integer literal.
    I32(i32),
    /// A 64-bit integer literal.
    I64(i64),
}

impl ConcreteValue {
    /// Returns the kind of this literal.
    #[must_use]
    pub const fn kind(&self) -> KindTag {
        match self {
            ConcreteValue::Bool(_) => KindTag::Bool,
            ConcreteValue::I8(_) => KindTag::I8,
            ConcreteValue::I32(_) => KindTag::I32,
            ConcreteValue::I64(_) => KindTag::I64,
        }
    }

    /// Returns the bit pattern of this literal, masked to its width.
    #[must_use]
    pub fn to_bits(&self) -> u64 {
        match *self {
            ConcreteValue::Bool(v) => Bool::to_bits(v),
            ConcreteValue::I8(v) => I8::to_bits(v),
            ConcreteValue::I32(v) => I32::to_bits(v),
            ConcreteValue::I64(v) => I64::to_bits(v),
        }
    }

    /// Builds a literal of the given kind from a bit pattern.
    ///
    /// # Arguments
    ///
    /// * `kind` - The kind of the resulting literal.
    /// * `bits` - The bit pattern; bits above the kind width are ignored.
    #[must_use]
    pub fn from_bits(kind: KindTag, bits: u64) -> Self {
        match kind {
            KindTag::Bool => ConcreteValue::Bool(Bool::from_bits(bits)),
            KindTag::I8 => ConcreteValue::I8(I8::from_bits(bits)),
            KindTag::I32 => ConcreteValue::I32(I32::from_bits(bits)),
            KindTag::I64 => ConcreteValue::I64(I64::from_bits(bits)),
        }
    }
}

impl fmt::Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcreteValue::Bool(v) => write!(f, "{v}"),
            ConcreteValue::I8(v) => write!(f, "{v}i8"),
            ConcreteValue::I32(v) => write!(f, "{v}"),
            ConcreteValue::I64(v) => write!(f, "{v}L"),
        }
    }
}

impl From<bool> for ConcreteValue {
    fn from(value: bool) -> Self {
        ConcreteValue::Bool(value)
    }
}

impl From<i8> for ConcreteValue {
    fn from(value: i8) -> Self {
        ConcreteValue::I8(value)
    }
}

impl From<i32> for ConcreteValue {
    fn from(value: i32) -> Self {
        ConcreteValue::I32(value)
    }
}

impl From<i64> for ConcreteValue {
    fn from(value: i64) -> Self {
        ConcreteValue::I64(value)
    }
}
