//! The dual-mode instrumentation contract.
//!
//! [`Backend`] is the single abstraction host programs are written against. It has two
//! interchangeable implementations which share no state:
//!
//! - [`crate::Concrete`] - detached execution. Fresh values are the caller's defaults,
//!   operations compute directly on native integers, evaluation is unsupported and exports
//!   are no-ops.
//! - [`crate::SymbolicSession`] - the symbolic backend. Fresh values are new unconstrained
//!   inputs of a term graph, operations append derived terms, and outputs can be evaluated
//!   or exported as AIGER circuits and DIMACS formulas.
//!
//! A host program takes the backend as a generic parameter and manipulates its
//! [`Backend::Value`] handles only through the backend's methods:
//!
//! ```rust
//! use symcircuit::prelude::*;
//!
//! fn double<B: Backend>(backend: &B) -> (B::Value<I32>, B::Value<I32>) {
//!     let x = backend.fresh_i32(0);
//!     (x, backend.add(x, x))
//! }
//!
//! // Plain execution
//! let (_, y) = double(&Concrete);
//! assert_eq!(y, 0);
//!
//! // Symbolic execution
//! let session = SymbolicSession::new();
//! let (x, y) = double(&session);
//! let assignment = Assignment::new().bind(x, 5i32);
//! assert_eq!(session.evaluate(y, &assignment)?, 10);
//! # Ok::<(), symcircuit::Error>(())
//! ```

use std::{fmt, hash::Hash, path::Path};

use crate::{
    kind::{Bool, Kind, KindTag, I32, I64, I8},
    ops::{BinaryOp, CastOp, CompareOp, UnaryOp},
    Result,
};

mod types;

pub use types::{Assignment, InputOrdering, OutputSpec, SymArray};

/// A value manipulated through backend `B`.
///
/// Handles are cheap `Copy` values. In detached mode they are the native values themselves,
/// in the symbolic backend they are indices into the session's term graph. Every handle has
/// a fixed kind for its whole lifetime.
pub trait Handle<B: Backend>: Copy + fmt::Debug {
    /// The kind of this value.
    type Kind: Kind;

    /// Erases the kind, producing the backend's untyped input representation.
    fn into_input(self) -> B::Input;

    /// Restores a typed handle from an untyped one produced by [`Handle::into_input`].
    ///
    /// The kind is not checked here. A symbolic handle restored with the wrong kind makes
    /// operations on it record malformed terms, and is rejected by
    /// [`Backend::check_kind`], evaluation and export.
    fn from_input(input: B::Input) -> Self;
}

/// Native value type of a handle's kind.
pub type NativeOf<B, V> = <<V as Handle<B>>::Kind as Kind>::Native;

/// Returns the runtime tag of a handle's kind.
pub(crate) fn handle_kind<B: Backend, V: Handle<B>>(_value: &V) -> KindTag {
    <V::Kind as Kind>::TAG
}

/// The operation set shared by detached and symbolic execution.
///
/// Implementors provide the primitive operations; the arithmetic, bitwise and comparison
/// helpers are provided on top of them. All operations follow the semantics documented in
/// [`crate::ops`], in both modes.
pub trait Backend: Sized {
    /// Untyped handle representation used by assignments and export specifications.
    type Input: Copy + Eq + Hash + fmt::Debug;

    /// Typed handle of kind `K`.
    type Value<K: Kind>: Handle<Self, Kind = K>;

    /// Returns `true` if this backend records computations symbolically.
    fn is_symbolic(&self) -> bool;

    /// Provides a new value of kind `K`.
    ///
    /// In detached mode this returns `default` unchanged. A symbolic backend allocates a
    /// new unconstrained input and uses `default` only as a display hint. Two calls never
    /// return aliasing handles.
    ///
    /// # Arguments
    ///
    /// * `default` - The value to use for concrete execution.
    fn fresh<K: Kind>(&self, default: K::Native) -> Self::Value<K>;

    /// Provides a new named value of kind `K`.
    ///
    /// Identical to [`Backend::fresh`], but a symbolic backend shows `name` in traces,
    /// dumps and exported symbol tables.
    fn fresh_named<K: Kind>(&self, name: &str, default: K::Native) -> Self::Value<K>;

    /// Provides a new array of `len` fresh values of kind `K`.
    ///
    /// In detached mode the array is absent (see [`SymArray::absent`]).
    ///
    /// # Arguments
    ///
    /// * `len` - The number of elements.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `len` is negative, in both modes.
    fn fresh_array<K: Kind>(&self, len: i64) -> Result<SymArray<Self::Value<K>>>;

    /// Lifts a literal into a value of kind `K`.
    fn lit<K: Kind>(&self, value: K::Native) -> Self::Value<K>;

    /// Applies a unary operation.
    fn unary<V: Handle<Self>>(&self, op: UnaryOp, value: V) -> V;

    /// Applies a binary operation to two values of the same kind.
    fn binary<V: Handle<Self>>(&self, op: BinaryOp, left: V, right: V) -> V;

    /// Compares two values of the same kind.
    fn compare<V: Handle<Self>>(&self, op: CompareOp, left: V, right: V) -> Self::Value<Bool>;

    /// Selects `then` if `cond` holds, `otherwise` if not.
    fn ite<V: Handle<Self>>(&self, cond: Self::Value<Bool>, then: V, otherwise: V) -> V;

    /// Converts a value to kind `T`, extending with `op` or truncating.
    fn cast<T: Kind>(&self, op: CastOp, value: impl Handle<Self>) -> Self::Value<T>;

    /// Checks that a handle names a value of the kind it declares.
    ///
    /// Detached handles are native values and always pass.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] if the value behind the handle has another kind.
    /// - [`crate::Error::UnknownTerm`] for a symbolic handle of another session.
    fn check_kind<V: Handle<Self>>(&self, value: V) -> Result<()> {
        let _ = value;
        Ok(())
    }

    /// Evaluates an output against a concrete assignment of its inputs.
    ///
    /// # Arguments
    ///
    /// * `output` - The value to evaluate.
    /// * `assignment` - Concrete values for every input reachable from `output`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnsupportedOutsideBackend`] in detached mode.
    /// - [`crate::Error::IncompleteAssignment`] if a reachable input is unbound.
    /// - [`crate::Error::InvalidArgument`] for malformed assignments, for a handle whose
    ///   declared kind differs from its value, and for values computed by a malformed
    ///   operation.
    fn evaluate<V: Handle<Self>>(
        &self,
        output: V,
        assignment: &Assignment<Self>,
    ) -> Result<NativeOf<Self, V>>;

    /// Evaluates several outputs of one kind, returning values in request order.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::evaluate`].
    fn evaluate_many<V: Handle<Self>>(
        &self,
        outputs: &[V],
        assignment: &Assignment<Self>,
    ) -> Result<Vec<NativeOf<Self, V>>>;

    /// Writes the outputs as an AIGER circuit to `path`.
    ///
    /// With [`InputOrdering::Explicit`] the circuit inputs appear in the given order and
    /// must cover every input the outputs depend on; extra entries become free inputs. With
    /// [`InputOrdering::Inferred`] a sufficient input set is chosen, with no promise about
    /// its order. Detached mode performs no I/O and succeeds.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::DependencyNotCovered`] if an explicit list misses a reachable input.
    /// - [`crate::Error::InvalidArgument`] for non-input, duplicated or empty specifications,
    ///   and for outputs computed by a malformed operation.
    /// - [`crate::Error::FileError`] if writing fails.
    fn write_aiger<P: AsRef<Path>>(
        &self,
        path: P,
        outputs: &OutputSpec<Self>,
        inputs: &InputOrdering<Self>,
    ) -> Result<()>;

    /// Writes a DIMACS CNF encoding of "output is false" to `path`.
    ///
    /// An unsatisfiable verdict on the written formula proves the output is always true.
    /// Detached mode performs no I/O.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] unless `output` is a single boolean, in both modes.
    /// - [`crate::Error::FileError`] if writing fails.
    fn write_cnf<P: AsRef<Path>>(&self, path: P, output: &OutputSpec<Self>) -> Result<()>;

    /// Provides a new boolean.
    fn fresh_bool(&self, default: bool) -> Self::Value<Bool> {
        self.fresh::<Bool>(default)
    }

    /// Provides a new 8-bit integer.
    fn fresh_i8(&self, default: i8) -> Self::Value<I8> {
        self.fresh::<I8>(default)
    }

    /// Provides a new 32-bit integer.
    fn fresh_i32(&self, default: i32) -> Self::Value<I32> {
        self.fresh::<I32>(default)
    }

    /// Provides a new 64-bit integer.
    fn fresh_i64(&self, default: i64) -> Self::Value<I64> {
        self.fresh::<I64>(default)
    }

    /// Wrapping addition.
    fn add<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::Add, left, right)
    }

    /// Wrapping subtraction.
    fn sub<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::Sub, left, right)
    }

    /// Wrapping multiplication.
    fn mul<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::Mul, left, right)
    }

    /// Unsigned division; division by zero yields all ones.
    fn udiv<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::UDiv, left, right)
    }

    /// Unsigned remainder; remainder by zero yields the dividend.
    fn urem<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::URem, left, right)
    }

    /// Bitwise (or logical, for booleans) AND.
    fn and<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::And, left, right)
    }

    /// Bitwise (or logical, for booleans) OR.
    fn or<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::Or, left, right)
    }

    /// Bitwise (or logical, for booleans) XOR.
    fn xor<V: Handle<Self>>(&self, left: V, right: V) -> V {
        self.binary(BinaryOp::Xor, left, right)
    }

    /// Bitwise (or logical, for booleans) NOT.
    fn not<V: Handle<Self>>(&self, value: V) -> V {
        self.unary(UnaryOp::Not, value)
    }

    /// Two's-complement negation.
    fn neg<V: Handle<Self>>(&self, value: V) -> V {
        self.unary(UnaryOp::Neg, value)
    }

    /// Shift left by `amount` masked to `width - 1`.
    fn shl<V: Handle<Self>>(&self, value: V, amount: V) -> V {
        self.binary(BinaryOp::Shl, value, amount)
    }

    /// Logical shift right by `amount` masked to `width - 1`.
    fn lshr<V: Handle<Self>>(&self, value: V, amount: V) -> V {
        self.binary(BinaryOp::LShr, value, amount)
    }

    /// Arithmetic shift right by `amount` masked to `width - 1`.
    fn ashr<V: Handle<Self>>(&self, value: V, amount: V) -> V {
        self.binary(BinaryOp::AShr, value, amount)
    }

    /// Equality.
    fn eq<V: Handle<Self>>(&self, left: V, right: V) -> Self::Value<Bool> {
        self.compare(CompareOp::Eq, left, right)
    }

    /// Inequality.
    fn ne<V: Handle<Self>>(&self, left: V, right: V) -> Self::Value<Bool> {
        self.compare(CompareOp::Ne, left, right)
    }

    /// Unsigned less than.
    fn ult<V: Handle<Self>>(&self, left: V, right: V) -> Self::Value<Bool> {
        self.compare(CompareOp::ULt, left, right)
    }

    /// Unsigned less than or equal.
    fn ule<V: Handle<Self>>(&self, left: V, right: V) -> Self::Value<Bool> {
        self.compare(CompareOp::ULe, left, right)
    }

    /// Signed less than.
    fn slt<V: Handle<Self>>(&self, left: V, right: V) -> Self::Value<Bool> {
        self.compare(CompareOp::SLt, left, right)
    }

    /// Signed less than or equal.
    fn sle<V: Handle<Self>>(&self, left: V, right: V) -> Self::Value<Bool> {
        self.compare(CompareOp::SLe, left, right)
    }

    /// Alias of [`Backend::ite`].
    fn select<V: Handle<Self>>(&self, cond: Self::Value<Bool>, then: V, otherwise: V) -> V {
        self.ite(cond, then, otherwise)
    }

    /// Zero-extends (or truncates) to kind `T`.
    fn zext<T: Kind>(&self, value: impl Handle<Self>) -> Self::Value<T> {
        self.cast::<T>(CastOp::ZeroExtend, value)
    }

    /// Sign-extends (or truncates) to kind `T`.
    fn sext<T: Kind>(&self, value: impl Handle<Self>) -> Self::Value<T> {
        self.cast::<T>(CastOp::SignExtend, value)
    }

    /// Truncates to kind `T`, which must not be wider than the value.
    ///
    /// Truncating to the value's own kind returns it unchanged.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `T` is wider than the value. Use [`Backend::zext`] or
    /// [`Backend::sext`] to widen.
    fn trunc<T: Kind>(&self, value: impl Handle<Self>) -> Self::Value<T> {
        let from = handle_kind::<Self, _>(&value);
        debug_assert!(
            T::TAG.width() <= from.width(),
            "cannot truncate {from} to the wider {}",
            T::TAG
        );
        self.cast::<T>(CastOp::ZeroExtend, value)
    }

    /// Writes values of one kind as an AIGER circuit.
    ///
    /// A single value is exported as [`OutputSpec::Single`], anything else as a sequence.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::write_aiger`] and [`Backend::check_kind`].
    fn write_aiger_outputs<P: AsRef<Path>, V: Handle<Self>>(
        &self,
        path: P,
        outputs: &[V],
        inputs: &InputOrdering<Self>,
    ) -> Result<()> {
        for &output in outputs {
            self.check_kind(output)?;
        }
        let spec = match outputs {
            [single] => OutputSpec::single(*single),
            _ => OutputSpec::sequence(outputs.iter().copied()),
        };
        self.write_aiger(path, &spec, inputs)
    }

    /// Writes a DIMACS CNF encoding of "`output` is false".
    ///
    /// # Errors
    ///
    /// Same as [`Backend::write_cnf`] and [`Backend::check_kind`].
    fn write_cnf_bool<P: AsRef<Path>>(&self, path: P, output: Self::Value<Bool>) -> Result<()> {
        self.check_kind(output)?;
        self.write_cnf(path, &OutputSpec::single(output))
    }
}
