//! Detached execution.
//!
//! [`Concrete`] realizes the contract with no backend attached. It is what instrumented
//! code runs against in production: fresh values are the caller's defaults, operations
//! compute on native integers with the shared semantics of [`crate::ops`], circuit
//! evaluation is unsupported, exports and diagnostics do nothing.
//!
//! Besides the unsupported evaluation, the only failures are the argument checks every mode
//! performs: negative array lengths and CNF requests that are not a single boolean.

use std::path::Path;

use crate::{
    backend::{Assignment, Backend, Handle, InputOrdering, NativeOf, OutputSpec, SymArray},
    diagnostics::Diagnostics,
    kind::{Bool, ConcreteValue, Kind, KindTag, I32, I64, I8},
    ops::{self, BinaryOp, CastOp, CompareOp, UnaryOp},
    Error, Result,
};

/// The detached backend: plain, deterministic execution with no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concrete;

macro_rules! native_handle {
    ($native:ty, $kind:ty) => {
        impl Handle<Concrete> for $native {
            type Kind = $kind;

            fn into_input(self) -> ConcreteValue {
                ConcreteValue::from(self)
            }

            fn from_input(input: ConcreteValue) -> Self {
                <$kind>::from_bits(input.to_bits())
            }
        }
    };
}

native_handle!(bool, Bool);
native_handle!(i8, I8);
native_handle!(i32, I32);
native_handle!(i64, I64);

/// Returns the bit pattern and width of a detached value.
fn bits<V: Handle<Concrete>>(value: V) -> (u64, u32) {
    (value.into_input().to_bits(), <V::Kind as Kind>::TAG.width())
}

/// Rebuilds a detached value of handle type `V` from a bit pattern.
fn rebuild<V: Handle<Concrete>>(bits: u64) -> V {
    V::from_input(ConcreteValue::from_bits(<V::Kind as Kind>::TAG, bits))
}

impl Backend for Concrete {
    type Input = ConcreteValue;
    type Value<K: Kind> = K::Native;

    fn is_symbolic(&self) -> bool {
        false
    }

    fn fresh<K: Kind>(&self, default: K::Native) -> K::Native {
        default
    }

    fn fresh_named<K: Kind>(&self, _name: &str, default: K::Native) -> K::Native {
        default
    }

    fn fresh_array<K: Kind>(&self, len: i64) -> Result<SymArray<K::Native>> {
        if len < 0 {
            return Err(invalid_argument!("negative array length {}", len));
        }
        Ok(SymArray::absent())
    }

    fn lit<K: Kind>(&self, value: K::Native) -> K::Native {
        value
    }

    fn unary<V: Handle<Self>>(&self, op: UnaryOp, value: V) -> V {
        let (value, width) = bits(value);
        rebuild(ops::apply_unary(op, width, value))
    }

    fn binary<V: Handle<Self>>(&self, op: BinaryOp, left: V, right: V) -> V {
        let (left, width) = bits(left);
        let (right, _) = bits(right);
        rebuild(ops::apply_binary(op, width, left, right))
    }

    fn compare<V: Handle<Self>>(&self, op: CompareOp, left: V, right: V) -> bool {
        let (left, width) = bits(left);
        let (right, _) = bits(right);
        ops::apply_compare(op, width, left, right)
    }

    fn ite<V: Handle<Self>>(&self, cond: bool, then: V, otherwise: V) -> V {
        if cond {
            then
        } else {
            otherwise
        }
    }

    fn cast<T: Kind>(&self, op: CastOp, value: impl Handle<Self>) -> T::Native {
        let (value, from) = bits(value);
        T::from_bits(ops::apply_cast(op, from, T::TAG.width(), value))
    }

    fn evaluate<V: Handle<Self>>(
        &self,
        _output: V,
        _assignment: &Assignment<Self>,
    ) -> Result<NativeOf<Self, V>> {
        Err(Error::UnsupportedOutsideBackend)
    }

    fn evaluate_many<V: Handle<Self>>(
        &self,
        _outputs: &[V],
        _assignment: &Assignment<Self>,
    ) -> Result<Vec<NativeOf<Self, V>>> {
        Err(Error::UnsupportedOutsideBackend)
    }

    fn write_aiger<P: AsRef<Path>>(
        &self,
        _path: P,
        _outputs: &OutputSpec<Self>,
        _inputs: &InputOrdering<Self>,
    ) -> Result<()> {
        Ok(())
    }

    fn write_cnf<P: AsRef<Path>>(&self, _path: P, output: &OutputSpec<Self>) -> Result<()> {
        match output {
            OutputSpec::Sequence(outputs) => Err(invalid_argument!(
                "CNF export takes a single boolean output, got a sequence of {}",
                outputs.len()
            )),
            OutputSpec::Single(value) if value.kind() != KindTag::Bool => Err(invalid_argument!(
                "CNF export takes a boolean output, got {}",
                value.kind()
            )),
            OutputSpec::Single(_) => Ok(()),
        }
    }
}

impl Diagnostics for Concrete {
    fn trace_with(&self, _label: Option<&str>, _value: impl Handle<Self>) {}

    fn abort(&self) {}

    fn dump_path_state(&self) {}

    fn dump_mem_state(&self) {}

    fn set_verbosity(&self, _level: u32) {}
}
