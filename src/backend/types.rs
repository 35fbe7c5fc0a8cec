//! Argument and result types of the [`Backend`] operations.

use std::{fmt, ops::Index};

use crate::{
    backend::{Backend, Handle},
    kind::ConcreteValue,
};

/// A fixed-length array of values returned by [`Backend::fresh_array`].
///
/// In detached mode the array is *absent*: it has no elements and reports
/// [`is_absent`](Self::is_absent). Arrays never change length after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymArray<T> {
    elements: Option<Box<[T]>>,
}

impl<T> SymArray<T> {
    /// Creates the absent array used by detached execution.
    #[must_use]
    pub const fn absent() -> Self {
        Self { elements: None }
    }

    /// Creates an array holding `elements`.
    #[must_use]
    pub fn from_vec(elements: Vec<T>) -> Self {
        Self {
            elements: Some(elements.into_boxed_slice()),
        }
    }

    /// Returns `true` if this is the absent array.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.elements.is_none()
    }

    /// Returns the number of elements; zero for the absent array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if the array has no observable elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the elements as a slice; empty for the absent array.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> Index<usize> for SymArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<'a, T> IntoIterator for &'a SymArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Concrete values for circuit inputs, used by [`Backend::evaluate`].
///
/// Bindings keep the caller's order. The symbolic backend requires every bound handle to be
/// a fresh input whose kind matches the bound value; binding the same input twice is only
/// accepted when both values agree.
///
/// # Example
///
/// ```rust
/// use symcircuit::prelude::*;
///
/// let session = SymbolicSession::new();
/// let x = session.fresh_i32(0);
/// let flag = session.fresh_bool(false);
///
/// let assignment = Assignment::new().bind(x, 41i32).bind(flag, true);
/// assert_eq!(assignment.len(), 2);
/// # let _ = session.evaluate(x, &assignment);
/// ```
pub struct Assignment<B: Backend> {
    bindings: Vec<(B::Input, ConcreteValue)>,
}

impl<B: Backend> Assignment<B> {
    /// Creates an empty assignment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Adds a binding and returns the assignment.
    ///
    /// # Arguments
    ///
    /// * `input` - The input to bind.
    /// * `value` - Its concrete value; the kind must match the input's kind.
    #[must_use]
    pub fn bind(mut self, input: impl Handle<B>, value: impl Into<ConcreteValue>) -> Self {
        self.insert(input, value);
        self
    }

    /// Adds a binding in place.
    pub fn insert(&mut self, input: impl Handle<B>, value: impl Into<ConcreteValue>) {
        self.bindings.push((input.into_input(), value.into()));
    }

    /// Returns the bindings in insertion order.
    #[must_use]
    pub fn bindings(&self) -> &[(B::Input, ConcreteValue)] {
        &self.bindings
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<B: Backend> Default for Assignment<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Clone for Assignment<B> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for Assignment<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(input, value)| (input, value)))
            .finish()
    }
}

/// The observable output(s) of an exported circuit.
pub enum OutputSpec<B: Backend> {
    /// A single output.
    Single(B::Input),
    /// A sequence of outputs, possibly of different kinds.
    Sequence(Vec<B::Input>),
}

impl<B: Backend> OutputSpec<B> {
    /// Creates a single-output specification.
    #[must_use]
    pub fn single(output: impl Handle<B>) -> Self {
        OutputSpec::Single(output.into_input())
    }

    /// Creates a sequence of outputs of one kind.
    #[must_use]
    pub fn sequence<V: Handle<B>>(outputs: impl IntoIterator<Item = V>) -> Self {
        OutputSpec::Sequence(outputs.into_iter().map(Handle::into_input).collect())
    }

    /// Appends an output, turning a single output into a sequence.
    #[must_use]
    pub fn with(self, output: impl Handle<B>) -> Self {
        let mut outputs = match self {
            OutputSpec::Single(first) => vec![first],
            OutputSpec::Sequence(outputs) => outputs,
        };
        outputs.push(output.into_input());
        OutputSpec::Sequence(outputs)
    }

    /// Returns the outputs in order.
    #[must_use]
    pub fn handles(&self) -> &[B::Input] {
        match self {
            OutputSpec::Single(output) => std::slice::from_ref(output),
            OutputSpec::Sequence(outputs) => outputs,
        }
    }

    /// Returns `true` for [`OutputSpec::Single`].
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self, OutputSpec::Single(_))
    }
}

impl<B: Backend> Clone for OutputSpec<B> {
    fn clone(&self) -> Self {
        match self {
            OutputSpec::Single(output) => OutputSpec::Single(*output),
            OutputSpec::Sequence(outputs) => OutputSpec::Sequence(outputs.clone()),
        }
    }
}

impl<B: Backend> fmt::Debug for OutputSpec<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSpec::Single(output) => f.debug_tuple("Single").field(output).finish(),
            OutputSpec::Sequence(outputs) => f.debug_tuple("Sequence").field(outputs).finish(),
        }
    }
}

/// The input layout of an exported circuit.
///
/// `Inferred` and `Explicit(vec![])` differ: the former lets the backend pick a sufficient
/// input set, the latter declares that the outputs depend on no input at all.
pub enum InputOrdering<B: Backend> {
    /// The backend selects a sufficient input set in an unspecified order.
    Inferred,
    /// The circuit inputs, in the order they appear in the artifact.
    Explicit(Vec<B::Input>),
}

impl<B: Backend> InputOrdering<B> {
    /// Creates an explicit ordering of inputs of one kind.
    #[must_use]
    pub fn explicit<V: Handle<B>>(inputs: impl IntoIterator<Item = V>) -> Self {
        InputOrdering::Explicit(inputs.into_iter().map(Handle::into_input).collect())
    }

    /// Appends an input, turning `Inferred` into an explicit ordering.
    #[must_use]
    pub fn with(self, input: impl Handle<B>) -> Self {
        let mut inputs = match self {
            InputOrdering::Inferred => Vec::new(),
            InputOrdering::Explicit(inputs) => inputs,
        };
        inputs.push(input.into_input());
        InputOrdering::Explicit(inputs)
    }

    /// Returns the explicit inputs, or `None` when inferred.
    #[must_use]
    pub fn explicit_inputs(&self) -> Option<&[B::Input]> {
        match self {
            InputOrdering::Inferred => None,
            InputOrdering::Explicit(inputs) => Some(inputs),
        }
    }
}

impl<B: Backend> Default for InputOrdering<B> {
    fn default() -> Self {
        InputOrdering::Inferred
    }
}

impl<B: Backend> Clone for InputOrdering<B> {
    fn clone(&self) -> Self {
        match self {
            InputOrdering::Inferred => InputOrdering::Inferred,
            InputOrdering::Explicit(inputs) => InputOrdering::Explicit(inputs.clone()),
        }
    }
}

impl<B: Backend> fmt::Debug for InputOrdering<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputOrdering::Inferred => f.write_str("Inferred"),
            InputOrdering::Explicit(inputs) => f.debug_tuple("Explicit").field(inputs).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        backend::{Backend, InputOrdering, OutputSpec, SymArray},
        concrete::Concrete,
        kind::ConcreteValue,
        Assignment,
    };

    #[test]
    fn test_absent_array() {
        let array: SymArray<i32> = SymArray::absent();
        assert!(array.is_absent());
        assert!(array.is_empty());
        assert_eq!(array.get(0), None);
        assert_eq!(array.iter().count(), 0);
    }

    #[test]
    fn test_present_array() {
        let array = SymArray::from_vec(vec![1, 2, 3]);
        assert!(!array.is_absent());
        assert_eq!(array.len(), 3);
        assert_eq!(array[1], 2);
        assert_eq!((&array).into_iter().sum::<i32>(), 6);
    }

    #[test]
    fn test_empty_array_is_not_absent() {
        let array: SymArray<u8> = SymArray::from_vec(Vec::new());
        assert!(!array.is_absent());
        assert!(array.is_empty());
    }

    #[test]
    fn test_assignment_keeps_order() {
        let assignment = Assignment::<Concrete>::new()
            .bind(3i32, 4i32)
            .bind(true, false);
        assert_eq!(
            assignment.bindings(),
            &[
                (ConcreteValue::I32(3), ConcreteValue::I32(4)),
                (ConcreteValue::Bool(true), ConcreteValue::Bool(false))
            ]
        );
    }

    #[test]
    fn test_output_spec_with() {
        let spec = OutputSpec::<Concrete>::single(1i32).with(true);
        assert!(!spec.is_single());
        assert_eq!(spec.handles().len(), 2);

        let single = OutputSpec::<Concrete>::single(Concrete.fresh_i8(2));
        assert!(single.is_single());
        assert_eq!(single.handles(), &[ConcreteValue::I8(2)]);
    }

    #[test]
    fn test_inferred_differs_from_empty() {
        let inferred = InputOrdering::<Concrete>::Inferred;
        let empty = InputOrdering::<Concrete>::Explicit(Vec::new());
        assert!(inferred.explicit_inputs().is_none());
        assert_eq!(empty.explicit_inputs(), Some(&[][..]));
        let grown = inferred.with(5i64);
        assert_eq!(grown.explicit_inputs(), Some(&[ConcreteValue::I64(5)][..]));
    }
}
